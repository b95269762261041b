use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Args;

use atco_fichas::accounts::{AccountId, AccountService, NewAccount};
use atco_fichas::catalog::{CatalogService, NewTemplateRecord};
use atco_fichas::error::AppError;
use atco_fichas::evaluation::{
    AreaCode, FichaService, FormPatch, FormStatus, Grade, NewFicha, NewLineItemInput, Purpose,
};
use atco_fichas::policy::{Actor, Role};
use atco_fichas::store::MemoryStore;
use atco_fichas::transfer::{ExportFilter, TransferService};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) evaluated_on: Option<NaiveDate>,
    /// Skip the tabular import portion of the demo.
    #[arg(long)]
    pub(crate) skip_import: bool,
}

/// Walk the whole workflow in process: accounts, catalog, a seeded
/// form, an edit, the audit trail, and the tabular transfer paths.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let evaluated_on = args.evaluated_on.unwrap_or_else(|| Local::now().date_naive());

    let store = Arc::new(MemoryStore::default());
    let accounts = AccountService::new(store.clone());
    let catalog = CatalogService::new(store.clone());
    let fichas = FichaService::new(store.clone());
    let transfer = TransferService::new(store);

    println!("Evaluation record demo");

    // Bootstrap identity so the management gates have a caller.
    let bootstrap = Actor {
        id: AccountId(0),
        name: "bootstrap".to_string(),
        role: Role::Administrator,
    };

    let manager = seed_actor(&accounts, &bootstrap, "Gilberto Nunes", Role::Manager)?;
    let instructor = seed_actor(&accounts, &bootstrap, "Bruno Costa", Role::Instructor)?;
    let student = seed_actor(&accounts, &manager, "Ana Silva", Role::Student)?;
    println!(
        "Accounts: manager #{}, instructor #{}, student #{}",
        manager.id.0, instructor.id.0, student.id.0
    );

    let seeded_templates = catalog.import_batch(
        &manager,
        vec![
            template("LEGISLAÇÃO DE TRÁFEGO AÉREO", "Aplica as regras de voo"),
            template("FRASEOLOGIA", "Usa fraseologia padrão"),
            template("COORDENAÇÃO", "Coordena com órgãos adjacentes"),
        ],
    )?;
    println!("Catalog: {seeded_templates} item template(s) imported");

    let created = fichas.create(
        &instructor,
        NewFicha {
            evaluatee_id: student.id,
            atc_unit: "ACC-BS".to_string(),
            location: "Sala de Simulação 2".to_string(),
            evaluated_on,
            purpose: Purpose::Internship,
            license: None,
            scenario_conditions: Some("Tráfego moderado, CAVOK".to_string()),
            seed_from_catalog: true,
        },
    )?;
    println!(
        "Form #{} created with {} seeded item(s)",
        created.form_id.0, created.seeded_items
    );

    fichas.save_line_item(
        &instructor,
        created.form_id,
        NewLineItemInput {
            area: AreaCode::K,
            area_name: "AVALIAÇÃO COMPORTAMENTAL".to_string(),
            sub_item: "Mantém a calma sob carga de tráfego".to_string(),
            grade: Some(Grade::Good),
            observations: None,
            position: (created.seeded_items + 1) as i32,
        },
    )?;

    fichas.update(
        &instructor,
        created.form_id,
        FormPatch {
            status: Some(FormStatus::Finalized),
            performance_summary: Some("Desempenho consistente ao longo da sessão".to_string()),
            ..FormPatch::default()
        },
    )?;

    println!("\nAudit trail");
    for entry in fichas.audit(&instructor, created.form_id)? {
        println!(
            "  [{}] {} by {}: {}",
            entry.recorded_at.format("%H:%M:%S"),
            entry.action,
            entry.actor_name,
            entry.description.unwrap_or_default()
        );
    }

    let export = transfer.export_csv(&manager, ExportFilter::All)?;
    println!(
        "\nCSV export ({} row(s), {})",
        export.row_count, export.filename
    );
    println!("{}", export.text);

    if !args.skip_import {
        let sample = format!(
            "{header}\n\"{id}\",\"Ana Silva\",\"Bruno Costa\",\"ACC-BS\",\"{date}\",\"Final\",\"rascunho\",\"x\"\n\"{id}\",\"Ana Silva\"",
            header = export.text.lines().next().unwrap_or_default(),
            id = student.id.0,
            date = evaluated_on.format("%d/%m/%Y"),
        );
        let outcome = transfer.import_csv(&manager, &sample)?;
        println!("\nImport: {}", outcome.message);
        for error in &outcome.errors {
            println!("  {error}");
        }
    }

    Ok(())
}

fn seed_actor(
    accounts: &AccountService<MemoryStore>,
    caller: &Actor,
    name: &str,
    role: Role,
) -> Result<Actor, AppError> {
    let id = accounts.create(
        caller,
        NewAccount {
            name: name.to_string(),
            email: None,
            role,
            unit: Some("ACC-BS".to_string()),
            facility: None,
        },
    )?;
    Ok(Actor {
        id,
        name: name.to_string(),
        role,
    })
}

fn template(category: &str, description: &str) -> NewTemplateRecord {
    NewTemplateRecord {
        category: category.to_string(),
        description: description.to_string(),
        reference: Some("ICA 100-12".to_string()),
        stages: vec![1, 2, 3],
    }
}
