use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::TransferService;
use crate::error::ServiceError;
use crate::evaluation::{EvaluationForm, FormId};
use crate::policy::{authorize, Actor, FormScope, Operation, Role};
use crate::store::RecordStore;

const CSV_HEADERS: [&str; 8] = [
    "ID",
    "Avaliado",
    "Avaliador",
    "Órgão ATC",
    "Data",
    "Finalidade",
    "Status",
    "Criado em",
];

/// Which record set an export covers. "Mine" means forms where the
/// caller is the evaluatee; students are always held to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFilter {
    #[default]
    All,
    Mine,
}

/// A rendered tabular export, ready to hand to the download layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvExport {
    pub text: String,
    pub filename: String,
    pub row_count: usize,
}

/// Outcome of the document-export stub. No bytes are rendered; only
/// the metadata a client needs to present the download is returned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentExport {
    pub success: bool,
    pub message: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
}

impl<S: RecordStore> TransferService<S> {
    /// Encode the caller's visible forms as always-quoted CSV.
    pub fn export_csv(&self, actor: &Actor, filter: ExportFilter) -> Result<CsvExport, ServiceError> {
        authorize(actor, Operation::ExportRecords, None)?;
        let forms = self.fichas().forms_in_scope(export_scope(actor, filter))?;
        let text = encode_forms(&forms)?;
        Ok(CsvExport {
            text,
            filename: format!("fichas-avaliacao-{}.csv", Utc::now().format("%Y-%m-%d")),
            row_count: forms.len(),
        })
    }

    /// Document export. Rendering is stubbed: the single-form path
    /// still enforces existence and the student ownership rule so the
    /// contract matches a real renderer's.
    pub fn export_document(
        &self,
        actor: &Actor,
        form_id: Option<FormId>,
        filter: ExportFilter,
    ) -> Result<DocumentExport, ServiceError> {
        authorize(actor, Operation::ExportRecords, None)?;
        let today = Utc::now().format("%Y-%m-%d");

        if let Some(id) = form_id {
            let form = self
                .store()
                .form(id)?
                .ok_or(ServiceError::NotFound("evaluation form"))?;
            if actor.role == Role::Student && form.evaluatee_id != actor.id {
                return Err(ServiceError::Forbidden(
                    "students may only export forms where they are the evaluatee".to_string(),
                ));
            }
            return Ok(DocumentExport {
                success: true,
                message: "document generated".to_string(),
                filename: format!("ficha-{}-{}.pdf", form.id.0, today),
                row_count: None,
            });
        }

        let forms = self.fichas().forms_in_scope(export_scope(actor, filter))?;
        Ok(DocumentExport {
            success: true,
            message: format!("{} form(s) exported", forms.len()),
            filename: format!("fichas-avaliacao-{today}.pdf"),
            row_count: Some(forms.len()),
        })
    }
}

/// Exports are wider than listings: any role above student may export
/// every record, while "mine" narrows to forms where the caller is the
/// evaluatee. Students are held to "mine" whatever they ask for.
fn export_scope(actor: &Actor, filter: ExportFilter) -> FormScope {
    if actor.role == Role::Student {
        return FormScope::EvaluateeOf(actor.id);
    }
    match filter {
        ExportFilter::Mine => FormScope::EvaluateeOf(actor.id),
        ExportFilter::All => FormScope::All,
    }
}

fn encode_forms(forms: &[EvaluationForm]) -> Result<String, ServiceError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;
    for form in forms {
        writer.write_record([
            form.id.0.to_string(),
            form.evaluatee_name.clone(),
            form.evaluator_name.clone(),
            form.atc_unit.clone(),
            form.evaluated_on.format("%d/%m/%Y").to_string(),
            form.purpose.label().to_string(),
            form.status.label().to_string(),
            form.created_at.format("%d/%m/%Y %H:%M:%S").to_string(),
        ])?;
    }
    // into_inner surfaces the flush failure as io::Error; fold it back
    // into the csv error domain the rest of the encoder reports.
    let buffer = writer
        .into_inner()
        .map_err(|err| ServiceError::from(csv::Error::from(err.into_error())))?;
    Ok(String::from_utf8_lossy(&buffer).trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::accounts::AccountId;
    use crate::evaluation::{FormStatus, Purpose};

    fn form(id: i64, evaluatee: &str) -> EvaluationForm {
        EvaluationForm {
            id: FormId(id),
            evaluatee_id: AccountId(10),
            evaluatee_name: evaluatee.to_string(),
            evaluator_id: AccountId(20),
            evaluator_name: "Bruno Costa".to_string(),
            atc_unit: "ACC-BS".to_string(),
            location: "Sala 2".to_string(),
            evaluated_on: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            purpose: Purpose::Final,
            license: None,
            scenario_conditions: None,
            control_position_minutes: 0,
            assistant_position_minutes: 0,
            performance_summary: None,
            comments: None,
            status: FormStatus::Draft,
            signed_by_evaluatee: false,
            signed_by_evaluator: false,
            signed_by_unit_chief: false,
            unit_chief_id: None,
            unit_chief_name: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap(),
        }
    }

    #[test]
    fn every_field_is_quoted_and_dates_use_the_locale_format() {
        let text = encode_forms(&[form(1, "Ana Silva")]).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"ID\",\"Avaliado\",\"Avaliador\",\"Órgão ATC\",\"Data\",\"Finalidade\",\"Status\",\"Criado em\""
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"1\",\"Ana Silva\",\"Bruno Costa\",\"ACC-BS\",\"05/03/2024\",\"Final\",\"rascunho\",\"05/03/2024 14:30:00\""
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let text = encode_forms(&[form(2, "Ana \"Aninha\" Silva")]).unwrap();
        assert!(text.contains("\"Ana \"\"Aninha\"\" Silva\""));
    }

    #[test]
    fn empty_export_is_just_the_header() {
        let text = encode_forms(&[]).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn students_are_forced_to_their_own_forms() {
        let student = Actor {
            id: AccountId(7),
            name: "Ana".to_string(),
            role: Role::Student,
        };
        assert_eq!(
            export_scope(&student, ExportFilter::All),
            FormScope::EvaluateeOf(AccountId(7))
        );

        let manager = Actor {
            id: AccountId(8),
            name: "Gil".to_string(),
            role: Role::Manager,
        };
        assert_eq!(export_scope(&manager, ExportFilter::All), FormScope::All);
        assert_eq!(
            export_scope(&manager, ExportFilter::Mine),
            FormScope::EvaluateeOf(AccountId(8))
        );
    }

    #[test]
    fn instructors_exporting_all_see_every_record() {
        let instructor = Actor {
            id: AccountId(3),
            name: "Bruno".to_string(),
            role: Role::Instructor,
        };
        assert_eq!(export_scope(&instructor, ExportFilter::All), FormScope::All);
        assert_eq!(
            export_scope(&instructor, ExportFilter::Mine),
            FormScope::EvaluateeOf(AccountId(3))
        );
    }
}
