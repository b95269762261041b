use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use super::domain::{
    AreaCode, AuditEntry, EvaluationForm, FormId, FormPatch, FormStatus, Grade, LineItem,
    NewAuditRecord, NewFormRecord, NewLineItemRecord, Purpose,
};
use crate::accounts::AccountId;
use crate::catalog::seed_form_from_catalog;
use crate::error::ServiceError;
use crate::policy::{authorize, form_scope, Actor, FormScope, Operation};
use crate::store::{RecordStore, StoreError};

/// Form creation input; the evaluator is always the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFicha {
    pub evaluatee_id: AccountId,
    pub atc_unit: String,
    pub location: String,
    pub evaluated_on: NaiveDate,
    pub purpose: Purpose,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub scenario_conditions: Option<String>,
    #[serde(default)]
    pub seed_from_catalog: bool,
}

/// Line-item save input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItemInput {
    pub area: AreaCode,
    pub area_name: String,
    pub sub_item: String,
    #[serde(default)]
    pub grade: Option<Grade>,
    #[serde(default)]
    pub observations: Option<String>,
    pub position: i32,
}

/// Outcome of a form creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormCreated {
    pub form_id: FormId,
    pub seeded_items: usize,
}

/// Fields a tabular import supplies for each row. The evaluatee name
/// arrives from the file rather than from an account lookup, and no
/// audit entry is written, matching the import contract.
#[derive(Debug, Clone)]
pub(crate) struct ImportedFicha {
    pub(crate) evaluatee_id: AccountId,
    pub(crate) evaluatee_name: String,
    pub(crate) atc_unit: String,
    pub(crate) evaluated_on: NaiveDate,
    pub(crate) purpose: Purpose,
}

/// Evaluation form workflow: create, read, update, delete, line items,
/// and the audit trail around whole-form changes.
pub struct FichaService<S> {
    store: Arc<S>,
}

impl<S> Clone for FichaService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: RecordStore> FichaService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// List the forms visible to the caller under their role's scope.
    pub fn list(&self, actor: &Actor) -> Result<Vec<EvaluationForm>, ServiceError> {
        authorize(actor, Operation::ListForms, None)?;
        self.forms_in_scope(form_scope(actor))
    }

    pub(crate) fn forms_in_scope(
        &self,
        scope: FormScope,
    ) -> Result<Vec<EvaluationForm>, ServiceError> {
        let result = match scope {
            FormScope::All => self.store.list_forms(),
            FormScope::EvaluateeOf(id) => self.store.forms_by_evaluatee(id),
            FormScope::EvaluatorOf(id) => self.store.forms_by_evaluator(id),
        };
        match result {
            Ok(forms) => Ok(forms),
            Err(StoreError::Unavailable(reason)) => {
                warn!(%reason, "form listing degraded to empty result");
                Ok(Vec::new())
            }
        }
    }

    /// Fetch a single form, applying the view-ownership rule after the
    /// record is known to exist.
    pub fn get(&self, actor: &Actor, id: FormId) -> Result<EvaluationForm, ServiceError> {
        let form = self.load(id)?;
        authorize(actor, Operation::ReadForm, Some(&form.ownership()))?;
        Ok(form)
    }

    pub fn line_items(&self, actor: &Actor, id: FormId) -> Result<Vec<LineItem>, ServiceError> {
        let form = self.load(id)?;
        authorize(actor, Operation::ReadForm, Some(&form.ownership()))?;
        match self.store.line_items(form.id) {
            Ok(items) => Ok(items),
            Err(StoreError::Unavailable(reason)) => {
                warn!(%reason, "line-item listing degraded to empty result");
                Ok(Vec::new())
            }
        }
    }

    /// Read a form's change history. Existence is checked before the
    /// role gate so a missing form is reported as such even to students.
    pub fn audit(&self, actor: &Actor, id: FormId) -> Result<Vec<AuditEntry>, ServiceError> {
        let form = self.load(id)?;
        authorize(actor, Operation::ReadAudit, None)?;
        match self.store.audit_entries(form.id) {
            Ok(entries) => Ok(entries),
            Err(StoreError::Unavailable(reason)) => {
                warn!(%reason, "audit listing degraded to empty result");
                Ok(Vec::new())
            }
        }
    }

    /// Create a draft form for the caller, optionally expanding the
    /// template catalog into line items, and record one audit entry.
    pub fn create(&self, actor: &Actor, input: NewFicha) -> Result<FormCreated, ServiceError> {
        authorize(actor, Operation::CreateForm, None)?;
        if input.atc_unit.trim().is_empty() || input.location.trim().is_empty() {
            return Err(ServiceError::Validation(
                "unit and location are required".to_string(),
            ));
        }

        let evaluatee = self
            .store
            .account(input.evaluatee_id)?
            .ok_or_else(|| {
                ServiceError::Validation("evaluatee account could not be resolved".to_string())
            })?;

        let form_id = self.store.insert_form(NewFormRecord {
            evaluatee_id: evaluatee.id,
            evaluatee_name: evaluatee.name,
            evaluator_id: actor.id,
            evaluator_name: actor.name.clone(),
            atc_unit: input.atc_unit,
            location: input.location,
            evaluated_on: input.evaluated_on,
            purpose: input.purpose,
            license: input.license,
            scenario_conditions: input.scenario_conditions,
            status: FormStatus::Draft,
        })?;

        let seeded_items = if input.seed_from_catalog {
            seed_form_from_catalog(self.store.as_ref(), form_id)?
        } else {
            0
        };

        let description = if input.seed_from_catalog {
            "evaluation form created with catalog items"
        } else {
            "evaluation form created"
        };
        self.store.append_audit(NewAuditRecord {
            form_id,
            actor_id: actor.id,
            actor_name: actor.name.clone(),
            action: "creation".to_string(),
            description: Some(description.to_string()),
        })?;

        Ok(FormCreated {
            form_id,
            seeded_items,
        })
    }

    /// Merge the provided fields into an existing form and record which
    /// field names changed. Status transitions are not constrained.
    pub fn update(&self, actor: &Actor, id: FormId, patch: FormPatch) -> Result<(), ServiceError> {
        authorize(actor, Operation::UpdateForm, None)?;
        let form = self.load(id)?;
        authorize(actor, Operation::UpdateForm, Some(&form.ownership()))?;

        if patch.is_empty() {
            return Err(ServiceError::Validation(
                "update carries no fields".to_string(),
            ));
        }

        let changed = patch.changed_fields();
        if !self.store.update_form(id, patch)? {
            return Err(ServiceError::NotFound("evaluation form"));
        }

        self.store.append_audit(NewAuditRecord {
            form_id: id,
            actor_id: actor.id,
            actor_name: actor.name.clone(),
            action: "edit".to_string(),
            description: Some(format!("updated fields: {}", changed.join(", "))),
        })?;
        Ok(())
    }

    /// Delete a form. Line items and audit entries go with it; the
    /// deletion itself leaves no audit trail because the trail lives on
    /// the form being removed.
    pub fn delete(&self, actor: &Actor, id: FormId) -> Result<(), ServiceError> {
        authorize(actor, Operation::DeleteForm, None)?;
        if self.store.delete_form(id)? {
            Ok(())
        } else {
            Err(ServiceError::NotFound("evaluation form"))
        }
    }

    /// Persist one checklist row. Line-item changes are not separately
    /// audited; only whole-form edits are.
    pub fn save_line_item(
        &self,
        actor: &Actor,
        form_id: FormId,
        input: NewLineItemInput,
    ) -> Result<(), ServiceError> {
        authorize(actor, Operation::UpdateForm, None)?;
        let form = self.load(form_id)?;
        authorize(actor, Operation::UpdateForm, Some(&form.ownership()))?;

        if input.sub_item.trim().is_empty() {
            return Err(ServiceError::Validation(
                "sub-item description is required".to_string(),
            ));
        }

        self.store.insert_line_item(NewLineItemRecord {
            form_id: form.id,
            area: input.area,
            area_name: input.area_name,
            sub_item: input.sub_item,
            grade: input.grade,
            observations: input.observations,
            position: input.position,
        })?;
        Ok(())
    }

    /// Import-path creation: no account resolution, no audit entry.
    pub(crate) fn create_imported(
        &self,
        actor: &Actor,
        row: ImportedFicha,
    ) -> Result<FormId, ServiceError> {
        let form_id = self.store.insert_form(NewFormRecord {
            evaluatee_id: row.evaluatee_id,
            evaluatee_name: row.evaluatee_name,
            evaluator_id: actor.id,
            evaluator_name: actor.name.clone(),
            atc_unit: row.atc_unit,
            location: String::new(),
            evaluated_on: row.evaluated_on,
            purpose: row.purpose,
            license: None,
            scenario_conditions: None,
            status: FormStatus::Draft,
        })?;
        Ok(form_id)
    }

    fn load(&self, id: FormId) -> Result<EvaluationForm, ServiceError> {
        let form = match self.store.form(id) {
            Ok(form) => form,
            Err(StoreError::Unavailable(reason)) => {
                warn!(%reason, "form lookup degraded to not-found");
                None
            }
        };
        form.ok_or(ServiceError::NotFound("evaluation form"))
    }
}
