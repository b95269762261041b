//! In-memory [`RecordStore`] used by the API service and the test suites.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::{RecordStore, StoreError};
use crate::accounts::{Account, AccountId, AccountPatch, NewAccountRecord};
use crate::catalog::{ItemTemplate, NewTemplateRecord, TemplateFilter, TemplateId, TemplatePatch};
use crate::evaluation::{
    AuditEntry, EvaluationForm, FormId, FormPatch, LineItem, LineItemId, NewAuditRecord,
    NewFormRecord, NewLineItemRecord,
};
use crate::reports::{NewReportRecord, Report, ReportId};

#[derive(Default)]
struct Collections {
    accounts: BTreeMap<i64, Account>,
    forms: BTreeMap<i64, EvaluationForm>,
    line_items: BTreeMap<i64, LineItem>,
    audit_entries: Vec<AuditEntry>,
    templates: BTreeMap<i64, ItemTemplate>,
    reports: BTreeMap<i64, Report>,
    next_account: i64,
    next_form: i64,
    next_line_item: i64,
    next_audit: i64,
    next_template: i64,
    next_report: i64,
}

impl Collections {
    fn next(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// Mutex-guarded maps keyed by id; id order doubles as insertion order.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    fn with<T>(&self, f: impl FnOnce(&mut Collections) -> T) -> T {
        let mut guard = self.inner.lock().expect("record store mutex poisoned");
        f(&mut guard)
    }
}

fn template_matches(template: &ItemTemplate, filter: &TemplateFilter) -> bool {
    if let Some(active) = filter.active {
        if template.active != active {
            return false;
        }
    }
    if let Some(category) = &filter.category {
        let wanted = category.to_lowercase();
        if !template.category.to_lowercase().contains(&wanted) {
            return false;
        }
    }
    true
}

impl RecordStore for MemoryStore {
    fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.with(|c| c.accounts.values().cloned().collect()))
    }

    fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.with(|c| c.accounts.get(&id.0).cloned()))
    }

    fn insert_account(&self, record: NewAccountRecord) -> Result<AccountId, StoreError> {
        Ok(self.with(|c| {
            let id = Collections::next(&mut c.next_account);
            let now = Utc::now();
            c.accounts.insert(
                id,
                Account {
                    id: AccountId(id),
                    external_id: record.external_id,
                    name: record.name,
                    email: record.email,
                    role: record.role,
                    unit: record.unit,
                    facility: record.facility,
                    created_at: now,
                    updated_at: now,
                    last_signed_in: None,
                },
            );
            AccountId(id)
        }))
    }

    fn update_account(&self, id: AccountId, patch: AccountPatch) -> Result<bool, StoreError> {
        Ok(self.with(|c| {
            let Some(account) = c.accounts.get_mut(&id.0) else {
                return false;
            };
            if let Some(name) = patch.name {
                account.name = name;
            }
            if let Some(email) = patch.email {
                account.email = Some(email);
            }
            if let Some(role) = patch.role {
                account.role = role;
            }
            if let Some(unit) = patch.unit {
                account.unit = Some(unit);
            }
            if let Some(facility) = patch.facility {
                account.facility = Some(facility);
            }
            account.updated_at = Utc::now();
            true
        }))
    }

    fn delete_account(&self, id: AccountId) -> Result<bool, StoreError> {
        Ok(self.with(|c| c.accounts.remove(&id.0).is_some()))
    }

    fn list_forms(&self) -> Result<Vec<EvaluationForm>, StoreError> {
        Ok(self.with(|c| c.forms.values().cloned().collect()))
    }

    fn forms_by_evaluatee(&self, id: AccountId) -> Result<Vec<EvaluationForm>, StoreError> {
        Ok(self.with(|c| {
            c.forms
                .values()
                .filter(|form| form.evaluatee_id == id)
                .cloned()
                .collect()
        }))
    }

    fn forms_by_evaluator(&self, id: AccountId) -> Result<Vec<EvaluationForm>, StoreError> {
        Ok(self.with(|c| {
            c.forms
                .values()
                .filter(|form| form.evaluator_id == id)
                .cloned()
                .collect()
        }))
    }

    fn form(&self, id: FormId) -> Result<Option<EvaluationForm>, StoreError> {
        Ok(self.with(|c| c.forms.get(&id.0).cloned()))
    }

    fn insert_form(&self, record: NewFormRecord) -> Result<FormId, StoreError> {
        Ok(self.with(|c| {
            let id = Collections::next(&mut c.next_form);
            let now = Utc::now();
            c.forms.insert(
                id,
                EvaluationForm {
                    id: FormId(id),
                    evaluatee_id: record.evaluatee_id,
                    evaluatee_name: record.evaluatee_name,
                    evaluator_id: record.evaluator_id,
                    evaluator_name: record.evaluator_name,
                    atc_unit: record.atc_unit,
                    location: record.location,
                    evaluated_on: record.evaluated_on,
                    purpose: record.purpose,
                    license: record.license,
                    scenario_conditions: record.scenario_conditions,
                    control_position_minutes: 0,
                    assistant_position_minutes: 0,
                    performance_summary: None,
                    comments: None,
                    status: record.status,
                    signed_by_evaluatee: false,
                    signed_by_evaluator: false,
                    signed_by_unit_chief: false,
                    unit_chief_id: None,
                    unit_chief_name: None,
                    created_at: now,
                    updated_at: now,
                },
            );
            FormId(id)
        }))
    }

    fn update_form(&self, id: FormId, patch: FormPatch) -> Result<bool, StoreError> {
        Ok(self.with(|c| {
            let Some(form) = c.forms.get_mut(&id.0) else {
                return false;
            };
            if let Some(status) = patch.status {
                form.status = status;
            }
            if let Some(conditions) = patch.scenario_conditions {
                form.scenario_conditions = Some(conditions);
            }
            if let Some(minutes) = patch.control_position_minutes {
                form.control_position_minutes = minutes;
            }
            if let Some(minutes) = patch.assistant_position_minutes {
                form.assistant_position_minutes = minutes;
            }
            if let Some(summary) = patch.performance_summary {
                form.performance_summary = Some(summary);
            }
            if let Some(comments) = patch.comments {
                form.comments = Some(comments);
            }
            form.updated_at = Utc::now();
            true
        }))
    }

    fn delete_form(&self, id: FormId) -> Result<bool, StoreError> {
        Ok(self.with(|c| {
            if c.forms.remove(&id.0).is_none() {
                return false;
            }
            c.line_items.retain(|_, item| item.form_id != id);
            c.audit_entries.retain(|entry| entry.form_id != id);
            true
        }))
    }

    fn line_items(&self, form_id: FormId) -> Result<Vec<LineItem>, StoreError> {
        Ok(self.with(|c| {
            c.line_items
                .values()
                .filter(|item| item.form_id == form_id)
                .cloned()
                .collect()
        }))
    }

    fn insert_line_item(&self, record: NewLineItemRecord) -> Result<LineItemId, StoreError> {
        Ok(self.with(|c| insert_line_item_locked(c, record)))
    }

    fn insert_line_items(&self, records: Vec<NewLineItemRecord>) -> Result<usize, StoreError> {
        Ok(self.with(|c| {
            let count = records.len();
            for record in records {
                insert_line_item_locked(c, record);
            }
            count
        }))
    }

    fn append_audit(&self, record: NewAuditRecord) -> Result<(), StoreError> {
        self.with(|c| {
            let id = Collections::next(&mut c.next_audit);
            c.audit_entries.push(AuditEntry {
                id,
                form_id: record.form_id,
                actor_id: record.actor_id,
                actor_name: record.actor_name,
                action: record.action,
                description: record.description,
                recorded_at: Utc::now(),
            });
        });
        Ok(())
    }

    fn audit_entries(&self, form_id: FormId) -> Result<Vec<AuditEntry>, StoreError> {
        Ok(self.with(|c| {
            c.audit_entries
                .iter()
                .filter(|entry| entry.form_id == form_id)
                .cloned()
                .collect()
        }))
    }

    fn templates(&self, filter: &TemplateFilter) -> Result<Vec<ItemTemplate>, StoreError> {
        Ok(self.with(|c| {
            c.templates
                .values()
                .filter(|template| template_matches(template, filter))
                .cloned()
                .collect()
        }))
    }

    fn template(&self, id: TemplateId) -> Result<Option<ItemTemplate>, StoreError> {
        Ok(self.with(|c| c.templates.get(&id.0).cloned()))
    }

    fn insert_template(&self, record: NewTemplateRecord) -> Result<TemplateId, StoreError> {
        Ok(self.with(|c| insert_template_locked(c, record)))
    }

    fn insert_templates(&self, records: Vec<NewTemplateRecord>) -> Result<usize, StoreError> {
        Ok(self.with(|c| {
            let count = records.len();
            for record in records {
                insert_template_locked(c, record);
            }
            count
        }))
    }

    fn update_template(&self, id: TemplateId, patch: TemplatePatch) -> Result<bool, StoreError> {
        Ok(self.with(|c| {
            let Some(template) = c.templates.get_mut(&id.0) else {
                return false;
            };
            if let Some(category) = patch.category {
                template.category = category;
            }
            if let Some(description) = patch.description {
                template.description = description;
            }
            if let Some(reference) = patch.reference {
                template.reference = Some(reference);
            }
            if let Some(stages) = patch.stages {
                template.stages = stages;
            }
            if let Some(active) = patch.active {
                template.active = active;
            }
            template.updated_at = Utc::now();
            true
        }))
    }

    fn delete_template(&self, id: TemplateId) -> Result<bool, StoreError> {
        Ok(self.with(|c| c.templates.remove(&id.0).is_some()))
    }

    fn reports_by_creator(&self, creator: AccountId) -> Result<Vec<Report>, StoreError> {
        Ok(self.with(|c| {
            c.reports
                .values()
                .filter(|report| report.creator_id == creator)
                .cloned()
                .collect()
        }))
    }

    fn insert_report(&self, record: NewReportRecord) -> Result<ReportId, StoreError> {
        Ok(self.with(|c| {
            let id = Collections::next(&mut c.next_report);
            c.reports.insert(
                id,
                Report {
                    id: ReportId(id),
                    title: record.title,
                    kind: record.kind,
                    creator_id: record.creator_id,
                    creator_name: record.creator_name,
                    parameters: record.parameters,
                    result: record.result,
                    generated_at: Utc::now(),
                },
            );
            ReportId(id)
        }))
    }
}

fn insert_line_item_locked(c: &mut Collections, record: NewLineItemRecord) -> LineItemId {
    let id = Collections::next(&mut c.next_line_item);
    let now = Utc::now();
    c.line_items.insert(
        id,
        LineItem {
            id: LineItemId(id),
            form_id: record.form_id,
            area: record.area,
            area_name: record.area_name,
            sub_item: record.sub_item,
            grade: record.grade,
            observations: record.observations,
            position: record.position,
            created_at: now,
            updated_at: now,
        },
    );
    LineItemId(id)
}

fn insert_template_locked(c: &mut Collections, record: NewTemplateRecord) -> TemplateId {
    let id = Collections::next(&mut c.next_template);
    let now = Utc::now();
    c.templates.insert(
        id,
        ItemTemplate {
            id: TemplateId(id),
            category: record.category,
            description: record.description,
            reference: record.reference,
            stages: record.stages,
            active: true,
            created_at: now,
            updated_at: now,
        },
    );
    TemplateId(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{AreaCode, FormStatus, Purpose};
    use crate::policy::Role;
    use chrono::NaiveDate;

    fn sample_form(evaluatee: i64, evaluator: i64) -> NewFormRecord {
        NewFormRecord {
            evaluatee_id: AccountId(evaluatee),
            evaluatee_name: "Avaliado".to_string(),
            evaluator_id: AccountId(evaluator),
            evaluator_name: "Avaliador".to_string(),
            atc_unit: "ACC-BS".to_string(),
            location: "Sala 1".to_string(),
            evaluated_on: NaiveDate::from_ymd_opt(2026, 3, 10).expect("valid date"),
            purpose: Purpose::Final,
            license: None,
            scenario_conditions: None,
            status: FormStatus::Draft,
        }
    }

    #[test]
    fn inserts_return_sequential_identifiers() {
        let store = MemoryStore::default();
        let first = store.insert_form(sample_form(1, 2)).expect("insert");
        let second = store.insert_form(sample_form(1, 2)).expect("insert");
        assert!(second.0 > first.0);
    }

    #[test]
    fn deleting_a_form_cascades_to_items_and_audit() {
        let store = MemoryStore::default();
        let form_id = store.insert_form(sample_form(1, 2)).expect("insert form");
        store
            .insert_line_item(NewLineItemRecord {
                form_id,
                area: AreaCode::A,
                area_name: "LEGISLAÇÃO DE TRÁFEGO AÉREO".to_string(),
                sub_item: "Normas".to_string(),
                grade: None,
                observations: None,
                position: 1,
            })
            .expect("insert item");
        store
            .append_audit(NewAuditRecord {
                form_id,
                actor_id: AccountId(2),
                actor_name: "Avaliador".to_string(),
                action: "creation".to_string(),
                description: None,
            })
            .expect("append audit");

        assert!(store.delete_form(form_id).expect("delete"));
        assert!(store.line_items(form_id).expect("items").is_empty());
        assert!(store.audit_entries(form_id).expect("audit").is_empty());
        assert!(!store.delete_form(form_id).expect("second delete"));
    }

    #[test]
    fn template_filter_matches_substring_case_insensitively() {
        let store = MemoryStore::default();
        store
            .insert_template(NewTemplateRecord {
                category: "AVALIAÇÃO COMPORTAMENTAL".to_string(),
                description: "Interesse".to_string(),
                reference: None,
                stages: vec![1, 2],
            })
            .expect("insert");
        store
            .insert_template(NewTemplateRecord {
                category: "PLANEJAMENTO".to_string(),
                description: "Sequenciamento".to_string(),
                reference: None,
                stages: vec![3],
            })
            .expect("insert");

        let filter = TemplateFilter {
            category: Some("comportamental".to_string()),
            active: None,
        };
        let matches = store.templates(&filter).expect("filter");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].description, "Interesse");
    }

    #[test]
    fn account_patch_leaves_absent_fields_untouched() {
        let store = MemoryStore::default();
        let id = store
            .insert_account(NewAccountRecord {
                external_id: "manual-1".to_string(),
                name: "Ana".to_string(),
                email: Some("ana@example.com".to_string()),
                role: Role::Student,
                unit: Some("ACC-BS".to_string()),
                facility: None,
            })
            .expect("insert");

        let updated = store
            .update_account(
                id,
                AccountPatch {
                    role: Some(Role::Instructor),
                    ..AccountPatch::default()
                },
            )
            .expect("update");
        assert!(updated);

        let account = store.account(id).expect("read").expect("present");
        assert_eq!(account.role, Role::Instructor);
        assert_eq!(account.name, "Ana");
        assert_eq!(account.email.as_deref(), Some("ana@example.com"));
    }
}
