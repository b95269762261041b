//! Record-store seam between the domain services and a backend.
//!
//! The trait covers the five persisted collections. Every insert
//! returns the generated identifier, so callers never have to guess a
//! new record's id from insertion order. The only error a backend may
//! raise is [`StoreError::Unavailable`]; "record absent" is expressed
//! through `Option`/`bool` return values and turned into a not-found
//! outcome by the services.

pub mod memory;

pub use memory::MemoryStore;

use crate::accounts::{Account, AccountId, AccountPatch, NewAccountRecord};
use crate::catalog::{ItemTemplate, NewTemplateRecord, TemplateFilter, TemplateId, TemplatePatch};
use crate::evaluation::{
    AuditEntry, EvaluationForm, FormId, FormPatch, LineItem, LineItemId, NewAuditRecord,
    NewFormRecord, NewLineItemRecord,
};
use crate::reports::{NewReportRecord, Report, ReportId};

/// Backend failure. Reads are masked to empty results by the services;
/// writes surface this error directly.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction so the services can be exercised in isolation.
pub trait RecordStore: Send + Sync {
    // accounts
    fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;
    fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;
    fn insert_account(&self, record: NewAccountRecord) -> Result<AccountId, StoreError>;
    fn update_account(&self, id: AccountId, patch: AccountPatch) -> Result<bool, StoreError>;
    fn delete_account(&self, id: AccountId) -> Result<bool, StoreError>;

    // evaluation forms
    fn list_forms(&self) -> Result<Vec<EvaluationForm>, StoreError>;
    fn forms_by_evaluatee(&self, id: AccountId) -> Result<Vec<EvaluationForm>, StoreError>;
    fn forms_by_evaluator(&self, id: AccountId) -> Result<Vec<EvaluationForm>, StoreError>;
    fn form(&self, id: FormId) -> Result<Option<EvaluationForm>, StoreError>;
    fn insert_form(&self, record: NewFormRecord) -> Result<FormId, StoreError>;
    fn update_form(&self, id: FormId, patch: FormPatch) -> Result<bool, StoreError>;
    /// Delete a form together with its line items and audit entries.
    fn delete_form(&self, id: FormId) -> Result<bool, StoreError>;

    // line items
    fn line_items(&self, form_id: FormId) -> Result<Vec<LineItem>, StoreError>;
    fn insert_line_item(&self, record: NewLineItemRecord) -> Result<LineItemId, StoreError>;
    fn insert_line_items(&self, records: Vec<NewLineItemRecord>) -> Result<usize, StoreError>;

    // audit trail
    fn append_audit(&self, record: NewAuditRecord) -> Result<(), StoreError>;
    fn audit_entries(&self, form_id: FormId) -> Result<Vec<AuditEntry>, StoreError>;

    // template catalog
    fn templates(&self, filter: &TemplateFilter) -> Result<Vec<ItemTemplate>, StoreError>;
    fn template(&self, id: TemplateId) -> Result<Option<ItemTemplate>, StoreError>;
    fn insert_template(&self, record: NewTemplateRecord) -> Result<TemplateId, StoreError>;
    fn insert_templates(&self, records: Vec<NewTemplateRecord>) -> Result<usize, StoreError>;
    fn update_template(&self, id: TemplateId, patch: TemplatePatch) -> Result<bool, StoreError>;
    fn delete_template(&self, id: TemplateId) -> Result<bool, StoreError>;

    // reports
    fn reports_by_creator(&self, creator: AccountId) -> Result<Vec<Report>, StoreError>;
    fn insert_report(&self, record: NewReportRecord) -> Result<ReportId, StoreError>;
}
