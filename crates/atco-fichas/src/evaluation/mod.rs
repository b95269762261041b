//! Evaluation forms ("fichas"), their checklist line items, and the
//! per-form audit trail.

mod domain;
mod router;
mod service;

pub use domain::{
    AreaCode, AuditEntry, EvaluationForm, FormId, FormPatch, FormStatus, Grade, LineItem,
    LineItemId, NewAuditRecord, NewFormRecord, NewLineItemRecord, Purpose,
};
pub use router::fichas_router;
pub use service::{FichaService, FormCreated, NewFicha, NewLineItemInput};

pub(crate) use service::ImportedFicha;
