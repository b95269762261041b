//! Bulk tabular export and import of evaluation-form records, plus the
//! document-export stub.

mod export;
mod import;
mod router;

pub use export::{CsvExport, DocumentExport, ExportFilter};
pub use import::ImportOutcome;
pub use router::transfer_router;

use std::sync::Arc;

use crate::evaluation::FichaService;
use crate::store::RecordStore;

/// Import/export service. Delegates record access to the evaluation
/// workflow so both sides share one creation path and one scope rule.
pub struct TransferService<S> {
    fichas: FichaService<S>,
}

impl<S> Clone for TransferService<S> {
    fn clone(&self) -> Self {
        Self {
            fichas: self.fichas.clone(),
        }
    }
}

impl<S: RecordStore> TransferService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            fichas: FichaService::new(store),
        }
    }

    pub fn store(&self) -> &S {
        self.fichas.store()
    }

    pub(crate) fn fichas(&self) -> &FichaService<S> {
        &self.fichas
    }
}
