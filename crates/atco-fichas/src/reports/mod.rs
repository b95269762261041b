//! Saved report records generated by coordinators and above.

mod router;

pub use router::reports_router;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::accounts::AccountId;
use crate::error::ServiceError;
use crate::policy::{authorize, Actor, Operation};
use crate::store::{RecordStore, StoreError};

/// Identifier wrapper for saved reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ReportId(pub i64);

/// A stored query result. Parameters and results stay as opaque
/// serialized blobs; this service only files them away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub title: String,
    pub kind: String,
    pub creator_id: AccountId,
    pub creator_name: String,
    pub parameters: Option<String>,
    pub result: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Report fields persisted on insert; creator comes from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReportRecord {
    pub title: String,
    pub kind: String,
    pub creator_id: AccountId,
    pub creator_name: String,
    pub parameters: Option<String>,
    pub result: Option<String>,
}

/// Report creation input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub title: String,
    pub kind: String,
    #[serde(default)]
    pub parameters: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
}

pub struct ReportService<S> {
    store: Arc<S>,
}

impl<S> Clone for ReportService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: RecordStore> ReportService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// List the caller's own reports.
    pub fn list(&self, actor: &Actor) -> Result<Vec<Report>, ServiceError> {
        match self.store.reports_by_creator(actor.id) {
            Ok(reports) => Ok(reports),
            Err(StoreError::Unavailable(reason)) => {
                warn!(%reason, "report listing degraded to empty result");
                Ok(Vec::new())
            }
        }
    }

    pub fn create(&self, actor: &Actor, input: NewReport) -> Result<ReportId, ServiceError> {
        authorize(actor, Operation::CreateReport, None)?;
        if input.title.trim().is_empty() || input.kind.trim().is_empty() {
            return Err(ServiceError::Validation(
                "report title and type are required".to_string(),
            ));
        }

        let id = self.store.insert_report(NewReportRecord {
            title: input.title,
            kind: input.kind,
            creator_id: actor.id,
            creator_name: actor.name.clone(),
            parameters: input.parameters,
            result: input.result,
        })?;
        Ok(id)
    }
}
