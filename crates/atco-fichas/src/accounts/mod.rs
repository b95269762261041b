//! User accounts and their management operations.

mod router;

pub use router::accounts_router;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ServiceError;
use crate::policy::{authorize, Actor, Operation, Role};
use crate::store::{RecordStore, StoreError};

/// Identifier wrapper for user accounts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccountId(pub i64);

/// One user of the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    /// Login identifier assigned by the external identity provider, or a
    /// generated placeholder for manually created accounts.
    pub external_id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: Role,
    pub unit: Option<String>,
    pub facility: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_signed_in: Option<DateTime<Utc>>,
}

/// Account fields persisted on insert; id and timestamps come from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccountRecord {
    pub external_id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: Role,
    pub unit: Option<String>,
    pub facility: Option<String>,
}

/// Administrative account creation input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub facility: Option<String>,
}

/// Partial account update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub facility: Option<String>,
}

static MANUAL_ACCOUNT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn manual_external_id() -> String {
    let sequence = MANUAL_ACCOUNT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("manual-{}-{sequence}", Utc::now().timestamp_millis())
}

/// Account management service, gated to managers and administrators.
pub struct AccountService<S> {
    store: Arc<S>,
}

impl<S> Clone for AccountService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: RecordStore> AccountService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// List every account. Reads degrade to an empty set when the store
    /// is unreachable so management views stay functional.
    pub fn list(&self, actor: &Actor) -> Result<Vec<Account>, ServiceError> {
        authorize(actor, Operation::ListAccounts, None)?;
        match self.store.list_accounts() {
            Ok(accounts) => Ok(accounts),
            Err(StoreError::Unavailable(reason)) => {
                warn!(%reason, "account listing degraded to empty result");
                Ok(Vec::new())
            }
        }
    }

    pub fn create(&self, actor: &Actor, input: NewAccount) -> Result<AccountId, ServiceError> {
        authorize(actor, Operation::ManageAccounts, None)?;
        if input.name.trim().is_empty() {
            return Err(ServiceError::Validation(
                "account name is required".to_string(),
            ));
        }

        let id = self.store.insert_account(NewAccountRecord {
            external_id: manual_external_id(),
            name: input.name,
            email: input.email,
            role: input.role,
            unit: input.unit,
            facility: input.facility,
        })?;
        Ok(id)
    }

    pub fn update(
        &self,
        actor: &Actor,
        id: AccountId,
        patch: AccountPatch,
    ) -> Result<(), ServiceError> {
        authorize(actor, Operation::ManageAccounts, None)?;
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(ServiceError::Validation(
                    "account name must not be blank".to_string(),
                ));
            }
        }

        if self.store.update_account(id, patch)? {
            Ok(())
        } else {
            Err(ServiceError::NotFound("account"))
        }
    }

    /// Delete an account. References from existing forms are not
    /// validated; their denormalized name snapshots keep history legible.
    pub fn delete(&self, actor: &Actor, id: AccountId) -> Result<(), ServiceError> {
        authorize(actor, Operation::ManageAccounts, None)?;
        if self.store.delete_account(id)? {
            Ok(())
        } else {
            Err(ServiceError::NotFound("account"))
        }
    }
}
