//! Caller identity resolution.
//!
//! Authentication itself happens in an external session layer; by the
//! time a request reaches this service the session layer has injected
//! the caller's account identifier as a request header. Resolving that
//! identifier against the record store yields the [`Actor`] (id, name,
//! role) every gated operation requires.

use axum::http::HeaderMap;

use crate::policy::Actor;
use crate::store::{RecordStore, StoreError};

/// Header carrying the authenticated account id, set by the session layer.
pub const ACTOR_HEADER: &str = "x-actor-id";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication context missing or malformed")]
    MissingIdentity,
    #[error("authenticated account no longer exists")]
    UnknownAccount,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolve the acting account from request headers.
pub fn resolve_actor<S: RecordStore>(store: &S, headers: &HeaderMap) -> Result<Actor, AuthError> {
    let raw = headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingIdentity)?;
    let id = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| AuthError::MissingIdentity)?;

    let account = store
        .account(crate::accounts::AccountId(id))?
        .ok_or(AuthError::UnknownAccount)?;

    Ok(Actor {
        id: account.id,
        name: account.name,
        role: account.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::NewAccountRecord;
    use crate::policy::Role;
    use crate::store::memory::MemoryStore;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACTOR_HEADER, value.parse().expect("header value"));
        headers
    }

    #[test]
    fn resolves_an_existing_account() {
        let store = MemoryStore::default();
        let id = store
            .insert_account(NewAccountRecord {
                external_id: "manual-1".to_string(),
                name: "Maria".to_string(),
                email: None,
                role: Role::Manager,
                unit: None,
                facility: None,
            })
            .expect("insert");

        let actor =
            resolve_actor(&store, &headers_with(&id.0.to_string())).expect("actor resolves");
        assert_eq!(actor.id, id);
        assert_eq!(actor.role, Role::Manager);
        assert_eq!(actor.name, "Maria");
    }

    #[test]
    fn missing_header_is_rejected() {
        let store = MemoryStore::default();
        let err = resolve_actor(&store, &HeaderMap::new()).expect_err("no header");
        assert!(matches!(err, AuthError::MissingIdentity));
    }

    #[test]
    fn non_numeric_header_is_rejected() {
        let store = MemoryStore::default();
        let err = resolve_actor(&store, &headers_with("abc")).expect_err("bad header");
        assert!(matches!(err, AuthError::MissingIdentity));
    }

    #[test]
    fn unknown_account_is_rejected() {
        let store = MemoryStore::default();
        let err = resolve_actor(&store, &headers_with("42")).expect_err("unknown account");
        assert!(matches!(err, AuthError::UnknownAccount));
    }
}
