use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Serialize;

use super::{Account, AccountId, AccountPatch, AccountService, NewAccount};
use crate::auth::resolve_actor;
use crate::error::AppError;
use crate::store::RecordStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MutationOutcome {
    success: bool,
    message: String,
}

pub fn accounts_router<S: RecordStore + 'static>(service: Arc<AccountService<S>>) -> Router {
    Router::new()
        .route(
            "/api/v1/accounts",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route(
            "/api/v1/accounts/:id",
            patch(update_handler::<S>).delete(delete_handler::<S>),
        )
        .with_state(service)
}

async fn list_handler<S: RecordStore>(
    State(service): State<Arc<AccountService<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Account>>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    Ok(Json(service.list(&actor)?))
}

async fn create_handler<S: RecordStore>(
    State(service): State<Arc<AccountService<S>>>,
    headers: HeaderMap,
    Json(input): Json<NewAccount>,
) -> Result<Json<MutationOutcome>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    service.create(&actor, input)?;
    Ok(Json(MutationOutcome {
        success: true,
        message: "account created".to_string(),
    }))
}

async fn update_handler<S: RecordStore>(
    State(service): State<Arc<AccountService<S>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(patch): Json<AccountPatch>,
) -> Result<Json<MutationOutcome>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    service.update(&actor, AccountId(id), patch)?;
    Ok(Json(MutationOutcome {
        success: true,
        message: "account updated".to_string(),
    }))
}

async fn delete_handler<S: RecordStore>(
    State(service): State<Arc<AccountService<S>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<MutationOutcome>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    service.delete(&actor, AccountId(id))?;
    Ok(Json(MutationOutcome {
        success: true,
        message: "account deleted".to_string(),
    }))
}
