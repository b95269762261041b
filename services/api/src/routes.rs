use crate::infra::AppState;
use atco_fichas::accounts::{accounts_router, AccountService};
use atco_fichas::catalog::{catalog_router, CatalogService};
use atco_fichas::evaluation::{fichas_router, FichaService};
use atco_fichas::reports::{reports_router, ReportService};
use atco_fichas::store::RecordStore;
use atco_fichas::transfer::{transfer_router, TransferService};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// All domain routers plus the operational endpoints, sharing one store.
pub(crate) fn with_domain_routes<S: RecordStore + 'static>(store: Arc<S>) -> axum::Router {
    axum::Router::new()
        .merge(accounts_router(Arc::new(AccountService::new(store.clone()))))
        .merge(fichas_router(Arc::new(FichaService::new(store.clone()))))
        .merge(catalog_router(Arc::new(CatalogService::new(store.clone()))))
        .merge(reports_router(Arc::new(ReportService::new(store.clone()))))
        .merge(transfer_router(Arc::new(TransferService::new(store))))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body.get("status"), Some(&json!("ok")));
    }
}
