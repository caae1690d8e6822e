//! HTTP routes.

pub mod documents;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use cosign::drive::DocumentService;
use cosign::store::RecordStore;
use cosign::Cosigner;

/// Build the service router around a shared Cosigner.
pub fn router<S, D>(cosigner: Arc<Cosigner<S, D>>) -> Router
where
    S: RecordStore + 'static,
    D: DocumentService + 'static,
{
    Router::new()
        .route("/healthz", get(healthz))
        .route("/document/create", post(documents::create::<S, D>))
        .route("/document/perm", post(documents::perm::<S, D>))
        .route("/document/sign", post(documents::sign::<S, D>))
        .route("/document/list", post(documents::list::<S, D>))
        .with_state(cosigner)
}

async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
