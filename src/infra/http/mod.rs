//! HTTP surface: routing and request handling.

mod handlers;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use crate::application::extract::ExtractionService;
use crate::application::pipeline::GenerationService;
use crate::application::regenerate::RegenerationService;
use crate::cache::DraftStore;
use crate::infra::db::PostgresRepositories;
use crate::infra::uploads::UploadStorage;

#[derive(Clone)]
pub struct HttpState {
    pub drafts: Arc<DraftStore>,
    pub uploads: Arc<UploadStorage>,
    pub generation: Arc<GenerationService>,
    pub extraction: Arc<ExtractionService>,
    pub regeneration: Arc<RegenerationService>,
    pub repos: PostgresRepositories,
}

pub fn build_router(state: HttpState, max_request_bytes: u64) -> Router {
    Router::new()
        .route("/uploads", post(handlers::upload_document))
        .route("/scripts/generate", post(handlers::generate_scripts))
        .route("/scripts/custom", post(handlers::generate_custom_scripts))
        .route("/scripts/regenerate", put(handlers::regenerate_script))
        .route("/content/extract", post(handlers::extract_content))
        .route(
            "/content/drafts/{handle}",
            get(handlers::get_draft).put(handlers::update_draft),
        )
        .route("/content/regenerate", post(handlers::regenerate_content))
        .route(
            "/content/regenerate-subcontent",
            post(handlers::regenerate_subcontent),
        )
        .route("/content/pending", get(handlers::pending_content))
        .route("/content/pending/files", get(handlers::pending_files))
        .route(
            "/content/pending/by-file",
            get(handlers::pending_content_by_file),
        )
        .route("/healthz", get(handlers::healthz))
        .layer(DefaultBodyLimit::max(max_request_bytes as usize))
        .with_state(state)
}
