//! Router and shared state for the web front end.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/check-availability` | Fetch and extract one problem, report its header data |
//! | `POST` | `/convert` | Render one problem (PDF) or a whole contest (zip) |
//! | `GET`  | `/health` | Health check (returns version) |

use axum::Router;
use axum::routing::{get, post};
use cfpdf_client::Pipeline;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::routes::{check, convert, health};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    /// Generated documents are also kept here (last write wins).
    pub output_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, output_dir: PathBuf) -> Self {
        Self { pipeline: Arc::new(pipeline), output_dir: Arc::new(output_dir) }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/check-availability", post(check::check_availability))
        .route("/convert", post(convert::convert))
        .route("/health", get(health::health))
        .layer(cors)
        .with_state(state)
}
