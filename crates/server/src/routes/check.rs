//! `POST /check-availability`.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::{ContestId, reference};
use crate::error::ApiError;
use crate::handler::AppState;
use cfpdf_client::extract::PLACEHOLDER_TITLE;
use cfpdf_client::reflow::format_seconds;
use cfpdf_core::Error;

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub contest_id: Option<ContestId>,
    #[serde(default)]
    pub problem: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub success: bool,
    pub message: String,
    pub title: String,
    pub time_limit: String,
    pub memory_limit: String,
    pub rating: u32,
}

pub async fn check_availability(
    State(state): State<AppState>, Json(request): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, ApiError> {
    let (Some(contest_id), Some(_)) = (&request.contest_id, &request.problem) else {
        return Err(ApiError::invalid("Contest ID and Problem ID are required"));
    };
    let reference = reference(contest_id.parse()?, request.problem.as_deref())?;

    tracing::info!(problem = %reference, "checking availability");
    let doc = state
        .pipeline
        .check(&reference)
        .await
        .map_err(|exhausted| {
            if exhausted.blocked() {
                ApiError::blocked()
            } else {
                ApiError::Core(Error::FetchExhausted(format!("Problem {reference} could not be accessed")))
            }
        })?;

    let title = if doc.title == PLACEHOLDER_TITLE { format!("Problem {reference}") } else { doc.title };

    Ok(Json(CheckResponse {
        success: true,
        message: "Problem is available".into(),
        title,
        time_limit: format_seconds(doc.time_limit_seconds),
        memory_limit: format!("{} MB", doc.memory_limit_mb),
        rating: doc.rating,
    }))
}
