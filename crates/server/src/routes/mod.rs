//! Route handlers.

pub mod check;
pub mod convert;
pub mod health;

use cfpdf_core::ProblemReference;
use serde::Deserialize;

use crate::error::ApiError;

/// Contest id as sent by the page: a JSON number or a (possibly blank) string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContestId {
    Number(u64),
    Text(String),
}

impl ContestId {
    pub fn parse(&self) -> Result<u32, ApiError> {
        let id = match self {
            ContestId::Number(n) => u32::try_from(*n).ok(),
            ContestId::Text(s) if s.trim().is_empty() => return Err(ApiError::invalid("Contest ID is required")),
            ContestId::Text(s) => s.trim().parse::<u32>().ok(),
        };
        id.filter(|id| *id > 0).ok_or_else(|| ApiError::invalid("Contest ID must be a number"))
    }
}

/// Validated reference from raw form/JSON fields.
pub fn reference(contest_id: u32, problem: Option<&str>) -> Result<ProblemReference, ApiError> {
    let problem = problem.map(str::trim).filter(|p| !p.is_empty()).ok_or_else(|| {
        ApiError::invalid("Problem ID is required for single problem download")
    })?;
    ProblemReference::new(contest_id, problem)
        .map_err(|_| ApiError::invalid("Problem ID must be a letter or alphanumeric code (e.g., A, B, C)"))
}
