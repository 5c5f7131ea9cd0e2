//! Structured errors for the cfpdf web front end.
//!
//! Every failure leaves the server as `{ "success": false, "message": ... }`
//! with a status code picked from the core error kind.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cfpdf_client::Exhausted;
use cfpdf_core::{Error, ProblemReference};
use serde::Serialize;

/// Structured errors for the web front end.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A core failure (bad input, render fault, I/O).
    #[error(transparent)]
    Core(#[from] Error),

    /// Nothing in a contest batch could be converted.
    #[error("{0}")]
    Unavailable(String),
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::Core(Error::InvalidInput(message.into()))
    }

    /// Message for a problem whose fetch was exhausted, singling out 403 blocking.
    pub fn exhausted(reference: &ProblemReference, exhausted: &Exhausted) -> Self {
        if exhausted.blocked() {
            Self::blocked()
        } else {
            ApiError::Core(Error::FetchExhausted(format!(
                "Unable to fetch problem {reference} from Codeforces. Please verify the Contest ID and Problem ID are correct."
            )))
        }
    }

    /// At least one attempt was refused with 403 Forbidden.
    pub fn blocked() -> Self {
        ApiError::Core(Error::FetchExhausted(
            "Unable to access Codeforces (403 Forbidden). Codeforces might be blocking our requests. \
             Try a different contest or problem, or try again later."
                .into(),
        ))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(Error::InvalidInput(_) | Error::InvalidUrl(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(Error::FetchExhausted(_)) | ApiError::Unavailable(_) => StatusCode::BAD_GATEWAY,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing message without the internal code prefix.
    pub fn message(&self) -> String {
        match self {
            ApiError::Core(
                Error::InvalidInput(msg)
                | Error::InvalidUrl(msg)
                | Error::HttpError(msg)
                | Error::FetchExhausted(msg)
                | Error::RenderFailed(msg)
                | Error::ArchiveFailed(msg),
            ) => msg.clone(),
            ApiError::Core(err @ Error::Io(_)) => err.to_string(),
            ApiError::Unavailable(msg) => msg.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub message: String,
}

impl FailureBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{self}");
        } else {
            tracing::warn!(status = status.as_u16(), "{self}");
        }
        (status, Json(FailureBody::new(self.message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfpdf_client::fetch::{AttemptOutcome, FetchAttempt};

    fn exhausted_with(status: u16) -> Exhausted {
        Exhausted {
            attempts: vec![FetchAttempt {
                url: "https://codeforces.com/contest/4/problem/A".into(),
                identity: "chrome-windows",
                outcome: AttemptOutcome::HttpError(status),
            }],
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::invalid("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Core(Error::RenderFailed("x".into())).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::Unavailable("x".into()).status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_message_strips_code() {
        let err = ApiError::invalid("Contest ID must be a number");
        assert_eq!(err.message(), "Contest ID must be a number");
    }

    #[test]
    fn test_exhausted_blocked_message() {
        let reference = ProblemReference::new(4, "A").unwrap();
        assert!(ApiError::exhausted(&reference, &exhausted_with(403)).message().contains("403 Forbidden"));

        let message = ApiError::exhausted(&reference, &exhausted_with(404)).message();
        assert!(message.contains("Unable to fetch problem 4A"));
    }

    #[test]
    fn test_exhausted_maps_to_bad_gateway() {
        let reference = ProblemReference::new(4, "A").unwrap();
        let err = ApiError::exhausted(&reference, &exhausted_with(404));
        assert!(matches!(err, ApiError::Core(Error::FetchExhausted(_))));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError::Core(Error::InvalidUrl("x".into())).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::invalid("bad").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
