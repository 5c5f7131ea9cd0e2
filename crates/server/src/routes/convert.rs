//! `POST /convert`.
//!
//! Single problems come back as a PDF attachment, whole contests as a zip
//! with per-batch counts in `x-problems-succeeded` / `x-problems-skipped`.
//! Everything generated is also written to the output directory.

use axum::Form;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use cfpdf_client::{parse_problem_url, write_bytes};
use cfpdf_core::{Error, RenderMode};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use super::{ContestId, reference};
use crate::error::ApiError;
use crate::handler::AppState;

pub const SUCCEEDED_HEADER: &str = "x-problems-succeeded";
pub const SKIPPED_HEADER: &str = "x-problems-skipped";

#[derive(Debug, Default, Deserialize)]
pub struct ConvertForm {
    #[serde(default)]
    pub contest_id: Option<String>,
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub problem_url: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub all_problems: Option<String>,
}

impl ConvertForm {
    fn all_problems(&self) -> bool {
        self.all_problems.as_deref() == Some("true")
    }

    fn mode(&self) -> Result<RenderMode, ApiError> {
        match self.mode.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            Some(mode) => RenderMode::from_str(mode).map_err(|_| ApiError::invalid(format!("unsupported mode: {mode}"))),
            None => Ok(RenderMode::Default),
        }
    }

    /// Contest id and problem, with `problem_url` taking precedence when given.
    /// In batch mode only the contest id is taken from the URL.
    fn target(&self) -> Result<(Option<String>, Option<String>), ApiError> {
        let mut contest_id = self.contest_id.clone();
        let mut problem = self.problem.clone();

        if let Some(url) = self.problem_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            let (id, label) = parse_problem_url(url)
                .ok_or_else(|| Error::InvalidUrl(format!("Not a Codeforces problem URL: {url}")))?;
            contest_id = Some(id.to_string());
            if !self.all_problems() {
                problem = Some(label);
            }
        }
        Ok((contest_id, problem))
    }
}

pub async fn convert(State(state): State<AppState>, Form(form): Form<ConvertForm>) -> Result<Response, ApiError> {
    let (contest_id, problem) = form.target()?;
    let contest_id = ContestId::Text(contest_id.unwrap_or_default()).parse()?;
    let mode = form.mode()?;

    if form.all_problems() {
        convert_contest(&state, contest_id, mode).await
    } else {
        convert_problem(&state, contest_id, problem.as_deref(), mode).await
    }
}

async fn convert_problem(
    state: &AppState, contest_id: u32, problem: Option<&str>, mode: RenderMode,
) -> Result<Response, ApiError> {
    let reference = reference(contest_id, problem)?;
    tracing::info!(problem = %reference, %mode, "converting problem");

    let outcome = state.pipeline.run(&reference, mode).await?;
    if let Some(exhausted) = &outcome.warning {
        return Err(ApiError::exhausted(&reference, exhausted));
    }

    let document = outcome.document;
    keep_copy(&state.output_dir, &document.file_name, &document.content).await;
    tracing::info!(file = %document.file_name, bytes = document.content.len(), "PDF generated");

    Ok(attachment("application/pdf", &document.file_name, document.content, []))
}

async fn convert_contest(state: &AppState, contest_id: u32, mode: RenderMode) -> Result<Response, ApiError> {
    tracing::info!(contest_id, %mode, "converting contest");

    let report = state.pipeline.run_contest(contest_id, mode).await?;
    let summary = report.summary();
    if summary.succeeded == 0 {
        return Err(ApiError::Unavailable(format!(
            "Unable to find problems for contest {contest_id}. Please verify the contest ID."
        )));
    }

    for document in report.documents() {
        keep_copy(&state.output_dir, &document.file_name, &document.content).await;
    }

    let archive = report.to_archive()?;
    let name = report.archive_name();
    keep_copy(&state.output_dir, &name, &archive).await;
    tracing::info!(contest_id, "{}", summary.message());

    Ok(attachment(
        "application/zip",
        &name,
        archive,
        [(SUCCEEDED_HEADER, summary.succeeded.to_string()), (SKIPPED_HEADER, summary.skipped.to_string())],
    ))
}

/// Best-effort copy into the output directory; the download does not depend on it.
async fn keep_copy(dir: &Path, file_name: &str, content: &[u8]) {
    if let Err(e) = write_bytes(dir, file_name, content).await {
        tracing::warn!(file = file_name, "could not write to output directory: {e}");
    }
}

fn attachment<const N: usize>(
    content_type: &str, file_name: &str, body: Vec<u8>, extra: [(&'static str, String); N],
) -> Response {
    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
    ];
    (headers, extra, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CONTEST_PAGE, ORIGIN, PROBLEM_PAGE, state};
    use axum::http::StatusCode;

    fn form(contest_id: &str, problem: &str) -> ConvertForm {
        ConvertForm { contest_id: Some(contest_id.into()), problem: Some(problem.into()), ..Default::default() }
    }

    fn header<'a>(response: &'a Response, name: &str) -> &'a str {
        response.headers().get(name).unwrap().to_str().unwrap()
    }

    #[test]
    fn test_target_prefers_problem_url() {
        let form = ConvertForm {
            contest_id: Some("1".into()),
            problem: Some("C".into()),
            problem_url: Some("https://codeforces.com/problemset/problem/4/a".into()),
            ..Default::default()
        };
        assert_eq!(form.target().unwrap(), (Some("4".to_string()), Some("a".to_string())));
    }

    #[test]
    fn test_target_batch_keeps_problem() {
        let form = ConvertForm {
            problem: Some("C".into()),
            problem_url: Some("https://codeforces.com/gym/102951/problem/B".into()),
            all_problems: Some("true".into()),
            ..Default::default()
        };
        assert_eq!(form.target().unwrap(), (Some("102951".to_string()), Some("C".to_string())));
    }

    #[test]
    fn test_target_blank_url_is_ignored() {
        let form = ConvertForm { problem_url: Some("  ".into()), ..form("4", "B") };
        assert_eq!(form.target().unwrap(), (Some("4".to_string()), Some("B".to_string())));
    }

    #[tokio::test]
    async fn test_convert_rejects_unparseable_url() {
        let (state, _dir) = state(&[]);
        let form = ConvertForm { problem_url: Some("https://example.com/blog/42".into()), ..form("4", "A") };

        let err = convert(State(state), Form(form)).await.unwrap_err();

        assert!(matches!(err, ApiError::Core(Error::InvalidUrl(_))));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Not a Codeforces problem URL: https://example.com/blog/42");
    }

    #[test]
    fn test_mode_parsing() {
        let mut form = form("4", "A");
        assert_eq!(form.mode().unwrap(), RenderMode::Default);
        form.mode = Some("Graphics".into());
        assert_eq!(form.mode().unwrap(), RenderMode::Graphics);
        form.mode = Some("turbo".into());
        assert_eq!(form.mode().unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_convert_single_problem() {
        let (state, dir) = state(&[(&format!("{ORIGIN}/contest/4/problem/A"), 200, PROBLEM_PAGE)]);

        let response = convert(State(state), Form(form("4", "a"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "content-type"), "application/pdf");
        assert_eq!(header(&response, "content-disposition"), "attachment; filename=\"4A.pdf\"");
        assert!(dir.path().join("outputs").join("4A.pdf").exists());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_convert_blocked_problem() {
        let pages: Vec<String> = ["contest/4/problem/A", "problemset/problem/4/A", "gym/4/problem/A"]
            .iter()
            .flat_map(|p| [format!("{ORIGIN}/{p}"), format!("{ORIGIN}/{}", p.to_lowercase())])
            .collect();
        let scripted: Vec<(&str, u16, &str)> = pages.iter().map(|u| (u.as_str(), 403, "Forbidden")).collect();
        let (state, _dir) = state(&scripted);

        let err = convert(State(state), Form(form("4", "A"))).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(err.message().contains("403 Forbidden"));
    }

    #[tokio::test]
    async fn test_convert_requires_problem() {
        let (state, _dir) = state(&[]);
        let err = convert(State(state), Form(form("4", " "))).await.unwrap_err();
        assert_eq!(err.message(), "Problem ID is required for single problem download");
    }

    #[tokio::test]
    async fn test_convert_requires_contest() {
        let (state, _dir) = state(&[]);
        let err = convert(State(state), Form(ConvertForm::default())).await.unwrap_err();
        assert_eq!(err.message(), "Contest ID is required");
    }

    #[tokio::test]
    async fn test_convert_contest_archive() {
        let (state, dir) = state(&[
            (&format!("{ORIGIN}/contest/4"), 200, CONTEST_PAGE),
            (&format!("{ORIGIN}/contest/4/problem/A"), 200, PROBLEM_PAGE),
        ]);
        let form = ConvertForm { contest_id: Some("4".into()), all_problems: Some("true".into()), ..Default::default() };

        let response = convert(State(state), Form(form)).await.unwrap();

        assert_eq!(header(&response, "content-type"), "application/zip");
        assert_eq!(header(&response, "content-disposition"), "attachment; filename=\"contest_4_problems.zip\"");
        assert_eq!(header(&response, SUCCEEDED_HEADER), "1");
        assert_eq!(header(&response, SKIPPED_HEADER), "1");
        assert!(dir.path().join("outputs").join("contest_4_problems.zip").exists());
        assert!(dir.path().join("outputs").join("4A.pdf").exists());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_convert_contest_nothing_converted() {
        let (state, _dir) = state(&[]);
        let form = ConvertForm { contest_id: Some("4".into()), all_problems: Some("true".into()), ..Default::default() };

        let err = convert(State(state), Form(form)).await.unwrap_err();
        assert!(err.message().contains("Unable to find problems for contest 4"));
    }
}
