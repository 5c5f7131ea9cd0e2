//! In-memory collaborators for handler tests.

use async_trait::async_trait;
use cfpdf_client::fetch::{IdentityProfile, Transport, TransportError, TransportResponse};
use cfpdf_client::{PdfRenderer, Pipeline, RenderError};
use cfpdf_core::MemoryReporter;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

use crate::handler::AppState;

pub const ORIGIN: &str = "https://codeforces.com";

pub const PROBLEM_PAGE: &str = r#"
    <div class="problemindexholder">
      <div class="problem-statement">
        <div class="header">
          <div class="title">A. Watermelon</div>
          <div class="time-limit">time limit per test 1 second</div>
          <div class="memory-limit">memory limit per test 64 megabytes</div>
        </div>
        <div><p>Divide $$$w$$$ kilos.</p></div>
        <div class="input"><pre>8</pre></div>
        <div class="output"><pre>YES</pre></div>
      </div>
    </div>
    <span class="tag-box" title="Difficulty">*800</span>
"#;

pub const CONTEST_PAGE: &str = r#"
    <table class="problems">
      <tr><th>#</th><th>Name</th></tr>
      <tr><td><a href="/contest/4/problem/A">A</a></td><td>Watermelon</td></tr>
      <tr><td><a href="/contest/4/problem/B">B</a></td><td>Before an Exam</td></tr>
    </table>
"#;

/// Fixed pages by URL; anything else is a 404.
pub struct StaticTransport {
    pages: HashMap<String, (u16, String)>,
}

#[async_trait]
impl Transport for StaticTransport {
    async fn get(&self, url: &str, _identity: &IdentityProfile) -> Result<TransportResponse, TransportError> {
        let (status, body) = self.pages.get(url).cloned().unwrap_or_else(|| (404, "Not Found".into()));
        Ok(TransportResponse { status, body })
    }
}

pub struct EchoRenderer;

#[async_trait]
impl PdfRenderer for EchoRenderer {
    async fn render(&self, markup: &str) -> Result<Vec<u8>, RenderError> {
        Ok(format!("%PDF-{}", markup.len()).into_bytes())
    }
}

/// App state over the given pages, writing into a fresh temp dir.
pub fn state(pages: &[(&str, u16, &str)]) -> (AppState, TempDir) {
    let transport = StaticTransport {
        pages: pages.iter().map(|(url, status, body)| (url.to_string(), (*status, body.to_string()))).collect(),
    };
    let pipeline = Pipeline::new(Arc::new(transport), Arc::new(EchoRenderer), Arc::new(MemoryReporter::new()))
        .with_origin(ORIGIN)
        .with_fallback_labels(vec!["A".into(), "B".into()]);

    let dir = tempfile::tempdir().unwrap();
    (AppState::new(pipeline, dir.path().join("outputs")), dir)
}
