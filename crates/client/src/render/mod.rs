//! PDF synthesis from reflowed markup.
//!
//! `PdfRenderer` is the seam between the pipeline and whatever engine turns
//! a styled HTML page into a paginated document. The production engine is
//! a headless Chrome/Chromium driven through chromiumoxide (feature
//! `render`, on by default).

use std::time::Duration;
use thiserror::Error;

use cfpdf_core::Error as CoreError;

/// Errors that can occur during PDF rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to open a page or load the markup into it.
    #[error("page setup failed: {0}")]
    PageSetup(String),

    /// The engine refused to print the page.
    #[error("pdf printing failed: {0}")]
    Print(String),

    /// Rendering did not finish in time.
    #[error("render timeout after {0}ms")]
    Timeout(u64),
}

impl From<RenderError> for CoreError {
    fn from(err: RenderError) -> Self {
        CoreError::RenderFailed(err.to_string())
    }
}

/// Turns complete styled markup into PDF bytes.
#[async_trait::async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, markup: &str) -> Result<Vec<u8>, RenderError>;
}

/// Default time budget for printing one page.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Headless Chrome/Chromium renderer using chromiumoxide.
#[cfg(feature = "render")]
pub struct HeadlessRenderer {
    browser: chromiumoxide::Browser,
    timeout: Duration,
}

#[cfg(feature = "render")]
impl HeadlessRenderer {
    /// Launch a headless browser instance.
    ///
    /// Chrome DevTools Protocol events are drained by a background task for
    /// as long as the browser lives.
    pub async fn new() -> Result<Self, RenderError> {
        use chromiumoxide::browser::{Browser, BrowserConfig};
        use futures_util::StreamExt;

        let (browser, mut handler) = Browser::launch(BrowserConfig::builder().build().map_err(RenderError::BrowserLaunch)?)
            .await
            .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                    break;
                }
            }
        });

        Ok(Self { browser, timeout: DEFAULT_RENDER_TIMEOUT })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn print(&self, markup: &str) -> Result<Vec<u8>, RenderError> {
        use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::PageSetup(e.to_string()))?;

        page.set_content(markup).await.map_err(|e| RenderError::PageSetup(e.to_string()))?;

        let params = PrintToPdfParams { print_background: Some(true), ..Default::default() };
        let pdf = page.pdf(params).await.map_err(|e| RenderError::Print(e.to_string()));

        page.close().await.ok();
        pdf
    }
}

#[cfg(feature = "render")]
#[async_trait::async_trait]
impl PdfRenderer for HeadlessRenderer {
    async fn render(&self, markup: &str) -> Result<Vec<u8>, RenderError> {
        let started = std::time::Instant::now();
        let pdf = tokio::time::timeout(self.timeout, self.print(markup))
            .await
            .map_err(|_| RenderError::Timeout(self.timeout.as_millis() as u64))??;

        tracing::debug!(bytes = pdf.len(), elapsed_ms = started.elapsed().as_millis() as u64, "printed pdf");
        Ok(pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_maps_to_core() {
        let err: CoreError = RenderError::Timeout(30000).into();
        assert_eq!(err.code(), "RENDER_FAILED");
        assert!(err.to_string().contains("30000ms"));
    }

    #[cfg(feature = "render")]
    #[tokio::test]
    #[ignore = "requires Chrome/Chromium installation"]
    async fn test_headless_renderer_prints_pdf() {
        let renderer = HeadlessRenderer::new().await.unwrap();
        let pdf = renderer.render("<html><body><p>4A</p></body></html>").await.unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }
}
