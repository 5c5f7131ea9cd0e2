//! End-to-end conversion of problems into PDFs.
//!
//! One run is strictly sequential: candidates, fetch, extract (or a
//! diagnostic placeholder), formula pass, reflow, PDF. Contest runs repeat
//! that per discovered label and contain each failure to its own item.

use cfpdf_core::{AppConfig, Error, NormalizedDocument, ProblemReference, RenderMode, RenderedDocument, Reporter};
use std::sync::Arc;

use crate::extract::{diagnostic_document, extract, parse_contest_labels};
use crate::fetch::{
    DEFAULT_ORIGIN, Exhausted, FetchExecutor, FetchResult, IdentityProfile, Transport, contest_page_candidates,
    generate_candidates,
};
use crate::formula::{render_formulas, renderer_for};
use crate::package::{BatchItem, BatchItemStatus, BatchReport};
use crate::reflow::reflow;
use crate::render::PdfRenderer;

/// A finished single-problem run.
///
/// `warning` is set when every fetch attempt failed and `document` is the
/// rendered placeholder rather than the problem statement.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub document: RenderedDocument,
    pub warning: Option<Exhausted>,
}

pub struct Pipeline {
    executor: FetchExecutor,
    renderer: Arc<dyn PdfRenderer>,
    reporter: Arc<dyn Reporter>,
    origin: String,
    fallback_labels: Vec<String>,
}

impl Pipeline {
    pub fn new(transport: Arc<dyn Transport>, renderer: Arc<dyn PdfRenderer>, reporter: Arc<dyn Reporter>) -> Self {
        let defaults = AppConfig::default();
        Self {
            executor: FetchExecutor::new(transport, reporter.clone()),
            renderer,
            reporter,
            origin: DEFAULT_ORIGIN.to_string(),
            fallback_labels: defaults.fallback_labels,
        }
    }

    pub fn from_config(
        config: &AppConfig, transport: Arc<dyn Transport>, renderer: Arc<dyn PdfRenderer>, reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self::new(transport, renderer, reporter)
            .with_origin(config.origin())
            .with_fallback_labels(config.fallback_labels.clone())
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.trim_end_matches('/').to_string();
        self
    }

    pub fn with_fallback_labels(mut self, labels: Vec<String>) -> Self {
        self.fallback_labels = labels;
        self
    }

    pub fn with_identities(mut self, identities: Vec<IdentityProfile>) -> Self {
        self.executor = self.executor.with_identities(identities);
        self
    }

    /// Fetch and extract without rendering.
    pub async fn check(&self, reference: &ProblemReference) -> Result<NormalizedDocument, Exhausted> {
        match self.executor.fetch_content(&generate_candidates(&self.origin, reference)).await {
            FetchResult::Success { html, .. } => Ok(extract(&html)),
            FetchResult::Exhausted(exhausted) => Err(exhausted),
        }
    }

    /// Convert one problem.
    ///
    /// Fetch exhaustion is not an error: the placeholder document is
    /// rendered and the diagnostics are returned as `warning`. Only render
    /// faults fail the run.
    pub async fn run(&self, reference: &ProblemReference, mode: RenderMode) -> Result<PipelineOutcome, Error> {
        self.reporter.debug(&format!("fetching problem webpage: {reference}"));

        let (doc, warning) = match self.executor.fetch_content(&generate_candidates(&self.origin, reference)).await {
            FetchResult::Success { html, url, .. } => {
                let doc = extract(&html);
                if doc.rating > 0 {
                    self.reporter.info(&format!("fetched {url} (difficulty rating: {})", doc.rating));
                } else {
                    self.reporter.info(&format!("fetched {url} (difficulty rating unknown)"));
                }
                (doc, None)
            }
            FetchResult::Exhausted(exhausted) => {
                self.reporter.info("Generating placeholder PDF with error message");
                (diagnostic_document(reference, &exhausted, &self.origin), Some(exhausted))
            }
        };

        let doc = self.adapt_formulas(doc, mode);

        self.reporter.debug("building pdf");
        let markup = reflow(&doc)?;
        let content = self.renderer.render(&markup).await?;

        Ok(PipelineOutcome { document: RenderedDocument::new(reference, content), warning })
    }

    /// Problem labels of a contest, or the fallback set when no listing page can be read.
    pub async fn discover_labels(&self, contest_id: u32) -> Vec<String> {
        let urls = contest_page_candidates(&self.origin, contest_id);
        match self.executor.fetch_with(&urls, |body| !parse_contest_labels(body).is_empty()).await {
            FetchResult::Success { html, .. } => {
                let labels = parse_contest_labels(&html);
                self.reporter.info(&format!("Found {} problems in contest {contest_id}: {}", labels.len(), labels.join(", ")));
                labels
            }
            FetchResult::Exhausted(_) => {
                self.reporter.warn(&format!(
                    "Could not discover problems for contest {contest_id}; using {}",
                    self.fallback_labels.join(", ")
                ));
                self.fallback_labels.clone()
            }
        }
    }

    /// Convert every problem of a contest, one at a time.
    pub async fn run_contest(&self, contest_id: u32, mode: RenderMode) -> Result<BatchReport, Error> {
        if contest_id == 0 {
            return Err(Error::InvalidInput("contest id must be a positive number".into()));
        }

        let labels = self.discover_labels(contest_id).await;
        let mut items = Vec::with_capacity(labels.len());

        for label in labels {
            let status = match ProblemReference::new(contest_id, &label) {
                Ok(reference) => self.run_item(&reference, mode).await,
                Err(e) => BatchItemStatus::Failed { reason: e.to_string() },
            };
            items.push(BatchItem { label, status });
        }

        let report = BatchReport { contest_id, items };
        self.reporter.info(&format!("contest {contest_id}: {}", report.summary().message()));
        Ok(report)
    }

    async fn run_item(&self, reference: &ProblemReference, mode: RenderMode) -> BatchItemStatus {
        match self.run(reference, mode).await {
            Ok(PipelineOutcome { warning: Some(exhausted), .. }) => {
                self.reporter.warn(&format!("Skipping {reference}: {}", exhausted.summary()));
                BatchItemStatus::Placeholder { reason: exhausted.summary() }
            }
            Ok(PipelineOutcome { document, warning: None }) => BatchItemStatus::Success(document),
            Err(e) => {
                self.reporter.error(&format!("Failed to convert {reference}: {e}"));
                BatchItemStatus::Failed { reason: e.to_string() }
            }
        }
    }

    fn adapt_formulas(&self, mut doc: NormalizedDocument, mode: RenderMode) -> NormalizedDocument {
        self.reporter.debug("rendering latex");
        let renderer = renderer_for(mode);
        doc.statement_markup = render_formulas(&doc.statement_markup, renderer, self.reporter.as_ref());
        doc.notes_markup = doc
            .notes_markup
            .map(|notes| render_formulas(&notes, renderer, self.reporter.as_ref()));
        doc
    }
}
