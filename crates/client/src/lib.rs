//! Client code for cfpdf.
//!
//! This crate provides the fetch strategy, content extraction, formula
//! pass-through, reflow, PDF rendering seam and packaging used by the
//! server and CLI.

pub mod extract;
pub mod fetch;
pub mod formula;
pub mod package;
pub mod pipeline;
pub mod reflow;
pub mod render;

pub use extract::{classify_rating, color_for, diagnostic_document, extract, parse_contest_labels};
pub use fetch::{
    Exhausted, FetchConfig, FetchExecutor, FetchResult, ReqwestTransport, Transport, generate_candidates,
    parse_problem_url,
};
pub use formula::{FormulaRenderer, LatexFormula, MarkupFormulaRenderer, adapt_formulas};
pub use package::{BatchItem, BatchItemStatus, BatchReport, BatchSummary, archive_name, write_bytes, write_document};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use reflow::{format_seconds, reflow};
#[cfg(feature = "render")]
pub use render::HeadlessRenderer;
pub use render::{PdfRenderer, RenderError};
