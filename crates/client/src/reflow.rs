//! Reflow of a `NormalizedDocument` into a standalone styled HTML page.
//!
//! The page is rebuilt from scratch rather than patched: a centered header
//! (title, difficulty badge, limits, I/O lines), the statement body, one
//! "Examples" section with two-column input/output panels, and a "Note"
//! section. Statement and note markup are embedded verbatim; the title and
//! sample text are escaped.

use askama::Template;
use cfpdf_core::{Error, NormalizedDocument, SampleTest};

use crate::extract::color_for;

#[derive(Debug)]
struct Badge {
    rating: u32,
    color: &'static str,
}

#[derive(Debug)]
struct Limits {
    time: String,
    memory: String,
}

#[derive(Template)]
#[template(path = "problem.html")]
struct ProblemPage<'a> {
    title: &'a str,
    badge: Option<Badge>,
    limits: Option<Limits>,
    body: &'a str,
    samples: &'a [SampleTest],
    notes: Option<&'a str>,
}

/// Render the final styled page for `doc`.
///
/// The badge is omitted for an unknown (0) rating and the limit lines are
/// omitted for the diagnostic placeholder.
pub fn reflow(doc: &NormalizedDocument) -> Result<String, Error> {
    let page = ProblemPage {
        title: &doc.title,
        badge: (doc.rating > 0).then(|| Badge { rating: doc.rating, color: color_for(i64::from(doc.rating)) }),
        limits: (!doc.diagnostic).then(|| Limits {
            time: format_seconds(doc.time_limit_seconds),
            memory: format!("{} megabytes", doc.memory_limit_mb),
        }),
        body: &doc.statement_markup,
        samples: &doc.samples,
        notes: doc.notes_markup.as_deref(),
    };

    page.render().map_err(|e| Error::RenderFailed(format!("reflow template: {e}")))
}

/// Human-readable time limit: "1 second", "2 seconds", "1.5 seconds".
pub fn format_seconds(seconds: f64) -> String {
    let value = format!("{seconds}");
    if value == "1" { "1 second".to_string() } else { format!("{value} seconds") }
}
