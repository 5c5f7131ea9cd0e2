//! Formula detection and pass-through rendering.
//!
//! Upstream statements embed TeX source between `$$$` (inline) and
//! `$$$$$$` (display) delimiters. The adapter hands the fragments to a
//! [`FormulaRenderer`] and splices the results back in. No typesetting
//! happens here: the built-in renderer only wraps each fragment in a marker
//! element that the reflow stylesheet knows how to present.

use cfpdf_core::{RenderMode, Reporter};
use regex::Regex;
use std::sync::LazyLock;

static FORMULA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\$\$\$\$\$\$(.+?)\$\$\$\$\$\$|\$\$\$(.+?)\$\$\$").expect("invalid formula pattern")
});

/// A formula fragment as found in the statement markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatexFormula {
    pub content: String,
    pub is_inline: bool,
}

impl LatexFormula {
    pub fn inline(content: impl Into<String>) -> Self {
        Self { content: content.into(), is_inline: true }
    }

    pub fn display(content: impl Into<String>) -> Self {
        Self { content: content.into(), is_inline: false }
    }
}

/// Turns formula fragments into renderable markup.
///
/// Returning `None`, or a list whose length differs from the input, means
/// rendering is unavailable; callers keep the original source in that case.
pub trait FormulaRenderer: Send + Sync {
    fn render(&self, formulas: &[LatexFormula]) -> Option<Vec<String>>;
}

/// Wraps fragments in `math-inline` / `math-display` marker elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupFormulaRenderer;

impl FormulaRenderer for MarkupFormulaRenderer {
    fn render(&self, formulas: &[LatexFormula]) -> Option<Vec<String>> {
        Some(adapt_formulas(formulas))
    }
}

/// Renderer for a given mode. Every mode currently shares the markup renderer.
pub fn renderer_for(mode: RenderMode) -> &'static dyn FormulaRenderer {
    static MARKUP: MarkupFormulaRenderer = MarkupFormulaRenderer;
    match mode {
        RenderMode::Default | RenderMode::Fast | RenderMode::Graphics => &MARKUP,
    }
}

/// One marker fragment per formula, in order.
pub fn adapt_formulas(formulas: &[LatexFormula]) -> Vec<String> {
    formulas
        .iter()
        .map(|formula| {
            if formula.is_inline {
                format!(r#"<span class="math-inline">{}</span>"#, formula.content)
            } else {
                format!(r#"<div class="math-display">{}</div>"#, formula.content)
            }
        })
        .collect()
}

/// All delimited formulas in document order.
pub fn find_formulas(markup: &str) -> Vec<LatexFormula> {
    FORMULA
        .captures_iter(markup)
        .filter_map(|caps| match (caps.get(1), caps.get(2)) {
            (Some(display), _) => Some(LatexFormula::display(display.as_str())),
            (None, Some(inline)) => Some(LatexFormula::inline(inline.as_str())),
            _ => None,
        })
        .collect()
}

/// Replace every delimited formula in `markup` with the renderer's output.
///
/// Never fails: when the renderer is unavailable the markup is returned as-is
/// and a warning is reported.
pub fn render_formulas(markup: &str, renderer: &dyn FormulaRenderer, reporter: &dyn Reporter) -> String {
    let formulas = find_formulas(markup);
    if formulas.is_empty() {
        return markup.to_string();
    }

    let rendered = match renderer.render(&formulas) {
        Some(rendered) if rendered.len() == formulas.len() => rendered,
        Some(rendered) => {
            reporter.warn(&format!(
                "formula renderer returned {} fragments for {} formulas; leaving source untouched",
                rendered.len(),
                formulas.len()
            ));
            return markup.to_string();
        }
        None => {
            reporter.warn("formula rendering unavailable; some formulas may not be rendered correctly");
            return markup.to_string();
        }
    };

    let mut out = String::with_capacity(markup.len());
    let mut last = 0;
    for (m, fragment) in FORMULA.find_iter(markup).zip(rendered) {
        out.push_str(&markup[last..m.start()]);
        out.push_str(&fragment);
        last = m.end();
    }
    out.push_str(&markup[last..]);

    reporter.debug(&format!("rendered {} formulas", formulas.len()));
    out
}
