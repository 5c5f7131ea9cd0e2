//! Difficulty classification from problem-page markup.
//!
//! Ordered cascade, first hit wins:
//! 1. an explicit "Difficulty" marker with a numeric value
//! 2. a table or sidebar cell labelled as rating, with a numeric sibling
//! 3. a known color class (display-tier approximation)
//! 4. unknown, reported as 0

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Lowest and highest ratings accepted from numeric markers.
pub const MIN_RATING: u32 = 800;
pub const MAX_RATING: u32 = 3500;

pub const COLOR_UNKNOWN: &str = "#808080";
pub const COLOR_GREEN: &str = "#3db73d";
pub const COLOR_CYAN: &str = "#00c0c0";
pub const COLOR_BLUE: &str = "#0000ff";
pub const COLOR_VIOLET: &str = "#aa00aa";
pub const COLOR_ORANGE: &str = "#ff8c00";
pub const COLOR_RED: &str = "#ff0000";
pub const COLOR_DARK_RED: &str = "#aa0000";

/// Color classes in the order they are checked, with their approximate rating.
const COLOR_CLASSES: [(&str, u32); 6] =
    [("red", 2100), ("orange", 1900), ("violet", 1700), ("blue", 1500), ("cyan", 1300), ("green", 1100)];

type Strategy = fn(&Html) -> Option<u32>;

const STRATEGIES: [Strategy; 4] = [difficulty_label, difficulty_tag, rating_cell, color_class];

static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));
static TAG_BOX: LazyLock<Selector> = LazyLock::new(|| selector("span.tag-box"));
static LABEL_CELLS: LazyLock<Selector> = LazyLock::new(|| selector(".property-title, th, td"));
static COLOR_SELECTORS: LazyLock<Vec<(Selector, u32)>> = LazyLock::new(|| {
    COLOR_CLASSES
        .iter()
        .map(|(class, rating)| (selector(&format!(".{class}")), *rating))
        .collect()
});

fn selector(s: &str) -> Selector {
    Selector::parse(s).expect("invalid selector")
}

/// Rating in `{0} ∪ [800, 3500]`; malformed or empty input yields 0.
pub fn classify_rating(raw_html: &str) -> u32 {
    let document = Html::parse_document(raw_html);
    STRATEGIES.iter().find_map(|strategy| strategy(&document)).unwrap_or(0)
}

/// Badge color for a rating. Zero and below are unknown (gray).
pub fn color_for(rating: i64) -> &'static str {
    match rating {
        i64::MIN..=0 => COLOR_UNKNOWN,
        1..=1199 => COLOR_GREEN,
        1200..=1399 => COLOR_CYAN,
        1400..=1599 => COLOR_BLUE,
        1600..=1899 => COLOR_VIOLET,
        1900..=2099 => COLOR_ORANGE,
        2100..=2399 => COLOR_RED,
        _ => COLOR_DARK_RED,
    }
}

/// Parse `1900` or `*1900`, keeping only plausible ratings.
fn parse_rating(text: &str) -> Option<u32> {
    let value: u32 = text.trim().trim_start_matches('*').trim().parse().ok()?;
    (MIN_RATING..=MAX_RATING).contains(&value).then_some(value)
}

fn next_element_sibling(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// `<span>Difficulty:</span><span>1900</span>` or `<span>Difficulty: 1900</span>`.
fn difficulty_label(document: &Html) -> Option<u32> {
    document.select(&SPAN).find_map(|span| {
        let text = text_of(span);
        let (_, rest) = text.split_once("Difficulty:")?;
        parse_rating(rest).or_else(|| {
            let sibling = next_element_sibling(span)?;
            (sibling.value().name() == "span")
                .then(|| parse_rating(&text_of(sibling)))
                .flatten()
        })
    })
}

/// Sidebar tag `<span class="tag-box" title="Difficulty">*1900</span>`.
fn difficulty_tag(document: &Html) -> Option<u32> {
    document
        .select(&TAG_BOX)
        .filter(|tag| {
            tag.value()
                .attr("title")
                .is_some_and(|t| t.eq_ignore_ascii_case("difficulty"))
        })
        .find_map(|tag| parse_rating(&text_of(tag)))
}

/// A cell whose text names a rating, followed by a numeric cell.
fn rating_cell(document: &Html) -> Option<u32> {
    document.select(&LABEL_CELLS).find_map(|cell| {
        let label = text_of(cell).to_ascii_lowercase();
        if !label.contains("rating") {
            return None;
        }
        parse_rating(&text_of(next_element_sibling(cell)?))
    })
}

fn color_class(document: &Html) -> Option<u32> {
    COLOR_SELECTORS
        .iter()
        .find(|(sel, _)| document.select(sel).next().is_some())
        .map(|(_, rating)| *rating)
}
