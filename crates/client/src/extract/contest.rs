//! Problem-label harvesting from contest listing pages.

use cfpdf_core::model::is_valid_label;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static PROBLEM_ROWS: LazyLock<Selector> = LazyLock::new(|| selector("table.problems tr"));
static FIRST_CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));
static LISTING_LINKS: LazyLock<Selector> = LazyLock::new(|| selector(".problems a[href]"));
static ANY_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

fn selector(s: &str) -> Selector {
    Selector::parse(s).expect("invalid selector")
}

/// Labels of the problems listed on a contest page, upper-cased, unique and sorted.
///
/// Tries the problems table first, then links inside the problems block,
/// then any problem link on the page.
pub fn parse_contest_labels(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let strategies: [fn(&Html) -> Vec<String>; 3] = [table_labels, listing_link_labels, any_link_labels];
    for strategy in strategies {
        let labels: BTreeSet<String> = strategy(&document)
            .into_iter()
            .map(|l| l.to_ascii_uppercase())
            .filter(|l| is_valid_label(l))
            .collect();
        if !labels.is_empty() {
            return labels.into_iter().collect();
        }
    }

    Vec::new()
}

fn table_labels(document: &Html) -> Vec<String> {
    document
        .select(&PROBLEM_ROWS)
        .skip(1)
        .filter_map(|row| row.select(&FIRST_CELL).next())
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}

fn listing_link_labels(document: &Html) -> Vec<String> {
    link_labels(document, &LISTING_LINKS)
}

fn any_link_labels(document: &Html) -> Vec<String> {
    link_labels(document, &ANY_LINK)
}

fn link_labels(document: &Html, links: &Selector) -> Vec<String> {
    document
        .select(links)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains("/problem/"))
        .filter_map(label_from_href)
        .collect()
}

/// Last path segment of a problem link, without query or fragment.
fn label_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next()?;
    let segment = path.trim_end_matches('/').rsplit('/').next()?.trim();
    (!segment.is_empty()).then(|| segment.to_string())
}
