//! The per-variant product spec fragment exported as `Body (HTML)`.
//!
//! The fragment is a bare `<table>` holding the variant-scoped rows followed by
//! the rows of every recognized spec field that exists on the page. Metafield
//! values that the storefront only exposes as row attributes are read back out
//! of the assembled fragment.

use scraper::{Html, Selector};

use crate::selectors;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecFragment {
    rows: Vec<String>,
}

impl SpecFragment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_row(&mut self, outer_html: impl Into<String>) {
        self.rows.push(outer_html.into());
    }

    pub fn extend_rows(&mut self, rows: impl IntoIterator<Item = String>) {
        self.rows.extend(rows);
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table>");
        for row in &self.rows {
            html.push_str(row);
        }
        html.push_str("</table>");
        html
    }

    /// `data-value` of the coverage-area row, trimmed.
    #[must_use]
    pub fn coverage_area(&self) -> String {
        fragment_attr(&self.to_html(), selectors::COVERAGE_AREA_ROW, "data-value")
            .unwrap_or_default()
    }

    /// `data-value` of the pieces-per-box row, trimmed.
    #[must_use]
    pub fn pcs_per_box(&self) -> String {
        fragment_attr(&self.to_html(), selectors::PCS_PER_BOX_ROW, "data-value")
            .unwrap_or_default()
    }
}

/// Trimmed `attr` of the first element in `html` matching `css`.
///
/// Returns `None` when the selector is invalid, nothing matches, or the
/// attribute is missing.
#[must_use]
pub fn fragment_attr(html: &str, css: &str, attr: &str) -> Option<String> {
    let selector = match Selector::parse(css) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(css, error = ?e, "invalid fragment selector");
            return None;
        }
    };
    let doc = Html::parse_fragment(html);
    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.trim().to_owned())
}
