//! The page-driver seam between extraction logic and the browser.
//!
//! Lookups that find nothing return `Ok(None)` (or an empty `Vec`); `Err` is
//! reserved for driver failures. Callers decide per field whether absence is
//! tolerable or aborts the product.

#[cfg(test)]
pub(crate) mod fixture;

use std::time::Duration;

use crate::error::ScraperError;

/// How an element is located on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator<'a> {
    Css(&'a str),
    /// The spec-table `<tr>` whose `<th>` text contains `"<label>:"`.
    SpecRow(&'a str),
}

impl Locator<'_> {
    /// XPath equivalent of [`Locator::SpecRow`]; `None` for CSS locators.
    #[must_use]
    pub fn spec_row_xpath(&self) -> Option<String> {
        match self {
            Locator::Css(_) => None,
            Locator::SpecRow(label) => Some(format!("//tr[th[contains(text(), '{label}:')]]")),
        }
    }
}

impl std::fmt::Display for Locator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(css) => write!(f, "{css}"),
            Locator::SpecRow(label) => write!(f, "spec row '{label}'"),
        }
    }
}

/// Browser capabilities the extraction code relies on.
///
/// Implementations operate on a single page at a time; every read reflects the
/// page state at the moment of the call.
// Callers are generic over the driver and never need `Send` futures.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    async fn goto(&mut self, url: &str) -> Result<(), ScraperError>;

    async fn current_url(&mut self) -> Result<String, ScraperError>;

    /// Trimmed visible text of the first match.
    async fn text(&mut self, locator: Locator<'_>) -> Result<Option<String>, ScraperError>;

    /// Attribute of the first match; `None` if the element or the attribute
    /// is missing.
    async fn attr(
        &mut self,
        locator: Locator<'_>,
        name: &str,
    ) -> Result<Option<String>, ScraperError>;

    /// Outer HTML of the first match.
    async fn outer_html(&mut self, locator: Locator<'_>) -> Result<Option<String>, ScraperError>;

    /// Trimmed text of the first `child_css` descendant of the first match.
    async fn child_text(
        &mut self,
        locator: Locator<'_>,
        child_css: &str,
    ) -> Result<Option<String>, ScraperError>;

    /// `name` attribute of every match, in DOM order.
    async fn attr_all(
        &mut self,
        locator: Locator<'_>,
        name: &str,
    ) -> Result<Vec<Option<String>>, ScraperError>;

    /// Outer HTML of every match, in DOM order.
    async fn outer_html_all(&mut self, locator: Locator<'_>) -> Result<Vec<String>, ScraperError>;

    /// Waits up to `timeout` for a match to exist. Returns whether it appeared.
    async fn wait_for(
        &mut self,
        locator: Locator<'_>,
        timeout: Duration,
    ) -> Result<bool, ScraperError>;

    /// Waits up to `timeout` for the first match to become clickable, brings it
    /// into view, and clicks it.
    ///
    /// # Errors
    ///
    /// [`ScraperError::Timeout`] if the element never becomes clickable.
    async fn click(&mut self, locator: Locator<'_>, timeout: Duration) -> Result<(), ScraperError>;

    /// Runs a script in the page and returns its JSON result.
    async fn execute(&mut self, script: &str) -> Result<serde_json::Value, ScraperError>;
}

/// Reads the `value` part of a `"Label: value"` spec row's text.
///
/// # Errors
///
/// Propagates driver failures; a missing row yields `Ok(None)`.
pub async fn spec_row_value<D: PageDriver>(
    driver: &mut D,
    label: &str,
) -> Result<Option<String>, ScraperError> {
    let text = driver.text(Locator::SpecRow(label)).await?;
    Ok(text.and_then(|t| t.split_once(':').map(|(_, v)| v.trim().to_owned())))
}
