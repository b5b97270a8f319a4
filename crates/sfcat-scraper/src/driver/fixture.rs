//! Static-HTML page driver for tests.
//!
//! Each URL maps to a full HTML document. Clicking an element that carries a
//! `data-href` attribute navigates to that URL, which is how fixtures model a
//! variant swatch rewriting the page and its `?variant=` query.

use std::collections::HashMap;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};

use super::{Locator, PageDriver};
use crate::error::ScraperError;

#[derive(Debug, Default)]
pub(crate) struct FixtureDriver {
    pages: HashMap<String, String>,
    current: String,
    pub(crate) visits: Vec<String>,
    pub(crate) clicks: Vec<String>,
    pub(crate) scripts: Vec<String>,
}

impl FixtureDriver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A driver already positioned on `url`.
    pub(crate) fn single(url: &str, html: &str) -> Self {
        let mut driver = Self::new().with_page(url, html);
        driver.current = url.to_owned();
        driver
    }

    pub(crate) fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_owned(), html.to_owned());
        self
    }

    fn document(&self) -> Result<Html, ScraperError> {
        self.pages
            .get(&self.current)
            .map(|html| Html::parse_document(html))
            .ok_or_else(|| ScraperError::Navigation {
                url: self.current.clone(),
                reason: "no page loaded".to_owned(),
            })
    }

    fn with_matches<T>(
        &self,
        locator: Locator<'_>,
        f: impl FnOnce(Vec<ElementRef<'_>>) -> T,
    ) -> Result<T, ScraperError> {
        let doc = self.document()?;
        let matches: Vec<ElementRef<'_>> = match locator {
            Locator::Css(css) => {
                let selector = parse_selector(css)?;
                doc.select(&selector).collect()
            }
            Locator::SpecRow(label) => {
                let row = parse_selector("tr")?;
                let header = parse_selector("th")?;
                let needle = format!("{label}:");
                doc.select(&row)
                    .filter(|tr| tr.select(&header).any(|th| visible_text(th).contains(&needle)))
                    .collect()
            }
        };
        Ok(f(matches))
    }
}

fn parse_selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::InvalidSelector {
        selector: css.to_owned(),
        reason: format!("{e:?}"),
    })
}

fn visible_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl PageDriver for FixtureDriver {
    async fn goto(&mut self, url: &str) -> Result<(), ScraperError> {
        if !self.pages.contains_key(url) {
            return Err(ScraperError::Navigation {
                url: url.to_owned(),
                reason: "no fixture registered".to_owned(),
            });
        }
        url.clone_into(&mut self.current);
        self.visits.push(url.to_owned());
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, ScraperError> {
        Ok(self.current.clone())
    }

    async fn text(&mut self, locator: Locator<'_>) -> Result<Option<String>, ScraperError> {
        self.with_matches(locator, |m| m.first().map(|el| visible_text(*el)))
    }

    async fn attr(
        &mut self,
        locator: Locator<'_>,
        name: &str,
    ) -> Result<Option<String>, ScraperError> {
        self.with_matches(locator, |m| {
            m.first()
                .and_then(|el| el.value().attr(name))
                .map(str::to_owned)
        })
    }

    async fn outer_html(&mut self, locator: Locator<'_>) -> Result<Option<String>, ScraperError> {
        self.with_matches(locator, |m| m.first().map(ElementRef::html))
    }

    async fn child_text(
        &mut self,
        locator: Locator<'_>,
        child_css: &str,
    ) -> Result<Option<String>, ScraperError> {
        let child = parse_selector(child_css)?;
        self.with_matches(locator, |m| {
            m.first()
                .and_then(|el| el.select(&child).next())
                .map(visible_text)
        })
    }

    async fn attr_all(
        &mut self,
        locator: Locator<'_>,
        name: &str,
    ) -> Result<Vec<Option<String>>, ScraperError> {
        self.with_matches(locator, |m| {
            m.iter()
                .map(|el| el.value().attr(name).map(str::to_owned))
                .collect()
        })
    }

    async fn outer_html_all(&mut self, locator: Locator<'_>) -> Result<Vec<String>, ScraperError> {
        self.with_matches(locator, |m| m.iter().map(ElementRef::html).collect())
    }

    async fn wait_for(
        &mut self,
        locator: Locator<'_>,
        _timeout: Duration,
    ) -> Result<bool, ScraperError> {
        self.with_matches(locator, |m| !m.is_empty())
    }

    async fn click(&mut self, locator: Locator<'_>, timeout: Duration) -> Result<(), ScraperError> {
        let target = self.with_matches(locator, |m| {
            m.first()
                .map(|el| el.value().attr("data-href").map(str::to_owned))
        })?;
        let Some(href) = target else {
            return Err(ScraperError::Timeout {
                what: locator.to_string(),
                secs: timeout.as_secs(),
            });
        };
        self.clicks.push(locator.to_string());
        if let Some(href) = href {
            self.goto(&href).await?;
        }
        Ok(())
    }

    async fn execute(&mut self, script: &str) -> Result<serde_json::Value, ScraperError> {
        self.scripts.push(script.to_owned());
        Ok(serde_json::Value::Null)
    }
}
