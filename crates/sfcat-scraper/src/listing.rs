//! Collection listing traversal via the storefront's `?page=<n>` pagination.
//!
//! Pages are visited in order and the walk stops at the first page that shows
//! no product tiles, so an oversized page range costs one extra page load.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use sfcat_core::CollectionConfig;

use crate::driver::{Locator, PageDriver};
use crate::error::ScraperError;
use crate::pacing::Pacing;
use crate::selectors;
use crate::urls::absolutize;

/// Absolute product URLs found on one listing page, in DOM order.
async fn scan_listing_page<D: PageDriver>(
    driver: &mut D,
    page_url: &str,
    pacing: &Pacing,
) -> Result<Vec<String>, ScraperError> {
    driver.goto(page_url).await?;
    pacing.pause().await;
    pacing.dismiss_popup(driver).await?;
    pacing.smooth_scroll(driver).await?;
    let hrefs = driver
        .attr_all(Locator::Css(selectors::PRODUCT_LINK), "href")
        .await?;
    Ok(hrefs
        .into_iter()
        .flatten()
        .filter_map(|href| absolutize(page_url, &href))
        .collect())
}

/// Collects product links from every listing page of `collection` in
/// `pages`, de-duplicated and in first-seen order.
///
/// A page that fails to load ends the collection early with whatever was
/// gathered so far.
///
/// # Errors
///
/// Only a lost browser session is returned.
pub async fn collect_product_links<D: PageDriver>(
    driver: &mut D,
    collection: &CollectionConfig,
    pages: RangeInclusive<u32>,
    pacing: &Pacing,
) -> Result<Vec<String>, ScraperError> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    for page in pages {
        let page_url = collection.page_url(page);
        tracing::info!(collection = %collection.name, page, "scanning listing page");
        match scan_listing_page(driver, &page_url, pacing).await {
            Ok(hrefs) if hrefs.is_empty() => {
                tracing::info!(collection = %collection.name, page, "no products on page; collection done");
                break;
            }
            Ok(hrefs) => {
                let found = hrefs.len();
                links.extend(hrefs.into_iter().filter(|href| seen.insert(href.clone())));
                tracing::debug!(page, found, total = links.len(), "listing page scanned");
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    collection = %collection.name,
                    page,
                    error = %e,
                    "listing page failed; ending collection"
                );
                break;
            }
        }
    }

    tracing::info!(
        collection = %collection.name,
        products = links.len(),
        "collected product links"
    );
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fixture::FixtureDriver;

    const COLLECTION_URL: &str = "https://floorscenter.com/collections/ottimo-tiles";

    fn make_collection() -> CollectionConfig {
        CollectionConfig {
            name: "Ottimo Tiles".to_owned(),
            url: COLLECTION_URL.to_owned(),
            notes: None,
        }
    }

    fn page_url(page: u32) -> String {
        format!("{COLLECTION_URL}?page={page}")
    }

    fn listing(handles: &[&str]) -> String {
        handles
            .iter()
            .map(|h| {
                format!(
                    r#"<div class="product-item"><a class="product-item__image-wrapper" href="/products/{h}"><img></a></div>"#
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn stops_at_first_empty_page() {
        let mut driver = FixtureDriver::new()
            .with_page(&page_url(1), &listing(&["onyx-blue", "calacatta-gold"]))
            .with_page(&page_url(2), &listing(&["statuario"]))
            .with_page(&page_url(3), "<p>No products</p>")
            .with_page(&page_url(4), &listing(&["never-reached"]));

        let links = collect_product_links(&mut driver, &make_collection(), 1..=4, &Pacing::disabled())
            .await
            .unwrap();

        assert_eq!(
            links,
            vec![
                "https://floorscenter.com/products/onyx-blue".to_owned(),
                "https://floorscenter.com/products/calacatta-gold".to_owned(),
                "https://floorscenter.com/products/statuario".to_owned(),
            ]
        );
        assert_eq!(driver.visits, vec![page_url(1), page_url(2), page_url(3)]);
    }

    #[tokio::test]
    async fn respects_start_page() {
        let mut driver = FixtureDriver::new()
            .with_page(&page_url(21), &listing(&["page-21"]))
            .with_page(&page_url(22), &listing(&["page-22"]));

        let links = collect_product_links(&mut driver, &make_collection(), 21..=22, &Pacing::disabled())
            .await
            .unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(driver.visits.first(), Some(&page_url(21)));
    }

    #[tokio::test]
    async fn duplicate_links_are_kept_once() {
        let mut driver = FixtureDriver::new()
            .with_page(&page_url(1), &listing(&["onyx-blue", "onyx-blue"]))
            .with_page(&page_url(2), &listing(&["onyx-blue", "statuario"]));

        let links = collect_product_links(&mut driver, &make_collection(), 1..=2, &Pacing::disabled())
            .await
            .unwrap();

        assert_eq!(
            links,
            vec![
                "https://floorscenter.com/products/onyx-blue".to_owned(),
                "https://floorscenter.com/products/statuario".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn failed_page_ends_collection_with_partial_links() {
        // page 2 is not registered, so navigation fails
        let mut driver =
            FixtureDriver::new().with_page(&page_url(1), &listing(&["onyx-blue"]));

        let links = collect_product_links(&mut driver, &make_collection(), 1..=5, &Pacing::disabled())
            .await
            .unwrap();

        assert_eq!(links, vec!["https://floorscenter.com/products/onyx-blue".to_owned()]);
    }

    #[tokio::test]
    async fn closes_popup_on_each_page() {
        let popup = r#"<button class="exit-popup__close">x</button>"#;
        let mut driver = FixtureDriver::new()
            .with_page(&page_url(1), &format!("{popup}{}", listing(&["a"])))
            .with_page(&page_url(2), popup);

        collect_product_links(&mut driver, &make_collection(), 1..=2, &Pacing::disabled())
            .await
            .unwrap();

        assert_eq!(driver.clicks.len(), 2);
    }
}
