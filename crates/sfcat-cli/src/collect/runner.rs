//! Sequential scrape loop shared by `collect` and `product`.

use sfcat_core::{CatalogFile, VariantRecord};
use sfcat_scraper::{
    collect_product_links, scrape_product, PageDriver, Pacing, ResolverOptions, ScraperError,
};

/// What a run gathered. `fatal` is set when the browser session was lost;
/// `records` still holds everything collected before that point.
#[derive(Debug, Default)]
pub(crate) struct RunSummary {
    pub records: Vec<VariantRecord>,
    pub products_ok: usize,
    pub products_failed: usize,
    pub fatal: Option<ScraperError>,
}

/// Scrapes `urls` one at a time, appending records to `summary`.
///
/// # Errors
///
/// Returns the first fatal error; any other product failure is logged and
/// counted.
pub(crate) async fn scrape_products<D: PageDriver>(
    driver: &mut D,
    urls: &[String],
    pacing: &Pacing,
    options: ResolverOptions,
    summary: &mut RunSummary,
) -> Result<(), ScraperError> {
    let total = urls.len();
    for (idx, url) in urls.iter().enumerate() {
        match scrape_product(driver, url, options, pacing).await {
            Ok(records) => {
                summary.products_ok += 1;
                tracing::info!(
                    product = idx + 1,
                    total,
                    variants = records.len(),
                    url = %url,
                    "product scraped"
                );
                summary.records.extend(records);
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(url = %url, error = %e, "browser session lost");
                return Err(e);
            }
            Err(e) => {
                summary.products_failed += 1;
                tracing::warn!(url = %url, error = %e, "skipping product");
            }
        }
    }
    Ok(())
}

/// Walks every collection in `catalog`: listing pages first, then each
/// product found. Never returns early with an error; a fatal error ends the
/// walk and is stored in the summary.
pub(crate) async fn scrape_collections<D: PageDriver>(
    driver: &mut D,
    catalog: &CatalogFile,
    pacing: &Pacing,
    options: ResolverOptions,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let pages = catalog.start_page..=catalog.end_page;

    for collection in &catalog.collections {
        let links =
            match collect_product_links(driver, collection, pages.clone(), pacing).await {
                Ok(links) => links,
                Err(e) => {
                    tracing::error!(collection = %collection.name, error = %e, "browser session lost");
                    summary.fatal = Some(e);
                    return summary;
                }
            };
        tracing::info!(
            collection = %collection.name,
            products = links.len(),
            "scraping collection products"
        );
        if let Err(e) = scrape_products(driver, &links, pacing, options, &mut summary).await {
            summary.fatal = Some(e);
            return summary;
        }
    }

    if summary.products_failed > 0 {
        tracing::warn!(
            failed = summary.products_failed,
            succeeded = summary.products_ok,
            "some products failed"
        );
    }
    summary
}
