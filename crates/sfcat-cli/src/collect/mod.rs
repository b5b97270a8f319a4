//! `collect` and `product` command handlers.
//!
//! Both open one browser session, scrape sequentially, and write every record
//! gathered to a single output file at the end. Per-product failures are
//! logged and skipped; a lost browser session stops the run, but whatever was
//! collected before it is still written out.

mod runner;

use std::path::{Path, PathBuf};

use anyhow::Context;
use sfcat_core::catalog::validate_catalog;
use sfcat_core::{load_catalog, AppConfig, CatalogFile, CollectionConfig};
use sfcat_scraper::{BrowserSession, Pacing, ResolverOptions};

pub(crate) use runner::{scrape_collections, scrape_products, RunSummary};

/// Page range used when neither the catalog nor the command line sets one.
const DEFAULT_PAGES: (u32, u32) = (1, 100);

/// Command-line values that take precedence over the catalog file.
#[derive(Debug, Default)]
pub(crate) struct CollectOverrides {
    pub collections: Vec<String>,
    pub start_page: Option<u32>,
    pub end_page: Option<u32>,
    pub output: Option<PathBuf>,
}

#[derive(Debug)]
pub(crate) struct CollectPlan {
    pub catalog: CatalogFile,
    pub output: PathBuf,
}

/// Resolves what a `collect` run will visit. The catalog file is only
/// required when no `--collection` is given on the command line.
///
/// # Errors
///
/// Returns an error if a required catalog file cannot be loaded or the
/// merged plan fails validation.
pub(crate) fn plan_collect(
    config: &AppConfig,
    overrides: CollectOverrides,
) -> anyhow::Result<CollectPlan> {
    let catalog = if overrides.collections.is_empty() || config.catalog_path.exists() {
        Some(load_catalog(&config.catalog_path).with_context(|| {
            format!("loading catalog {}", config.catalog_path.display())
        })?)
    } else {
        None
    };
    build_plan(catalog, overrides, &config.output_path)
}

/// Merges the optional catalog with command-line overrides.
///
/// # Errors
///
/// Returns an error if no collection is left to scrape, the page range is
/// invalid, or the output extension is neither `.xlsx` nor `.csv`.
pub(crate) fn build_plan(
    catalog: Option<CatalogFile>,
    overrides: CollectOverrides,
    default_output: &Path,
) -> anyhow::Result<CollectPlan> {
    let (catalog_collections, catalog_start, catalog_end) = match catalog {
        Some(c) => (c.collections, Some(c.start_page), Some(c.end_page)),
        None => (Vec::new(), None, None),
    };

    let collections = if overrides.collections.is_empty() {
        catalog_collections
    } else {
        overrides
            .collections
            .into_iter()
            .map(|url| CollectionConfig {
                name: url.clone(),
                url,
                notes: None,
            })
            .collect()
    };

    let catalog = CatalogFile {
        collections,
        start_page: overrides
            .start_page
            .or(catalog_start)
            .unwrap_or(DEFAULT_PAGES.0),
        end_page: overrides.end_page.or(catalog_end).unwrap_or(DEFAULT_PAGES.1),
    };
    validate_catalog(&catalog)?;

    let output = overrides
        .output
        .unwrap_or_else(|| default_output.to_path_buf());
    check_output(&output)?;

    Ok(CollectPlan { catalog, output })
}

/// Rejects an output path no sink can write, before any page is visited.
fn check_output(output: &Path) -> anyhow::Result<()> {
    sfcat_export::sink_for_path(output)?;
    Ok(())
}

pub(crate) fn print_plan(plan: &CollectPlan) {
    println!(
        "dry-run: would scrape {} collection(s), pages {}..={}, into {}",
        plan.catalog.collections.len(),
        plan.catalog.start_page,
        plan.catalog.end_page,
        plan.output.display()
    );
    for c in &plan.catalog.collections {
        println!("  {} ({})", c.name, c.url);
    }
}

/// Runs a full collection walk and writes the output file.
///
/// # Errors
///
/// Returns an error if the browser session cannot be started, the output
/// cannot be written, or the session was lost mid-run.
pub(crate) async fn run_collect(config: &AppConfig, plan: &CollectPlan) -> anyhow::Result<()> {
    let pacing = Pacing::from_config(config);
    let options = ResolverOptions::from_config(config);
    let mut session = BrowserSession::connect(config)
        .await
        .context("starting browser session")?;

    let summary = scrape_collections(&mut session, &plan.catalog, &pacing, options).await;
    close_session(session, &summary).await;
    finish_run(summary, &plan.output)
}

/// Scrapes the given product URLs and writes the output file.
///
/// # Errors
///
/// Same as [`run_collect`].
pub(crate) async fn run_products(
    config: &AppConfig,
    urls: &[String],
    output: &Path,
) -> anyhow::Result<()> {
    check_output(output)?;
    let pacing = Pacing::from_config(config);
    let options = ResolverOptions::from_config(config);
    let mut session = BrowserSession::connect(config)
        .await
        .context("starting browser session")?;

    let mut summary = RunSummary::default();
    if let Err(e) = scrape_products(&mut session, urls, &pacing, options, &mut summary).await {
        summary.fatal = Some(e);
    }
    close_session(session, &summary).await;
    finish_run(summary, output)
}

async fn close_session(session: BrowserSession, summary: &RunSummary) {
    if summary.fatal.is_some() {
        return;
    }
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "failed to close browser session");
    }
}

/// Writes every collected record, then reports the run outcome.
///
/// # Errors
///
/// Returns an error if the output cannot be written, the session was lost,
/// or every attempted product failed.
pub(crate) fn finish_run(summary: RunSummary, output: &Path) -> anyhow::Result<()> {
    let sink = sfcat_export::sink_for_path(output)?;
    let written = sfcat_export::export_records(sink.as_ref(), &summary.records)
        .with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(
        products_ok = summary.products_ok,
        products_failed = summary.products_failed,
        records = written,
        output = %output.display(),
        "run finished"
    );
    println!("Scraped data saved to {} ({written} rows)", output.display());

    if let Some(e) = summary.fatal {
        return Err(anyhow::Error::new(e).context("browser session lost; run aborted"));
    }
    if summary.products_ok == 0 && summary.products_failed > 0 {
        anyhow::bail!("all {} products failed", summary.products_failed);
    }
    Ok(())
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
