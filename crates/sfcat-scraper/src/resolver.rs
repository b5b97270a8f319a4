//! Per-product variant resolution.
//!
//! A product page carries zero or more variant swatches. Activating a swatch
//! rewrites part of the page (SKU, price, spec rows, `?variant=` in the URL),
//! so each record is read back from the live page right after its swatch is
//! clicked. The resolver walks `Idle -> VariantSelected(i) -> RecordEmitted(i)`
//! once per swatch and never revisits an earlier one.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use sfcat_core::columns::{SPEC_FIELDS_MULTI, SPEC_FIELDS_SINGLE};
use sfcat_core::{AppConfig, ProductPage, SpecTable, VariantControl, VariantRecord};

use crate::driver::{spec_row_value, Locator, PageDriver};
use crate::error::ScraperError;
use crate::gallery::Gallery;
use crate::pacing::Pacing;
use crate::selectors;
use crate::spec_table::SpecFragment;
use crate::urls::{handle_from_url, variant_id_from_url};

static PRICE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:sale|regular)\s+price\b").expect("valid price label regex"));

/// Removes the screen-reader "Sale price" / "Regular price" prefix from a
/// rendered price.
fn strip_price_label(text: &str) -> String {
    PRICE_LABEL.replace_all(text, "").trim().to_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Upper bound on waiting for a swatch label to become clickable.
    pub click_timeout: Duration,
    /// Sleep after each activation so the page can re-render.
    pub settle: Duration,
}

impl ResolverOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            click_timeout: Duration::from_secs(config.click_timeout_secs),
            settle: Duration::from_millis(config.variant_settle_ms),
        }
    }

    #[must_use]
    pub fn immediate() -> Self {
        Self {
            click_timeout: Duration::ZERO,
            settle: Duration::ZERO,
        }
    }
}

/// Which page template the product uses. Pages with more than one swatch
/// render per-variant price and barcode elements; the rest render a single
/// set plus three extra spec rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantBranch {
    Single,
    Multi,
}

impl VariantBranch {
    #[must_use]
    pub fn for_count(num_variations: usize) -> Self {
        if num_variations > 1 {
            VariantBranch::Multi
        } else {
            VariantBranch::Single
        }
    }

    #[must_use]
    pub fn spec_fields(self) -> &'static [&'static str] {
        match self {
            VariantBranch::Single => SPEC_FIELDS_SINGLE,
            VariantBranch::Multi => SPEC_FIELDS_MULTI,
        }
    }

    #[must_use]
    pub fn barcode_selector(self) -> &'static str {
        match self {
            VariantBranch::Single => selectors::BARCODE_SINGLE,
            VariantBranch::Multi => selectors::BARCODE_MULTI,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Idle,
    VariantSelected(usize),
    RecordEmitted(usize),
    Exhausted,
}

/// Everything read from the page after one activation. `None` means the
/// element was not on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantReads {
    pub variant_id: Option<String>,
    pub selected_color: Option<String>,
    pub sku: Option<String>,
    pub price: Option<String>,
    pub compare_at_price: Option<String>,
    pub price_per_sq_ft: Option<String>,
    pub original_price: Option<String>,
    pub barcode: Option<String>,
    pub weight: Option<String>,
    pub uom: Option<String>,
    pub description: Option<String>,
    /// Only read on multi-variant pages.
    pub carousel_image: Option<String>,
    pub fragment: SpecFragment,
    pub spec: SpecTable,
}

/// Read access to the page as it stands after the latest activation.
///
/// A view is created fresh for every record and consumed by
/// [`VariantView::read`], so no value can leak from one variant into the next.
pub struct VariantView<'v, D: PageDriver> {
    driver: &'v mut D,
    branch: VariantBranch,
}

impl<'v, D: PageDriver> VariantView<'v, D> {
    pub fn new(driver: &'v mut D, branch: VariantBranch) -> Self {
        Self { driver, branch }
    }

    async fn text(&mut self, css: &str) -> Result<Option<String>, ScraperError> {
        self.driver.text(Locator::Css(css)).await
    }

    async fn spec_value(&mut self, field: &str) -> Result<Option<String>, ScraperError> {
        self.driver
            .child_text(Locator::SpecRow(field), selectors::SPEC_VALUE_CELL)
            .await
    }

    async fn prices(
        &mut self,
        variant_id: Option<&str>,
    ) -> Result<(Option<String>, Option<String>), ScraperError> {
        let price_el = Locator::Css(selectors::BOX_PRICE);
        match self.branch {
            VariantBranch::Single => Ok((
                self.driver.attr(price_el, "data-price").await?,
                self.driver.attr(price_el, "data-compare-price").await?,
            )),
            VariantBranch::Multi => {
                let Some(variant_id) = variant_id else {
                    tracing::debug!("no variant id in url; price left empty");
                    return Ok((None, None));
                };
                let ids = self.driver.attr_all(price_el, "data-id").await?;
                let prices = self.driver.attr_all(price_el, "data-price").await?;
                let compares = self.driver.attr_all(price_el, "data-compare-price").await?;
                let found = ids
                    .into_iter()
                    .zip(prices.into_iter().zip(compares))
                    .find(|(id, _)| id.as_deref() == Some(variant_id))
                    .map(|(_, pair)| pair);
                if found.is_none() {
                    tracing::debug!(variant_id, "no price element for variant");
                }
                Ok(found.unwrap_or_default())
            }
        }
    }

    async fn spec_rows(
        &mut self,
        variant_id: Option<&str>,
    ) -> Result<(SpecFragment, SpecTable), ScraperError> {
        let mut fragment = SpecFragment::new();
        if let Some(id) = variant_id {
            let scoped = selectors::variant_spec_rows(id);
            fragment.extend_rows(self.driver.outer_html_all(Locator::Css(&scoped)).await?);
        }
        let mut spec = SpecTable::new();
        for &field in self.branch.spec_fields() {
            let Some(row) = self.driver.outer_html(Locator::SpecRow(field)).await? else {
                tracing::debug!(field, "spec field not on page");
                continue;
            };
            fragment.push_row(row);
            if let Some(value) = self.spec_value(field).await? {
                spec.insert(field, value);
            }
        }
        Ok((fragment, spec))
    }

    /// Reads every variant-dependent field.
    ///
    /// # Errors
    ///
    /// Only driver failures; absent elements come back as `None`.
    pub async fn read(mut self) -> Result<VariantReads, ScraperError> {
        let current_url = self.driver.current_url().await?;
        let variant_id = variant_id_from_url(&current_url);
        let selected_color = self.text(selectors::SELECTED_OPTION_VALUE).await?;
        let sku = self.text(selectors::SKU).await?;
        let (price, compare_at_price) = self.prices(variant_id.as_deref()).await?;
        let price_per_sq_ft = self
            .text(selectors::SALE_PRICE)
            .await?
            .map(|t| strip_price_label(&t));
        let original_price = self
            .text(selectors::COMPARE_PRICE)
            .await?
            .map(|t| strip_price_label(&t));
        let barcode = self
            .driver
            .attr(Locator::Css(self.branch.barcode_selector()), "data-value")
            .await?;
        let weight = self.spec_value("Weight").await?;
        let uom = self.spec_value("UOM").await?;
        let (fragment, spec) = self.spec_rows(variant_id.as_deref()).await?;
        let description = self.text(selectors::SEO_DESCRIPTION).await?;
        let carousel_image = match self.branch {
            VariantBranch::Multi => {
                self.driver
                    .attr(Locator::Css(selectors::SELECTED_CAROUSEL_IMG), "src")
                    .await?
            }
            VariantBranch::Single => None,
        };
        Ok(VariantReads {
            variant_id,
            selected_color,
            sku,
            price,
            compare_at_price,
            price_per_sq_ft,
            original_price,
            barcode,
            weight,
            uom,
            description,
            carousel_image,
            fragment,
            spec,
        })
    }
}

/// Builds the `idx`-th record from page-level fields and one variant's reads.
#[must_use]
pub fn compose_record(
    page: &ProductPage,
    gallery: &Gallery,
    branch: VariantBranch,
    idx: usize,
    control: Option<&VariantControl>,
    reads: VariantReads,
) -> VariantRecord {
    let (image_src, image_position) = gallery.body_slot(idx);
    let variant_image = match branch {
        VariantBranch::Multi => reads
            .carousel_image
            .filter(|src| !src.is_empty())
            .or_else(|| gallery.variant_thumb(idx).map(str::to_owned))
            .unwrap_or_default(),
        VariantBranch::Single => gallery.single_variant_image(),
    };
    VariantRecord {
        handle: page.handle.clone(),
        title: page.title.clone(),
        variation: control.map(|c| c.value.clone()).unwrap_or_default(),
        body_html: reads.fragment.to_html(),
        vendor: page.vendor.clone(),
        product_type: page.breadcrumb_type.clone(),
        tags: page.tags(),
        option1_value: reads.selected_color.unwrap_or_default(),
        option2_value: page.size_value.clone(),
        sku: reads.sku.unwrap_or_default(),
        price: reads.price.unwrap_or_default(),
        compare_at_price: reads.compare_at_price.unwrap_or_default(),
        barcode: reads.barcode.unwrap_or_default(),
        weight: reads.weight.unwrap_or_default(),
        uom: reads.uom.unwrap_or_default(),
        product_description: page.seo_description.clone(),
        variant_description: reads.description.unwrap_or_default(),
        coverage_area: reads.fragment.coverage_area(),
        pcs_per_box: reads.fragment.pcs_per_box(),
        price_per_sq_ft: reads.price_per_sq_ft.unwrap_or_default(),
        original_price: reads.original_price.unwrap_or_default(),
        surface_type: page.surface_type.clone(),
        image_src,
        variant_image,
        image_position,
        spec: reads.spec,
    }
}

fn required(
    value: Option<String>,
    field: &'static str,
    url: &str,
) -> Result<String, ScraperError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ScraperError::MissingField {
            field,
            url: url.to_owned(),
        })
}

/// Lazily yields one record per variant of the product on the current page.
pub struct VariantResolver<'d, D: PageDriver> {
    driver: &'d mut D,
    page: ProductPage,
    controls: Vec<VariantControl>,
    gallery: Gallery,
    branch: VariantBranch,
    options: ResolverOptions,
    state: ResolverState,
}

impl<'d, D: PageDriver> VariantResolver<'d, D> {
    /// Reads the page-level fields of the already loaded product page.
    ///
    /// # Errors
    ///
    /// [`ScraperError::MissingField`] when the title, handle, vendor, or size
    /// swatch is absent; driver failures otherwise.
    pub async fn open(
        driver: &'d mut D,
        product_url: &str,
        options: ResolverOptions,
    ) -> Result<Self, ScraperError> {
        let title = required(
            driver.text(Locator::Css(selectors::TITLE)).await?,
            "title",
            product_url,
        )?;
        let handle = required(handle_from_url(product_url), "handle", product_url)?;
        let vendor = required(
            driver.text(Locator::Css(selectors::VENDOR)).await?,
            "vendor",
            product_url,
        )?;
        let size_value = required(
            driver.text(Locator::Css(selectors::SIZE_SWATCH_TEXT)).await?,
            "size",
            product_url,
        )?;

        let breadcrumb_type = driver
            .text(Locator::Css(selectors::BREADCRUMB_TYPE))
            .await?
            .unwrap_or_default();
        let seo_description = driver
            .text(Locator::Css(selectors::SEO_DESCRIPTION))
            .await?
            .unwrap_or_default();
        let application = spec_row_value(driver, "Application").await?.unwrap_or_default();
        let usage = spec_row_value(driver, "Usage").await?.unwrap_or_default();
        let surface_type = spec_row_value(driver, "Surface Type")
            .await?
            .unwrap_or_default();

        let images: Vec<String> = driver
            .attr_all(Locator::Css(selectors::GALLERY_THUMBNAIL_IMG), "src")
            .await?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();

        let radio = Locator::Css(selectors::VARIANT_RADIO);
        let ids = driver.attr_all(radio, "id").await?;
        let values = driver.attr_all(radio, "value").await?;
        // Thumbnails and price rows line up with the swatches in reverse.
        let controls: Vec<VariantControl> = ids
            .into_iter()
            .zip(values)
            .map(|(id, value)| VariantControl {
                id: id.unwrap_or_default(),
                value: value.unwrap_or_default(),
            })
            .rev()
            .collect();

        let gallery = Gallery::partition(images.clone(), controls.len());
        let branch = VariantBranch::for_count(controls.len());
        tracing::debug!(
            url = product_url,
            variants = controls.len(),
            images = images.len(),
            body_images = gallery.body().len(),
            ?branch,
            "resolved product layout"
        );

        let page = ProductPage {
            url: product_url.to_owned(),
            handle,
            title,
            vendor,
            breadcrumb_type,
            seo_description,
            application,
            usage,
            surface_type,
            size_value,
            images,
        };

        Ok(Self {
            driver,
            page,
            controls,
            gallery,
            branch,
            options,
            state: ResolverState::Idle,
        })
    }

    #[must_use]
    pub fn page(&self) -> &ProductPage {
        &self.page
    }

    /// Swatches in activation order (reverse DOM order).
    #[must_use]
    pub fn controls(&self) -> &[VariantControl] {
        &self.controls
    }

    #[must_use]
    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    #[must_use]
    pub fn branch(&self) -> VariantBranch {
        self.branch
    }

    #[must_use]
    pub fn state(&self) -> ResolverState {
        self.state
    }

    /// Number of records this product yields: one per swatch, or one for a
    /// product without swatches.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.controls.len().max(1)
    }

    /// Activates the next swatch and reads its record. Returns `Ok(None)` once
    /// every variant has been emitted or after an error.
    ///
    /// # Errors
    ///
    /// Driver failures and swatches that never become clickable.
    pub async fn next_record(&mut self) -> Result<Option<VariantRecord>, ScraperError> {
        let idx = match self.state {
            ResolverState::Idle => 0,
            ResolverState::RecordEmitted(i) => i + 1,
            ResolverState::VariantSelected(_) | ResolverState::Exhausted => return Ok(None),
        };
        if idx >= self.record_count() {
            self.state = ResolverState::Exhausted;
            return Ok(None);
        }
        match self.resolve(idx).await {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                self.state = ResolverState::Exhausted;
                Err(e)
            }
        }
    }

    async fn resolve(&mut self, idx: usize) -> Result<VariantRecord, ScraperError> {
        let control = self.controls.get(idx).cloned();
        if let Some(control) = &control {
            self.activate(control).await?;
        }
        self.state = ResolverState::VariantSelected(idx);

        let reads = VariantView::new(&mut *self.driver, self.branch)
            .read()
            .await?;
        let record = compose_record(
            &self.page,
            &self.gallery,
            self.branch,
            idx,
            control.as_ref(),
            reads,
        );
        self.state = ResolverState::RecordEmitted(idx);
        Ok(record)
    }

    async fn activate(&mut self, control: &VariantControl) -> Result<(), ScraperError> {
        let label = selectors::variant_label(&control.id);
        self.driver
            .click(Locator::Css(&label), self.options.click_timeout)
            .await?;
        if !self.options.settle.is_zero() {
            tokio::time::sleep(self.options.settle).await;
        }
        tracing::debug!(variant = %control.value, id = %control.id, "activated variant");
        Ok(())
    }

    /// Drains the resolver. All-or-nothing: an error discards the records
    /// already read for this product.
    ///
    /// # Errors
    ///
    /// The first error from [`VariantResolver::next_record`].
    pub async fn collect_all(mut self) -> Result<Vec<VariantRecord>, ScraperError> {
        let mut records = Vec::with_capacity(self.record_count());
        while let Some(record) = self.next_record().await? {
            records.push(record);
        }
        Ok(records)
    }
}

/// Loads `product_url` and resolves every variant on it.
///
/// # Errors
///
/// Any failure aborts the whole product; no partial records are returned.
pub async fn scrape_product<D: PageDriver>(
    driver: &mut D,
    product_url: &str,
    options: ResolverOptions,
    pacing: &Pacing,
) -> Result<Vec<VariantRecord>, ScraperError> {
    driver.goto(product_url).await?;
    pacing.before_product_read(driver).await?;
    let records = VariantResolver::open(driver, product_url, options)
        .await?
        .collect_all()
        .await?;
    tracing::info!(url = product_url, records = records.len(), "scraped product");
    Ok(records)
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
