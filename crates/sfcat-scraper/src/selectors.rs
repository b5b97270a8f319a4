//! CSS selectors for the storefront's product and listing templates.

// Listing pages
pub const PRODUCT_LINK: &str = "a.product-item__image-wrapper";
pub const POPUP_CLOSE: &str = "button.exit-popup__close";

// Product page, read once
pub const TITLE: &str = "h1.product-meta__title.heading.h1";
pub const VENDOR: &str = "a.product-meta__vendor";
pub const BREADCRUMB_TYPE: &str = "li.breadcrumb__item a[href*='types']";
pub const SEO_DESCRIPTION: &str = "div.rte.text--pull > p";
pub const SIZE_SWATCH_TEXT: &str = "span.block-swatch__item-text";
pub const GALLERY_THUMBNAIL_IMG: &str = ".product-gallery__thumbnail img";
pub const VARIANT_RADIO: &str = ".variant-swatch__radio";

// Product page, re-read after each variant activation
pub const SELECTED_OPTION_VALUE: &str = "span.product-form__selected-value";
pub const SKU: &str = "span.product-meta__sku-number";
pub const BOX_PRICE: &str = "span.box-price-pcsPerCarton";
pub const SALE_PRICE: &str = "span.price.price--highlight";
pub const COMPARE_PRICE: &str = "span.price.price--compare";
/// Barcode row holding every variant's value; hidden until a variant is picked.
pub const BARCODE_MULTI: &str = "tr.table-row-spec.barcode-container.d-none";
pub const BARCODE_SINGLE: &str = "tr.table-row-spec.barcode-container";
pub const SELECTED_CAROUSEL_IMG: &str = ".product-gallery__carousel-item.is-selected img";
pub const SPEC_VALUE_CELL: &str = "td.spec-values";

// Inside the assembled spec fragment
pub const COVERAGE_AREA_ROW: &str = "tr.coverage-area-container";
pub const PCS_PER_BOX_ROW: &str = "tr.pcsPerBox-container";

/// Label that activates the radio with DOM id `id`.
#[must_use]
pub fn variant_label(id: &str) -> String {
    format!("label[for='{id}']")
}

/// Spec rows scoped to a single variant id.
#[must_use]
pub fn variant_spec_rows(variant_id: &str) -> String {
    format!("tr[data-id='{variant_id}']")
}
