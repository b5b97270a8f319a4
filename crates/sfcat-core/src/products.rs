use serde::{Deserialize, Serialize};

/// Page-level fields read once per product visit.
///
/// Every optional lookup has already been defaulted to an empty string by the
/// time this struct exists; only the mandatory fields can abort a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    pub url: String,
    pub handle: String,
    pub title: String,
    pub vendor: String,
    /// Category label from the breadcrumb trail, exported as `Type`.
    pub breadcrumb_type: String,
    /// First paragraph of the SEO description block.
    pub seo_description: String,
    pub application: String,
    pub usage: String,
    pub surface_type: String,
    /// Text of the size swatch; exported as `Option2 Value`.
    pub size_value: String,
    /// Gallery thumbnail URLs in DOM order.
    pub images: Vec<String>,
}

impl ProductPage {
    /// Application and usage labels joined into the comma-separated tag
    /// string the importer expects. The storefront separates multiple values
    /// with `" | "`.
    #[must_use]
    pub fn tags(&self) -> String {
        [self.application.as_str(), self.usage.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
            .replace(" | ", ", ")
    }
}

/// A variant selector radio on the product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantControl {
    /// DOM `id` of the radio input; its `<label for=...>` is what gets clicked.
    pub id: String,
    /// Display value such as a color name.
    pub value: String,
}

/// Specification rows keyed by their header label, in lookup order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecTable {
    entries: Vec<(String, String)>,
}

impl SpecTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `field`.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == field) {
            slot.1 = value;
        } else {
            self.entries.push((field, value));
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One output row: a single purchasable variant of a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub handle: String,
    pub title: String,
    /// Radio `value` of the activated control; empty for variant-less products.
    pub variation: String,
    /// Assembled `<table>` fragment of the rows that describe this variant.
    pub body_html: String,
    pub vendor: String,
    pub product_type: String,
    pub tags: String,
    /// Selected color after activation, exported as `Option1 Value`.
    pub option1_value: String,
    /// Size swatch text, exported as `Option2 Value`.
    pub option2_value: String,
    pub sku: String,
    pub price: String,
    pub compare_at_price: String,
    pub barcode: String,
    pub weight: String,
    pub uom: String,
    pub product_description: String,
    pub variant_description: String,
    pub coverage_area: String,
    pub pcs_per_box: String,
    pub price_per_sq_ft: String,
    pub original_price: String,
    pub surface_type: String,
    pub image_src: String,
    pub variant_image: String,
    /// 1-based index into the body image set; `None` when the variant has no
    /// body image of its own.
    pub image_position: Option<usize>,
    pub spec: SpecTable,
}
