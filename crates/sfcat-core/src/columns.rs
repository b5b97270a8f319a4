//! Output column set and the fixed storefront-platform bookkeeping values.
//!
//! Column names are consumed verbatim by the commerce platform's bulk
//! importer, including the metafield namespaces embedded in some headers, so
//! every literal here is part of the output format.

use crate::products::VariantRecord;

/// Platform bookkeeping values written identically on every row.
#[derive(Debug, Clone, Copy)]
pub struct Bookkeeping {
    pub option1_name: &'static str,
    pub option2_name: &'static str,
    pub variant_grams: &'static str,
    pub inventory_tracker: &'static str,
    pub inventory_qty: &'static str,
    pub inventory_policy: &'static str,
    pub fulfillment_service: &'static str,
    pub requires_shipping: &'static str,
    pub taxable: &'static str,
    pub weight_unit: &'static str,
    pub gift_card: &'static str,
    pub google_condition: &'static str,
    pub status: &'static str,
}

pub const BOOKKEEPING: Bookkeeping = Bookkeeping {
    option1_name: "Color",
    option2_name: "Size",
    variant_grams: " ",
    inventory_tracker: "shopify",
    inventory_qty: "50000",
    inventory_policy: "deny",
    fulfillment_service: "manual",
    requires_shipping: "TRUE",
    taxable: "TRUE",
    weight_unit: " ",
    gift_card: "FALSE",
    google_condition: " ",
    status: "active",
};

/// Spec-table fields looked up when the product has more than one variant.
pub const SPEC_FIELDS_MULTI: &[&str] = &[
    "Weight",
    "Width",
    "UOM",
    "Length",
    "Thickness",
    "Collection",
    "Composition",
    "Design",
    "Ends",
    "Edges",
    "Surface Type",
    "Installation Type",
    "Usage",
    "Application",
];

/// Spec-table fields looked up for variant-less (or single-variant) products.
/// The first three only render on those pages.
pub const SPEC_FIELDS_SINGLE: &[&str] = &[
    "PCs per box",
    "Coverage Area",
    "Color Shade",
    "Weight",
    "Width",
    "UOM",
    "Length",
    "Thickness",
    "Collection",
    "Composition",
    "Design",
    "Ends",
    "Edges",
    "Surface Type",
    "Installation Type",
    "Usage",
    "Application",
];

pub const COL_COVERAGE_AREA: &str = "Coverage Area (product.metafields.custom.coverage_area)";
pub const COL_PCS_PER_BOX: &str = "pcsperbox (product.metafields.custom.pcsperbox)";
pub const COL_PRICE_PER_SQ_FT: &str = "Price Per Sq Ft (product.metafields.custom.price_per_sq_ft)";
pub const COL_SURFACE_TYPE: &str = "Surface Type (product.metafields.custom.surface_type)";
pub const COL_UOM: &str = "uom (product.metafields.custom.uom)";
pub const COL_PRODUCT_DETAILS: &str =
    "Product description box = Product Details Field (product.metafields.custom.product_details_field)";

/// Every output column, in export order. The trailing block flattens the
/// spec table; `Weight` is shared with the platform column of the same name.
pub const COLUMNS: &[&str] = &[
    "Handle",
    "Title",
    "Variation",
    "Body (HTML)",
    "Vendor",
    "Type",
    "Tags",
    "Option1 Name",
    "Option1 Value",
    "Option2 Name",
    "Option2 Value",
    "Variant SKU",
    "Variant Grams",
    "Variant Inventory Tracker",
    "Variant Inventory Qty",
    "Variant Inventory Policy",
    "Variant Fulfillment Service",
    "Variant Price",
    "Variant Compare At Price",
    "Variant Requires Shipping",
    "Variant Taxable",
    "Variant Barcode",
    "Variant Weight Unit",
    "Gift Card",
    "Weight",
    "SEO Title",
    COL_PRODUCT_DETAILS,
    "Google Shopping / Condition",
    "Status",
    "Variant Description",
    COL_COVERAGE_AREA,
    COL_PCS_PER_BOX,
    COL_PRICE_PER_SQ_FT,
    "Image Src",
    "Variant Image",
    "Image Position",
    "Original Price",
    COL_SURFACE_TYPE,
    COL_UOM,
    "PCs per box",
    "Coverage Area",
    "Color Shade",
    "Width",
    "UOM",
    "Length",
    "Thickness",
    "Collection",
    "Composition",
    "Design",
    "Ends",
    "Edges",
    "Surface Type",
    "Installation Type",
    "Usage",
    "Application",
];

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn text(s: &str) -> Self {
        Cell::Text(s.to_owned())
    }

    /// Rendering used by text-only sinks such as CSV.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

impl VariantRecord {
    /// Value of `column` for this record; unknown column names yield
    /// [`Cell::Empty`].
    #[must_use]
    pub fn cell(&self, column: &str) -> Cell {
        let b = &BOOKKEEPING;
        match column {
            "Handle" => Cell::text(&self.handle),
            "Title" | "SEO Title" => Cell::text(&self.title),
            "Variation" => Cell::text(&self.variation),
            "Body (HTML)" => Cell::text(&self.body_html),
            "Vendor" => Cell::text(&self.vendor),
            "Type" => Cell::text(&self.product_type),
            "Tags" => Cell::text(&self.tags),
            "Option1 Name" => Cell::text(b.option1_name),
            "Option1 Value" => Cell::text(&self.option1_value),
            "Option2 Name" => Cell::text(b.option2_name),
            "Option2 Value" => Cell::text(&self.option2_value),
            "Variant SKU" => Cell::text(&self.sku),
            "Variant Grams" => Cell::text(b.variant_grams),
            "Variant Inventory Tracker" => Cell::text(b.inventory_tracker),
            "Variant Inventory Qty" => Cell::text(b.inventory_qty),
            "Variant Inventory Policy" => Cell::text(b.inventory_policy),
            "Variant Fulfillment Service" => Cell::text(b.fulfillment_service),
            "Variant Price" => Cell::text(&self.price),
            "Variant Compare At Price" => Cell::text(&self.compare_at_price),
            "Variant Requires Shipping" => Cell::text(b.requires_shipping),
            "Variant Taxable" => Cell::text(b.taxable),
            "Variant Barcode" => Cell::text(&self.barcode),
            "Variant Weight Unit" => Cell::text(b.weight_unit),
            "Gift Card" => Cell::text(b.gift_card),
            "Weight" => Cell::text(&self.weight),
            COL_PRODUCT_DETAILS => Cell::text(&self.product_description),
            "Google Shopping / Condition" => Cell::text(b.google_condition),
            "Status" => Cell::text(b.status),
            "Variant Description" => Cell::text(&self.variant_description),
            COL_COVERAGE_AREA => Cell::text(&self.coverage_area),
            COL_PCS_PER_BOX => Cell::text(&self.pcs_per_box),
            COL_PRICE_PER_SQ_FT => Cell::text(&self.price_per_sq_ft),
            "Image Src" => Cell::text(&self.image_src),
            "Variant Image" => Cell::text(&self.variant_image),
            "Image Position" => self
                .image_position
                .and_then(|p| u32::try_from(p).ok())
                .map_or(Cell::Empty, |p| Cell::Number(f64::from(p))),
            "Original Price" => Cell::text(&self.original_price),
            COL_SURFACE_TYPE => Cell::text(&self.surface_type),
            COL_UOM => Cell::text(&self.uom),
            field => self
                .spec
                .get(field)
                .map_or(Cell::Empty, |v| Cell::Text(v.to_owned())),
        }
    }

    /// All cells in [`COLUMNS`] order.
    #[must_use]
    pub fn cells(&self) -> Vec<Cell> {
        COLUMNS.iter().map(|c| self.cell(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::products::SpecTable;

    fn record() -> VariantRecord {
        let mut spec = SpecTable::new();
        spec.insert("Weight", "44 lbs");
        spec.insert("Color Shade", "V2");
        VariantRecord {
            handle: "calacatta-gold-24x48".to_string(),
            title: "Calacatta Gold 24x48".to_string(),
            option1_value: "White".to_string(),
            option2_value: "24x48".to_string(),
            price: "59.99".to_string(),
            weight: "44 lbs".to_string(),
            uom: "Box".to_string(),
            image_position: Some(2),
            spec,
            ..VariantRecord::default()
        }
    }

    #[test]
    fn column_names_are_unique() {
        let mut seen = HashSet::new();
        for col in COLUMNS {
            assert!(seen.insert(*col), "duplicate column {col}");
        }
    }

    #[test]
    fn every_spec_field_has_a_column() {
        for field in SPEC_FIELDS_SINGLE.iter().chain(SPEC_FIELDS_MULTI) {
            assert!(COLUMNS.contains(field), "no column for spec field {field}");
        }
    }

    #[test]
    fn multi_fields_are_a_subset_of_single_fields() {
        for field in SPEC_FIELDS_MULTI {
            assert!(SPEC_FIELDS_SINGLE.contains(field));
        }
        let extras: Vec<_> = SPEC_FIELDS_SINGLE
            .iter()
            .filter(|f| !SPEC_FIELDS_MULTI.contains(f))
            .collect();
        assert_eq!(extras, vec![&"PCs per box", &"Coverage Area", &"Color Shade"]);
    }

    #[test]
    fn cells_align_with_columns() {
        assert_eq!(record().cells().len(), COLUMNS.len());
    }

    #[test]
    fn bookkeeping_columns_use_constants() {
        let r = record();
        assert_eq!(r.cell("Variant Inventory Policy"), Cell::text("deny"));
        assert_eq!(r.cell("Variant Fulfillment Service"), Cell::text("manual"));
        assert_eq!(r.cell("Variant Requires Shipping"), Cell::text("TRUE"));
        assert_eq!(r.cell("Variant Taxable"), Cell::text("TRUE"));
        assert_eq!(r.cell("Gift Card"), Cell::text("FALSE"));
        assert_eq!(r.cell("Status"), Cell::text("active"));
        assert_eq!(r.cell("Option1 Name"), Cell::text("Color"));
        assert_eq!(r.cell("Option2 Name"), Cell::text("Size"));
    }

    #[test]
    fn options_map_color_then_size() {
        let r = record();
        assert_eq!(r.cell("Option1 Value"), Cell::text("White"));
        assert_eq!(r.cell("Option2 Value"), Cell::text("24x48"));
    }

    #[test]
    fn seo_title_mirrors_title() {
        let r = record();
        assert_eq!(r.cell("SEO Title"), r.cell("Title"));
    }

    #[test]
    fn image_position_is_numeric_or_empty() {
        let mut r = record();
        assert_eq!(r.cell("Image Position"), Cell::Number(2.0));
        r.image_position = None;
        assert_eq!(r.cell("Image Position"), Cell::Empty);
    }

    #[test]
    fn spec_columns_read_from_spec_table() {
        let r = record();
        assert_eq!(r.cell("Color Shade"), Cell::text("V2"));
        assert_eq!(r.cell("PCs per box"), Cell::Empty);
        assert_eq!(r.cell(COL_UOM), Cell::text("Box"));
    }

    #[test]
    fn cell_text_rendering() {
        assert_eq!(Cell::Number(3.0).as_text(), "3");
        assert_eq!(Cell::Empty.as_text(), "");
        assert_eq!(Cell::text("x").as_text(), "x");
    }
}
