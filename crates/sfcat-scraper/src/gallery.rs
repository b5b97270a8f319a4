//! Gallery image partitioning.
//!
//! The storefront appends one thumbnail per variant swatch to the end of the
//! product gallery, in reverse swatch order. With `n` variant controls the
//! last `n` thumbnails are therefore treated as variant images and the rest
//! form the body image set that feeds `Image Src` / `Image Position`.
//!
//! Nothing on the page confirms this ordering. If the theme ever renders
//! thumbnails differently, images silently mis-correlate.

/// A product gallery split into body images and per-variant thumbnails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery {
    all: Vec<String>,
    body: Vec<String>,
    variant_thumbs: Vec<String>,
}

impl Gallery {
    /// Splits `images` (DOM order) for a product with `num_variations`
    /// controls. When there are more controls than images every image is a
    /// variant thumbnail.
    #[must_use]
    pub fn partition(images: Vec<String>, num_variations: usize) -> Self {
        let split_at = images.len().saturating_sub(num_variations);
        let body = images[..split_at].to_vec();
        let variant_thumbs = images[split_at..].iter().rev().cloned().collect();
        Self {
            all: images,
            body,
            variant_thumbs,
        }
    }

    #[must_use]
    pub fn all(&self) -> &[String] {
        &self.all
    }

    #[must_use]
    pub fn body(&self) -> &[String] {
        &self.body
    }

    /// Trailing thumbnails, reversed so index `i` lines up with control `i`
    /// of the reversed control list.
    #[must_use]
    pub fn variant_thumbs(&self) -> &[String] {
        &self.variant_thumbs
    }

    /// `Image Src` and 1-based `Image Position` for the `idx`-th record.
    /// Records past the end of the body set get an empty source and no
    /// position.
    #[must_use]
    pub fn body_slot(&self, idx: usize) -> (String, Option<usize>) {
        match self.body.get(idx) {
            Some(src) => (src.clone(), Some(idx + 1)),
            None => (String::new(), None),
        }
    }

    #[must_use]
    pub fn variant_thumb(&self, idx: usize) -> Option<&str> {
        self.variant_thumbs.get(idx).map(String::as_str)
    }

    /// Representative image for a variant-less product: the second gallery
    /// image when present (the first is usually a lifestyle shot), else the
    /// first.
    #[must_use]
    pub fn single_variant_image(&self) -> String {
        self.all
            .get(1)
            .or_else(|| self.all.first())
            .cloned()
            .unwrap_or_default()
    }
}
