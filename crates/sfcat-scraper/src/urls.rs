//! Product URL helpers: handle extraction, variant id recovery, and link
//! absolutization.

use url::Url;

/// Extracts the product handle: the last path segment, without query string
/// or fragment.
///
/// Given `"https://floorscenter.com/products/calacatta-gold?variant=42"`,
/// returns `"calacatta-gold"`. Returns `None` when no segment remains.
#[must_use]
pub fn handle_from_url(product_url: &str) -> Option<String> {
    let handle = Url::parse(product_url).map_or_else(
        |e| {
            tracing::debug!(
                product_url,
                error = %e,
                "could not parse product url; falling back to string split for handle"
            );
            product_url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_owned()
        },
        |u| {
            u.path_segments()
                .and_then(|mut segs| segs.rfind(|s| !s.is_empty()))
                .unwrap_or_default()
                .to_owned()
        },
    );
    (!handle.is_empty()).then_some(handle)
}

/// Reads the `variant` query parameter the storefront writes into the URL
/// when a swatch is activated.
#[must_use]
pub fn variant_id_from_url(current_url: &str) -> Option<String> {
    Url::parse(current_url)
        .ok()?
        .query_pairs()
        .find(|(k, _)| k == "variant")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Resolves `href` against the page it was found on. Absolute links pass
/// through unchanged.
#[must_use]
pub fn absolutize(base_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(String::from)
        .ok()
}
