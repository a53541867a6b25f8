//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Width requested from the Shopify CDN for product card images.
const CARD_IMAGE_WIDTH: u32 = 600;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Ask the Shopify CDN for a card-sized rendition of an image.
///
/// Usage in templates: `{{ url|card_image }}`
#[askama::filter_fn]
pub fn card_image(url: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(sized_image_url(&url.to_string(), CARD_IMAGE_WIDTH))
}

/// Append a `width` parameter to a Shopify CDN URL. Other URLs pass through.
fn sized_image_url(url: &str, width: u32) -> String {
    if !url.contains("cdn.shopify.com") || url.contains("width=") {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}width={width}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sized_image_url() {
        assert_eq!(
            sized_image_url("https://cdn.shopify.com/s/files/shirt.jpg", 600),
            "https://cdn.shopify.com/s/files/shirt.jpg?width=600"
        );
        assert_eq!(
            sized_image_url("https://cdn.shopify.com/s/files/shirt.jpg?v=17", 600),
            "https://cdn.shopify.com/s/files/shirt.jpg?v=17&width=600"
        );
        assert_eq!(
            sized_image_url("https://images.example.com/x.jpg", 600),
            "https://images.example.com/x.jpg"
        );
    }
}
