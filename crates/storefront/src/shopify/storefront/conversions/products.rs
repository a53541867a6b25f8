//! Product type conversion functions.

use threadline_core::Price;
use threadline_core::cart::SelectedOption;
use threadline_core::types::{ProductId, VariantId};

use crate::shopify::ShopifyError;
use crate::shopify::types::{Image, PriceRange, Product, ProductOption, ProductVariant};

use super::super::queries::{RawImage, RawMoney, RawOption, RawProduct, RawVariant};

fn convert_money(m: RawMoney) -> Result<Price, ShopifyError> {
    Price::parse(&m.amount, &m.currency_code)
        .map_err(|e| ShopifyError::InvalidData(format!("price {}: {e}", m.amount)))
}

fn convert_image(i: RawImage) -> Image {
    Image {
        url: i.url,
        alt_text: i.alt_text,
    }
}

fn convert_option(o: RawOption) -> ProductOption {
    ProductOption {
        name: o.name,
        values: o.values,
    }
}

fn convert_variant(v: RawVariant) -> Result<ProductVariant, ShopifyError> {
    Ok(ProductVariant {
        id: VariantId::new(v.id),
        title: v.title,
        available_for_sale: v.available_for_sale,
        price: convert_money(v.price)?,
        selected_options: v
            .selected_options
            .into_iter()
            .map(|o| SelectedOption {
                name: o.name,
                value: o.value,
            })
            .collect(),
    })
}

/// Convert a product from any query that spreads `ProductFields`.
///
/// # Errors
///
/// Returns [`ShopifyError::InvalidData`] if a price is malformed or in an
/// unsupported currency.
pub fn convert_product(product: RawProduct) -> Result<Product, ShopifyError> {
    let price_range = PriceRange {
        min_variant_price: convert_money(product.price_range.min_variant_price)?,
        max_variant_price: convert_money(product.price_range.max_variant_price)?,
    };

    let variants = product
        .variants
        .into_nodes()
        .map(convert_variant)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Product {
        id: ProductId::new(product.id),
        handle: product.handle,
        title: product.title,
        description: product.description,
        product_type: product.product_type,
        price_range,
        images: product.images.into_nodes().map(convert_image).collect(),
        options: product.options.into_iter().map(convert_option).collect(),
        variants,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use threadline_core::CurrencyCode;

    use super::*;

    fn raw(amount: &str, currency: &str) -> RawProduct {
        serde_json::from_value(json!({
            "id": "gid://shopify/Product/7",
            "handle": "linen-shirt",
            "title": "Linen Shirt",
            "description": "Breathable.",
            "productType": "men",
            "priceRange": {
                "minVariantPrice": { "amount": amount, "currencyCode": currency },
                "maxVariantPrice": { "amount": amount, "currencyCode": currency }
            },
            "images": { "edges": [ { "node": { "url": "https://cdn/x.jpg", "altText": null } } ] },
            "options": [ { "name": "Size", "values": ["S", "M"] } ],
            "variants": { "edges": [ { "node": {
                "id": "gid://shopify/ProductVariant/70",
                "title": "S",
                "availableForSale": true,
                "price": { "amount": amount, "currencyCode": currency },
                "selectedOptions": [ { "name": "Size", "value": "S" } ]
            } } ] }
        }))
        .unwrap()
    }

    #[test]
    fn test_convert_product() {
        let product = convert_product(raw("2499.0", "INR")).unwrap();
        assert_eq!(product.handle, "linen-shirt");
        assert_eq!(product.images.len(), 1);
        assert_eq!(product.variants[0].id.as_str(), "gid://shopify/ProductVariant/70");
        assert_eq!(
            product.variants[0].price,
            Price::whole(2499, CurrencyCode::INR)
        );
        assert_eq!(product.variants[0].selected_options[0].value, "S");
    }

    #[test]
    fn test_unknown_currency_is_invalid_data() {
        let err = convert_product(raw("10.00", "XYZ")).unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidData(_)));
    }
}
