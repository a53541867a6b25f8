//! JSON fixtures shaped like Storefront API responses.

use serde_json::{Value, json};

/// Variant ID of the given size of a fixture product.
pub fn variant_gid(handle: &str, size: &str) -> String {
    format!("gid://shopify/ProductVariant/{handle}-{}", size.to_lowercase())
}

/// A product with sizes S (available) and M (sold out), both at `amount` INR.
pub fn product_json(handle: &str, title: &str, product_type: &str, amount: &str) -> Value {
    let money = json!({ "amount": amount, "currencyCode": "INR" });
    let variant = |size: &str, available: bool| {
        json!({ "node": {
            "id": variant_gid(handle, size),
            "title": size,
            "availableForSale": available,
            "price": money,
            "selectedOptions": [ { "name": "Size", "value": size } ]
        } })
    };

    json!({
        "id": format!("gid://shopify/Product/{handle}"),
        "handle": handle,
        "title": title,
        "description": format!("{title} description."),
        "productType": product_type,
        "priceRange": { "minVariantPrice": money, "maxVariantPrice": money },
        "images": { "edges": [
            { "node": { "url": format!("https://cdn.shopify.com/{handle}-1.jpg"), "altText": title } },
            { "node": { "url": format!("https://cdn.shopify.com/{handle}-2.jpg"), "altText": null } }
        ] },
        "options": [ { "name": "Size", "values": ["S", "M"] } ],
        "variants": { "edges": [ variant("S", true), variant("M", false) ] }
    })
}

/// `GetProducts` response body.
pub fn products_response(products: &[Value]) -> Value {
    let edges: Vec<Value> = products.iter().map(|p| json!({ "node": p })).collect();
    json!({ "data": { "products": { "edges": edges } } })
}

/// `GetProductByHandle` response body.
pub fn product_response(product: Option<Value>) -> Value {
    json!({ "data": { "product": product } })
}

/// A cart with `(line id, variant gid, quantity)` lines.
pub fn cart_json(id: &str, lines: &[(&str, &str, i64)]) -> Value {
    let edges: Vec<Value> = lines
        .iter()
        .map(|(line_id, variant, quantity)| {
            json!({ "node": {
                "id": line_id,
                "quantity": quantity,
                "merchandise": { "id": variant }
            } })
        })
        .collect();
    json!({
        "id": id,
        "checkoutUrl": format!("https://checkout.example/{}", id.rsplit('/').next().unwrap_or(id)),
        "totalQuantity": lines.iter().map(|(_, _, q)| q).sum::<i64>(),
        "lines": { "edges": edges }
    })
}

/// Response body for a cart mutation whose root field is `root`.
pub fn cart_mutation_response(root: &str, cart: &Value) -> Value {
    let mut data = serde_json::Map::new();
    data.insert(root.to_string(), json!({ "cart": cart, "userErrors": [] }));
    json!({ "data": data })
}
