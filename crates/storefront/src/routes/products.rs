//! Product route handlers.

use std::collections::BTreeMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::routes::layout::Layout;
use crate::shopify::ShopifyError;
use crate::shopify::types::{Product, ProductVariant};
use crate::state::AppState;

/// Products fetched for the listing page; search and sort run locally.
const LISTING_PAGE_SIZE: i64 = 50;

// =============================================================================
// Views
// =============================================================================

/// Product card display data for templates.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub handle: String,
    pub title: String,
    pub image_url: Option<String>,
    pub image_alt: String,
    pub price: String,
    /// "3 options available" when the first option has a choice.
    pub options_label: Option<String>,
    /// Variant a one-click add puts in the cart.
    pub variant_id: Option<String>,
    pub sold_out: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        let first_image = product.images.first();
        let first_variant = product.first_variant();

        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            image_url: first_image.map(|img| img.url.clone()),
            image_alt: first_image
                .and_then(|img| img.alt_text.clone())
                .unwrap_or_else(|| product.title.clone()),
            price: product.price_range.min_variant_price.to_string(),
            options_label: product
                .option_count()
                .map(|n| format!("{n} options available")),
            variant_id: first_variant.map(|v| v.id.to_string()),
            sold_out: first_variant.is_none_or(|v| !v.available_for_sale),
        }
    }
}

/// Outcome of a catalog fetch, as a page renders it.
#[derive(Debug, Clone)]
pub enum ProductListState {
    Loaded(Vec<ProductCardView>),
    Empty,
    Failed,
}

impl ProductListState {
    /// Cards for `products`, or the empty state.
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        if products.is_empty() {
            Self::Empty
        } else {
            Self::Loaded(products.iter().map(ProductCardView::from).collect())
        }
    }

    /// Like [`Self::from_products`], logging and absorbing fetch errors.
    #[must_use]
    pub fn from_result(result: Result<&[Product], &ShopifyError>) -> Self {
        match result {
            Ok(products) => Self::from_products(products),
            Err(e) => {
                tracing::error!("Failed to fetch products: {e}");
                Self::Failed
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Loaded(cards) => cards.len(),
            Self::Empty | Self::Failed => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Listing sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Backend order.
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    /// Backend order; there is no popularity signal.
    Popular,
}

impl SortOrder {
    pub const ALL: [Self; 4] = [Self::Newest, Self::PriceLow, Self::PriceHigh, Self::Popular];

    /// Parse a `sort` query value; unknown values fall back to newest.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| Some(s.value()) == value)
            .unwrap_or_default()
    }

    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Popular => "popular",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::PriceLow => "Price: Low to High",
            Self::PriceHigh => "Price: High to Low",
            Self::Popular => "Most Popular",
        }
    }

    fn apply(self, products: &mut [Product]) {
        let min_price = |p: &Product| p.price_range.min_variant_price.amount;
        match self {
            Self::Newest | Self::Popular => {}
            Self::PriceLow => products.sort_by_key(min_price),
            Self::PriceHigh => products.sort_by_key(|p| std::cmp::Reverse(min_price(p))),
        }
    }
}

/// A sidebar facet. Facets are display-only.
#[derive(Debug, Clone, Copy)]
pub struct Facet {
    pub title: &'static str,
    pub values: &'static [&'static str],
}

pub const FILTER_FACETS: &[Facet] = &[
    Facet {
        title: "Categories",
        values: &["Men", "Women", "Accessories"],
    },
    Facet {
        title: "Sizes",
        values: &["XS", "S", "M", "L", "XL", "XXL"],
    },
    Facet {
        title: "Colors",
        values: &["Black", "White", "Blue", "Red", "Green", "Yellow"],
    },
    Facet {
        title: "Price Ranges",
        values: &["Under ₹1000", "₹1000 - ₹2500", "₹2500 - ₹5000", "Above ₹5000"],
    },
];

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub view: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub heading: String,
    pub category: String,
    pub search: String,
    pub sort: SortOrder,
    pub sort_options: [SortOrder; 4],
    pub list_view: bool,
    pub facets: &'static [Facet],
    pub products: ProductListState,
}

impl ProductsIndexTemplate {
    /// Query string for this listing with `view` replaced.
    #[must_use]
    pub fn view_href(&self, view: &str) -> String {
        let mut params = vec![("view", view)];
        if !self.category.is_empty() {
            params.push(("category", &self.category));
        }
        if !self.search.is_empty() {
            params.push(("search", &self.search));
        }
        params.push(("sort", self.sort.value()));
        query_string(&params)
    }

    /// "N products found".
    #[must_use]
    pub fn count_label(&self) -> String {
        format!("{} products found", self.products.len())
    }
}

/// "All Products", or "Men's Collection" for `?category=men`.
fn listing_heading(category: &str) -> String {
    let mut chars = category.chars();
    chars.next().map_or_else(
        || "All Products".to_string(),
        |first| format!("{}{}'s Collection", first.to_uppercase(), chars.as_str()),
    )
}

/// Build a `?a=b&c=d` query string.
fn query_string(params: &[(&str, &str)]) -> String {
    let pairs: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();
    format!("?{}", pairs.join("&"))
}

/// Display product listing page.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListingQuery>,
) -> impl IntoResponse {
    let category = query.category.unwrap_or_default().trim().to_lowercase();
    let search = query.search.unwrap_or_default().trim().to_string();
    let sort = SortOrder::from_param(query.sort.as_deref());

    let filter = (!category.is_empty()).then(|| format!("product_type:{category}"));
    let result = state
        .storefront()
        .get_products(LISTING_PAGE_SIZE, filter)
        .await;

    let products = match result {
        Ok(mut products) => {
            let needle = search.to_lowercase();
            products.retain(|p| p.title.to_lowercase().contains(&needle));
            sort.apply(&mut products);
            ProductListState::from_products(&products)
        }
        Err(e) => ProductListState::from_result(Err(&e)),
    };

    ProductsIndexTemplate {
        layout: Layout::load(&state, &session).await,
        heading: listing_heading(&category),
        category,
        search,
        sort,
        sort_options: SortOrder::ALL,
        list_view: query.view.as_deref() == Some("list"),
        facets: FILTER_FACETS,
        products,
    }
}

// =============================================================================
// Detail
// =============================================================================

/// Image display data for templates.
#[derive(Debug, Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
    pub href: String,
    pub selected: bool,
}

/// One value of a product option, linking to the page with it chosen.
#[derive(Debug, Clone)]
pub struct OptionValueView {
    pub value: String,
    pub href: String,
    pub selected: bool,
}

/// Product option display data for templates.
#[derive(Debug, Clone)]
pub struct OptionView {
    pub name: String,
    pub values: Vec<OptionValueView>,
}

/// Variant display data for templates.
#[derive(Debug, Clone)]
pub struct VariantView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub available: bool,
}

impl From<&ProductVariant> for VariantView {
    fn from(v: &ProductVariant) -> Self {
        Self {
            id: v.id.to_string(),
            title: v.title.clone(),
            price: v.price.to_string(),
            available: v.available_for_sale,
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub images: Vec<ImageView>,
    pub main_image: Option<ImageView>,
    pub options: Vec<OptionView>,
    pub variant: Option<VariantView>,
    pub price: String,
    pub quantity: u32,
}

/// Shown for handles Shopify does not know, or when the lookup failed.
#[derive(Template, WebTemplate)]
#[template(path = "products/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub layout: Layout,
    pub load_failed: bool,
}

/// Product page state carried in the query string.
#[derive(Debug, Default)]
struct DetailSelection {
    image: usize,
    quantity: u32,
    options: BTreeMap<String, String>,
}

impl DetailSelection {
    /// Split raw query pairs into image index, quantity and option choices.
    /// Option choices only count for options the product has.
    fn parse(mut params: BTreeMap<String, String>, product: &Product) -> Self {
        let image = params
            .remove("image")
            .and_then(|v| v.parse().ok())
            .filter(|&i| i < product.images.len())
            .unwrap_or(0);
        let quantity = params
            .remove("quantity")
            .and_then(|v| v.parse().ok())
            .filter(|&q| q >= 1)
            .unwrap_or(1);
        params.retain(|name, _| product.options.iter().any(|o| &o.name == name));
        Self {
            image,
            quantity,
            options: params,
        }
    }

    /// Query string for this selection with overrides applied.
    fn href(&self, image: usize, option: Option<(&str, &str)>) -> String {
        let mut options = self.options.clone();
        if let Some((name, value)) = option {
            options.insert(name.to_string(), value.to_string());
        }
        let image = image.to_string();
        let mut params: Vec<(&str, &str)> = options
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        params.push(("image", &image));
        query_string(&params)
    }
}

/// Display product detail page.
#[instrument(skip(state, session, params), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(handle): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Response {
    let (status, load_failed) = match state.storefront().get_product_by_handle(&handle).await {
        Ok(Some(product)) => return render_product(&state, &session, &product, params).await,
        Ok(None) => (StatusCode::NOT_FOUND, false),
        Err(e) => {
            tracing::error!("Failed to fetch product: {e}");
            (StatusCode::BAD_GATEWAY, true)
        }
    };

    let layout = Layout::load(&state, &session).await;
    (status, ProductNotFoundTemplate { layout, load_failed }).into_response()
}

async fn render_product(
    state: &AppState,
    session: &Session,
    product: &Product,
    params: BTreeMap<String, String>,
) -> Response {
    let selection = DetailSelection::parse(params, product);
    let variant = product.select_variant(&selection.options);

    // A chosen value is highlighted; otherwise the selected variant's value is.
    let current_value = |name: &str| -> Option<String> {
        selection.options.get(name).cloned().or_else(|| {
            variant.and_then(|v| {
                v.selected_options
                    .iter()
                    .find(|o| o.name == name)
                    .map(|o| o.value.clone())
            })
        })
    };

    let options = product
        .options
        .iter()
        .map(|option| {
            let current = current_value(&option.name);
            OptionView {
                name: option.name.clone(),
                values: option
                    .values
                    .iter()
                    .map(|value| OptionValueView {
                        value: value.clone(),
                        href: selection
                            .href(selection.image, Some((option.name.as_str(), value.as_str()))),
                        selected: current.as_deref() == Some(value.as_str()),
                    })
                    .collect(),
            }
        })
        .collect();

    let images: Vec<ImageView> = product
        .images
        .iter()
        .enumerate()
        .map(|(i, img)| ImageView {
            url: img.url.clone(),
            alt: img
                .alt_text
                .clone()
                .unwrap_or_else(|| format!("{} {}", product.title, i + 1)),
            href: selection.href(i, None),
            selected: i == selection.image,
        })
        .collect();

    let price = variant.map_or_else(
        || product.price_range.min_variant_price.to_string(),
        |v| v.price.to_string(),
    );

    ProductShowTemplate {
        layout: Layout::load(state, session).await,
        handle: product.handle.clone(),
        title: product.title.clone(),
        description: product.description.clone(),
        main_image: images.get(selection.image).cloned(),
        images,
        options,
        variant: variant.map(VariantView::from),
        price,
        quantity: selection.quantity,
    }
    .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use threadline_core::{CurrencyCode, Price};

    use super::*;
    use crate::shopify::types::tests::oxford;

    #[test]
    fn test_listing_heading() {
        assert_eq!(listing_heading(""), "All Products");
        assert_eq!(listing_heading("men"), "Men's Collection");
    }

    #[test]
    fn test_sort_from_param() {
        assert_eq!(SortOrder::from_param(Some("price-high")), SortOrder::PriceHigh);
        assert_eq!(SortOrder::from_param(Some("bogus")), SortOrder::Newest);
        assert_eq!(SortOrder::from_param(None), SortOrder::Newest);
    }

    #[test]
    fn test_sort_by_price() {
        let priced = |handle: &str, units: i64| {
            let mut p = oxford();
            p.handle = handle.to_string();
            p.price_range.min_variant_price = Price::whole(units, CurrencyCode::INR);
            p
        };
        let mut products = vec![priced("b", 2000), priced("a", 999), priced("c", 4500)];

        SortOrder::PriceLow.apply(&mut products);
        let handles: Vec<_> = products.iter().map(|p| p.handle.as_str()).collect();
        assert_eq!(handles, ["a", "b", "c"]);

        SortOrder::PriceHigh.apply(&mut products);
        let handles: Vec<_> = products.iter().map(|p| p.handle.as_str()).collect();
        assert_eq!(handles, ["c", "b", "a"]);
    }

    #[test]
    fn test_card_view() {
        let card = ProductCardView::from(&oxford());
        assert_eq!(card.price, "₹1,499.00");
        assert_eq!(card.options_label.as_deref(), Some("2 options available"));
        assert!(!card.sold_out);
        assert_eq!(card.image_alt, "Oxford Shirt");
    }

    #[test]
    fn test_detail_selection_ignores_unknown_params() {
        let params = BTreeMap::from([
            ("image".to_string(), "7".to_string()),
            ("quantity".to_string(), "0".to_string()),
            ("Size".to_string(), "L".to_string()),
            ("utm_source".to_string(), "mail".to_string()),
        ]);
        let selection = DetailSelection::parse(params, &oxford());

        assert_eq!(selection.image, 0);
        assert_eq!(selection.quantity, 1);
        assert_eq!(selection.options.len(), 1);
        assert_eq!(selection.href(0, Some(("Color", "White"))), "?Color=White&Size=L&image=0");
    }
}
