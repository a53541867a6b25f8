//! Cart route handlers.
//!
//! The cart lives in the session's [`CartStore`](crate::services::CartStore);
//! Shopify mirrors it. HTMX requests get fragments plus an `HX-Trigger`
//! header, plain form posts get a flash message and a redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use threadline_core::Notification;
use threadline_core::cart::{AddItemInput, Cart, CartError, CartLineItem};
use threadline_core::types::VariantId;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{cart_key, existing_cart_key};
use crate::routes::layout::{Layout, is_htmx};
use crate::services::notify;
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub variant_id: String,
    pub handle: String,
    pub title: String,
    /// "M / Blue"; empty for single-variant products.
    pub options: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&CartLineItem> for CartItemView {
    fn from(line: &CartLineItem) -> Self {
        let options = line
            .selected_options
            .iter()
            .map(|o| o.value.as_str())
            .collect::<Vec<_>>()
            .join(" / ");

        Self {
            variant_id: line.variant_id.to_string(),
            handle: line.product.handle.clone(),
            title: line.product.title.clone(),
            options,
            image_url: line.product.image_url.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price.to_string(),
            line_total: line.line_total().to_string(),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    fn build(cart: &Cart) -> Result<Self> {
        Ok(Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: cart.subtotal().map_err(CartError::from)?.to_string(),
            item_count: cart.item_count(),
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// The session's cart, or an empty one.
async fn current_cart(state: &AppState, session: &Session) -> Result<Cart> {
    let Some(key) = existing_cart_key(session).await? else {
        return Ok(Cart::new());
    };
    Ok(match state.carts().get(key.as_str()).await {
        Some(store) => store.snapshot().cart,
        None => Cart::new(),
    })
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub handle: String,
    #[serde(default)]
    pub variant_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub variant_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub variant_id: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let cart = CartView::build(&current_cart(&state, &session).await?)?;
    Ok(CartShowTemplate {
        layout: Layout::load(&state, &session).await,
        cart,
    })
}

/// Add a variant to the cart.
///
/// A remote failure is reported as an error toast rather than an error
/// status, since the cart itself is intact.
#[instrument(skip(state, session, headers), fields(handle = %form.handle))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .storefront()
        .get_product_by_handle(&form.handle)
        .await?
        .ok_or_else(|| AppError::NotFound(form.handle.clone()))?;

    if form.variant_id.trim().is_empty() {
        return Err(CartError::MissingVariant.into());
    }
    let variant_id = VariantId::new(form.variant_id.trim());
    let variant = product
        .variant(&variant_id)
        .ok_or_else(|| AppError::NotFound(variant_id.to_string()))?;
    if !variant.available_for_sale {
        return Err(AppError::VariantUnavailable(format!(
            "{} / {}",
            product.title, variant.title
        )));
    }

    let quantity = form.quantity.unwrap_or(1);
    let input = AddItemInput {
        product: product.to_ref(),
        variant_id: variant.id.clone(),
        variant_title: variant.title.clone(),
        price: variant.price,
        quantity,
        selected_options: variant.selected_options.clone(),
    };

    let key = cart_key(&session).await?;
    let store = state.carts().get_or_create(key.as_str()).await;

    add_breadcrumb(
        "cart",
        "Add to cart",
        Some(&[("variant_id", variant_id.as_str())]),
    );

    let (notification, count, changed) = match store.add_item(input).await {
        Ok(snapshot) => (
            Notification::success("Added to cart!")
                .with_description(format!("{quantity}x {}", product.title)),
            snapshot.cart.item_count(),
            true,
        ),
        Err(CartError::Sync(e)) => {
            tracing::error!("Failed to add item to cart: {e}");
            (
                Notification::error("Could not add to cart")
                    .with_description("Please try again in a moment."),
                store.snapshot().cart.item_count(),
                false,
            )
        }
        Err(e) => return Err(e.into()),
    };

    if is_htmx(&headers) {
        let trigger = notify::hx_trigger(&notification, changed);
        return Ok(notify::with_trigger(CartCountTemplate { count }, trigger));
    }

    notify::push(&session, notification).await;
    Ok(Redirect::to(&format!("/product/{}", product.handle)).into_response())
}

/// Shared tail of the update and remove handlers.
fn items_response(
    result: std::result::Result<Cart, CartError>,
    fallback: impl FnOnce() -> Cart,
) -> Result<Response> {
    match result {
        Ok(cart) => Ok(notify::with_trigger(
            CartItemsTemplate {
                cart: CartView::build(&cart)?,
            },
            Some(notify::CART_UPDATED.clone()),
        )),
        Err(CartError::Sync(e)) => {
            tracing::error!("Failed to sync cart change: {e}");
            let notification = Notification::error("Could not update your cart");
            Ok(notify::with_trigger(
                CartItemsTemplate {
                    cart: CartView::build(&fallback())?,
                },
                notify::hx_trigger(&notification, false),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// Update a line's quantity (HTMX). Zero or less removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let variant_id = VariantId::new(form.variant_id);
    let Some(key) = existing_cart_key(&session).await? else {
        return Err(CartError::LineNotFound(variant_id).into());
    };
    let Some(store) = state.carts().get(key.as_str()).await else {
        return Err(CartError::LineNotFound(variant_id).into());
    };

    let result = store
        .update_quantity(&variant_id, form.quantity)
        .await
        .map(|snapshot| snapshot.cart);
    items_response(result, || store.snapshot().cart)
}

/// Remove a line (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let variant_id = VariantId::new(form.variant_id);
    let Some(key) = existing_cart_key(&session).await? else {
        return Err(CartError::LineNotFound(variant_id).into());
    };
    let Some(store) = state.carts().get(key.as_str()).await else {
        return Err(CartError::LineNotFound(variant_id).into());
    };

    let result = store
        .remove_item(&variant_id)
        .await
        .map(|snapshot| snapshot.cart);
    items_response(result, || store.snapshot().cart)
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: crate::routes::layout::cart_count(&state, &session).await,
    }
}

/// Redirect to Shopify checkout.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<Response> {
    let cart = current_cart(&state, &session).await?;
    let Some(cart_id) = cart.cart_id().filter(|_| !cart.is_empty()) else {
        // Nothing to check out
        return Ok(Redirect::to("/cart").into_response());
    };

    match state.storefront().get_cart(cart_id).await {
        Ok(remote) => Ok(Redirect::to(&remote.checkout_url).into_response()),
        Err(e) => {
            tracing::error!("Failed to get cart for checkout: {e}");
            notify::push(
                &session,
                Notification::error("Checkout is unavailable right now"),
            )
            .await;
            Ok(Redirect::to("/cart").into_response())
        }
    }
}
