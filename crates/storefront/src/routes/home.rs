//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::routes::layout::Layout;
use crate::routes::products::ProductListState;
use crate::state::AppState;

/// Products fetched for the featured grid.
const FEATURED_FETCH: i64 = 8;

/// Products the featured grid shows.
const FEATURED_SHOWN: usize = 4;

/// A "Shop by Category" tile.
#[derive(Debug, Clone, Copy)]
pub struct CategoryTile {
    pub name: &'static str,
    pub href: &'static str,
    pub image_url: &'static str,
}

const CATEGORY_TILES: &[CategoryTile] = &[
    CategoryTile {
        name: "Men",
        href: "/products?category=men",
        image_url: "https://images.unsplash.com/photo-1490578474895-699cd4e2cf59?w=800",
    },
    CategoryTile {
        name: "Women",
        href: "/products?category=women",
        image_url: "https://images.unsplash.com/photo-1483985988355-763728e1935b?w=800",
    },
    CategoryTile {
        name: "Accessories",
        href: "/products?category=accessories",
        image_url: "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=800",
    },
];

/// A selling point of the custom builder.
#[derive(Debug, Clone, Copy)]
pub struct BuilderFeature {
    pub title: &'static str,
    pub description: &'static str,
}

const BUILDER_FEATURES: &[BuilderFeature] = &[
    BuilderFeature {
        title: "Choose Your Fabric",
        description: "Premium materials from around the world",
    },
    BuilderFeature {
        title: "Pick Your Style",
        description: "Collar, sleeves, fit - all customizable",
    },
    BuilderFeature {
        title: "Make It Yours",
        description: "Colors and details tailored to you",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub categories: &'static [CategoryTile],
    pub features: &'static [BuilderFeature],
    pub featured: ProductListState,
}

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let result = state.storefront().get_products(FEATURED_FETCH, None).await;
    let featured = ProductListState::from_result(
        result
            .as_ref()
            .map(|products| products.get(..FEATURED_SHOWN).unwrap_or(products)),
    );

    HomeTemplate {
        layout: Layout::load(&state, &session).await,
        categories: CATEGORY_TILES,
        features: BUILDER_FEATURES,
        featured,
    }
}
