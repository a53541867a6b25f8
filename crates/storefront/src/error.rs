//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use threadline_core::cart::CartError;
use threadline_core::configurator::ConfiguratorError;
use thiserror::Error;

use crate::shopify::ShopifyError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Cart mutation was invalid or could not be synced.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Configurator input named an unknown option or step.
    #[error("Configurator error: {0}")]
    Configurator(#[from] ConfiguratorError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The selected variant is not available for sale.
    #[error("Variant unavailable: {0}")]
    VariantUnavailable(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Shopify(_)
                | Self::Session(_)
                | Self::Internal(_)
                | Self::Cart(CartError::Sync(_))
        )
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Shopify(_) | Self::Cart(CartError::Sync(_)) => StatusCode::BAD_GATEWAY,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::VariantUnavailable(_) => StatusCode::CONFLICT,
            Self::NotFound(_) | Self::Cart(CartError::LineNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Cart(_) | Self::Configurator(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show the shopper.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Shopify(_) => "External service error".to_string(),
            Self::Cart(CartError::Sync(_)) => "Could not update your cart".to_string(),
            Self::VariantUnavailable(_) => "This item is sold out".to_string(),
            Self::Cart(err) => err.to_string(),
            Self::Configurator(err) => err.to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status(), self.public_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("variant_id", "gid://...")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use threadline_core::cart::CartSyncError;
    use threadline_core::types::VariantId;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::VariantUnavailable("oxford-shirt / L".to_string());
        assert_eq!(err.to_string(), "Variant unavailable: oxford-shirt / L");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::VariantUnavailable("v".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Shopify(ShopifyError::Timeout)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::MissingVariant)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::LineNotFound(VariantId::new("v")))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::Sync(CartSyncError::Timeout(
                Duration::from_secs(10)
            )))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Configurator(ConfiguratorError::StepOutOfRange(9))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_public_message_hides_internals() {
        let err = AppError::Shopify(ShopifyError::InvalidData("secret detail".to_string()));
        assert_eq!(err.public_message(), "External service error");

        let err = AppError::Cart(CartError::Sync(CartSyncError::Remote("503".to_string())));
        assert_eq!(err.public_message(), "Could not update your cart");
    }
}
