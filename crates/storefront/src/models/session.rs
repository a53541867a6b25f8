//! Session-related types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key into the cart registry, minted once per session.
///
/// Kept separate from the session ID so the cart survives a session ID
/// cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartKey(String);

impl CartKey {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CartKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session keys.
pub mod keys {
    /// Key for the shopper's [`super::CartKey`].
    pub const CART_KEY: &str = "cart_key";

    /// Key for the configurator wizard state.
    pub const WIZARD: &str = "wizard";

    /// Key for notifications waiting to be shown on the next page.
    pub const FLASH: &str = "flash";
}
