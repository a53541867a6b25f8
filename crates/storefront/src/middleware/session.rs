//! Session middleware configuration.
//!
//! Sessions live in process memory; a restart empties every cart. The
//! store is a bounded moka cache that drops records once they expire.

use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::config::StorefrontConfig;
use crate::models::{CartKey, session_keys};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "threadline_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Most sessions held at once; the least recently used go first.
const SESSION_STORE_CAPACITY: u64 = 100_000;

/// The in-memory session store.
#[must_use]
pub fn session_store() -> MokaStore {
    MokaStore::new(Some(SESSION_STORE_CAPACITY))
}

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaStore> {
    SessionManagerLayer::new(session_store())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The session's cart key, minting one on first use.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn cart_key(session: &Session) -> Result<CartKey, tower_sessions::session::Error> {
    if let Some(key) = existing_cart_key(session).await? {
        return Ok(key);
    }
    let key = CartKey::generate();
    session.insert(session_keys::CART_KEY, &key).await?;
    Ok(key)
}

/// The session's cart key, if a cart was ever started.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn existing_cart_key(
    session: &Session,
) -> Result<Option<CartKey>, tower_sessions::session::Error> {
    session.get::<CartKey>(session_keys::CART_KEY).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use tower_sessions::SessionStore;
    use tower_sessions::cookie::time::{Duration, OffsetDateTime};
    use tower_sessions::session::{Id, Record};

    use super::*;

    fn record(expiry_date: OffsetDateTime) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::new(),
            expiry_date,
        }
    }

    #[tokio::test]
    async fn store_keeps_live_sessions() {
        let store = session_store();
        let mut live = record(OffsetDateTime::now_utc() + Duration::hours(1));
        store.create(&mut live).await.unwrap();

        let loaded = store.load(&live.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, live.id);
    }

    #[tokio::test]
    async fn store_drops_expired_sessions() {
        let store = session_store();
        let mut stale = record(OffsetDateTime::now_utc() - Duration::seconds(1));
        store.create(&mut stale).await.unwrap();

        assert!(store.load(&stale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cart_key_is_stable_per_session() {
        let session = Session::new(None, Arc::new(session_store()), None);
        assert!(existing_cart_key(&session).await.unwrap().is_none());

        let first = cart_key(&session).await.unwrap();
        let second = cart_key(&session).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(existing_cart_key(&session).await.unwrap(), Some(first));
    }
}
