//! Types stored in the shopper's session.

pub mod session;

pub use session::{CartKey, keys as session_keys};
