//! Session capability contract.
//!
//! Backends own the concrete representation; callers only see this trait.

use std::fmt::Debug;
use std::sync::Arc;

pub use serde_json::Value;

use crate::error::Result;
use crate::id::SessionId;

/// Shared handle to a provider-owned session.
pub type SessionRef = Arc<dyn Session>;

/// Key/value store scoped to one session.
///
/// Implementations use interior mutability: a handle can be shared across
/// threads while the provider keeps the authoritative copy.
pub trait Session: Send + Sync + Debug {
    /// Set a session value.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Get a session value, `None` when absent.
    fn get(&self, key: &str) -> Option<Value>;

    /// Delete a session value.
    fn delete(&self, key: &str) -> Result<()>;

    /// Identifier of this session; immutable for its lifetime.
    fn session_id(&self) -> &SessionId;
}
