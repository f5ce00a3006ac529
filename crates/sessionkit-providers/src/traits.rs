//! Provider trait definitions.

use std::time::Duration;

use sessionkit_core::{Result, SessionId, SessionRef};

/// Core provider trait - all session storage backends implement this.
///
/// A provider plugs into the manager unchanged whether it keeps sessions in
/// memory, on disk or in a remote store.
pub trait Provider: Send + Sync {
    /// Backend identifier, used as the default registration name.
    fn id(&self) -> &str;

    /// Check if the provider is initialized and ready.
    ///
    /// Registering a provider that reports `false` is a fatal error.
    fn is_configured(&self) -> bool {
        true
    }

    /// Create a new session with the given id.
    fn session_init(&self, id: &SessionId) -> Result<SessionRef>;

    /// Look up an existing session.
    ///
    /// Unknown or expired ids fail with `Error::NotFound` unless the backend
    /// documents a different policy.
    fn session_read(&self, id: &SessionId) -> Result<SessionRef>;

    /// Destroy a session and its data.
    fn session_destroy(&self, id: &SessionId) -> Result<()>;

    /// Remove sessions idle for longer than `max_lifetime`.
    fn session_gc(&self, max_lifetime: Duration);
}
