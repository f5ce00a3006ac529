//! Session manager.
//!
//! The manager owns no session data. It resolves one provider at
//! construction and mediates every lifecycle call through two transport
//! bindings: cookies for browsers and the `X-Session-Token` header for API
//! clients. Both bindings share the provider, the identifier generator and a
//! single mutex, so every lifecycle operation on one manager is serialized.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, HeaderName};
use parking_lot::Mutex;
use sessionkit_core::id::unescape;
use sessionkit_core::{
    Error, IdGenerator, OsRngGenerator, Result, Session, SessionConfig, SessionId, SessionRef,
};
use sessionkit_providers::{global, Provider, ProviderRegistry};
use tracing::{debug, error, info, warn};

use crate::cookies::{append_set_cookie, read_cookie, CookieSettings};
use crate::token::{self, SESSION_TOKEN};

/// Thread-safe coordinator of session lifecycles.
pub struct Manager {
    provider_name: String,
    provider: Arc<dyn Provider>,
    cookie: CookieSettings,
    max_lifetime: Duration,
    token_header: HeaderName,
    ids: Arc<dyn IdGenerator>,
    lock: Mutex<()>,
}

impl Manager {
    /// Create a manager bound to a registered provider.
    ///
    /// Resolving the provider seals `registry`: nothing can be registered
    /// into it afterwards.
    pub fn new(
        registry: &ProviderRegistry,
        provider_name: &str,
        cookie_name: impl Into<String>,
        max_lifetime: Duration,
    ) -> Result<Self> {
        let cookie = CookieSettings::new(cookie_name);
        Self::build(registry, provider_name, cookie, max_lifetime, SESSION_TOKEN)
    }

    /// Create a manager from a loaded configuration.
    pub fn from_config(registry: &ProviderRegistry, config: &SessionConfig) -> Result<Self> {
        let config = config.clone().into_validated()?;
        let cookie = CookieSettings::from_config(config.cookie_name.clone(), &config.cookie)?;
        let token_header = HeaderName::from_bytes(config.token_header.as_bytes())
            .map_err(|e| Error::Config(format!("token_header: {}", e)))?;
        Self::build(
            registry,
            &config.provider,
            cookie,
            config.max_lifetime(),
            token_header,
        )
    }

    /// Create a manager bound to a provider in the process-wide registry.
    pub fn with_global(
        provider_name: &str,
        cookie_name: impl Into<String>,
        max_lifetime: Duration,
    ) -> Result<Self> {
        let registry = global().read();
        Self::new(&registry, provider_name, cookie_name, max_lifetime)
    }

    fn build(
        registry: &ProviderRegistry,
        provider_name: &str,
        cookie: CookieSettings,
        max_lifetime: Duration,
        token_header: HeaderName,
    ) -> Result<Self> {
        info!(provider = %provider_name, cookie = %cookie.name(), "New session manager");
        let provider = registry.lookup(provider_name)?;
        registry.seal();

        Ok(Self {
            provider_name: provider_name.to_string(),
            provider,
            cookie,
            max_lifetime,
            token_header,
            ids: Arc::new(OsRngGenerator),
            lock: Mutex::new(()),
        })
    }

    /// Replace the identifier generator.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Start or resume a browser session.
    ///
    /// Without a session cookie a new identifier is generated and a
    /// `Set-Cookie` header carrying it is appended to `response`. The cookie
    /// is written even when the provider fails to initialize the session; the
    /// provider error is returned alongside it. An identifier that cannot be
    /// generated writes nothing. With a cookie, the session it names is read
    /// back from the provider.
    pub fn session_start(
        &self,
        request: &HeaderMap,
        response: &mut HeaderMap,
    ) -> Result<SessionRef> {
        let _guard = self.lock.lock();

        match read_cookie(request, self.cookie.name()) {
            None => {
                debug!(
                    cookie = %self.cookie.name(),
                    "No session id in request cookie, creating one"
                );
                let id = self.new_id_locked()?;
                let session = self.init_locked(&id);
                append_set_cookie(response, &self.cookie.issue(&id, self.max_lifetime))?;
                session
            }
            Some(raw) => {
                let id = SessionId::from_raw(unescape(&raw)?);
                debug!(
                    session_id = %id,
                    cookie = %self.cookie.name(),
                    "Session id found in request cookie"
                );
                self.read_locked(&id)
            }
        }
    }

    /// End a browser session.
    ///
    /// The deletion cookie is always written, even when the provider fails
    /// to destroy the session; that failure is logged and returned.
    pub fn session_end(&self, response: &mut HeaderMap, session: &dyn Session) -> Result<()> {
        let _guard = self.lock.lock();
        let id = session.session_id();

        append_set_cookie(response, &self.cookie.expire(id))?;
        self.destroy_locked(id)
    }

    /// Start or resume an API session from the token header.
    ///
    /// A missing or empty token creates a new session. Any other token is
    /// handed to the provider as-is; its read policy decides the outcome.
    pub fn api_session_start(&self, request: &HeaderMap) -> Result<SessionRef> {
        let Some(id) = token::read_token(request, &self.token_header)? else {
            debug!("No session token in request, creating one");
            return self.api_session_create();
        };

        let _guard = self.lock.lock();
        debug!(session_id = %id, "Session token found in request");
        self.read_locked(&id)
    }

    /// Create an API session.
    ///
    /// Nothing is written to any response; use [`Manager::write_token`] to
    /// hand the new token to the client.
    pub fn api_session_create(&self) -> Result<SessionRef> {
        let _guard = self.lock.lock();
        self.create_locked()
    }

    /// End an API session; a destroy failure is logged and returned.
    pub fn api_session_end(&self, session: &dyn Session) -> Result<()> {
        let _guard = self.lock.lock();
        self.destroy_locked(session.session_id())
    }

    /// Echo a session token to the client in the token header.
    pub fn write_token(&self, response: &mut HeaderMap, session: &dyn Session) -> Result<()> {
        token::write_token(response, &self.token_header, session.session_id())
    }

    /// Ask the provider to reap sessions older than the configured lifetime.
    pub fn gc(&self) {
        let _guard = self.lock.lock();
        debug!(
            provider = %self.provider_name,
            max_lifetime_secs = self.max_lifetime.as_secs(),
            "Running session GC"
        );
        self.provider.session_gc(self.max_lifetime);
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn cookie_name(&self) -> &str {
        self.cookie.name()
    }

    pub fn max_lifetime(&self) -> Duration {
        self.max_lifetime
    }

    pub fn token_header(&self) -> &HeaderName {
        &self.token_header
    }

    fn create_locked(&self) -> Result<SessionRef> {
        let id = self.new_id_locked()?;
        self.init_locked(&id)
    }

    fn new_id_locked(&self) -> Result<SessionId> {
        let id = self.ids.generate().map_err(|e| {
            error!(error = %e, "Refusing to start a session without a secure identifier");
            e
        })?;
        debug!(session_id = %id, "New session id created");
        Ok(id)
    }

    fn init_locked(&self, id: &SessionId) -> Result<SessionRef> {
        self.provider.session_init(id).map_err(|e| {
            warn!(session_id = %id, error = %e, "Provider failed to initialize session");
            e
        })
    }

    fn read_locked(&self, id: &SessionId) -> Result<SessionRef> {
        self.provider.session_read(id).map_err(|e| {
            warn!(session_id = %id, error = %e, "Provider failed to read session");
            e
        })
    }

    fn destroy_locked(&self, id: &SessionId) -> Result<()> {
        debug!(session_id = %id, "Destroying session");
        self.provider.session_destroy(id).map_err(|e| {
            error!(session_id = %id, error = %e, "Destroying session failed");
            e
        })
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("provider", &self.provider_name)
            .field("cookie", &self.cookie)
            .field("max_lifetime", &self.max_lifetime)
            .field("token_header", &self.token_header)
            .finish_non_exhaustive()
    }
}
