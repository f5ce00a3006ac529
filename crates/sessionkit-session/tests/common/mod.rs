//! Shared provider doubles for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use sessionkit_core::{Error, IdGenerator, Result, Session, SessionId, SessionRef, Value};
use sessionkit_providers::{Provider, ProviderRegistry};
use sessionkit_session::Manager;

/// Session kept entirely in memory.
#[derive(Debug)]
pub struct MemorySession {
    id: SessionId,
    values: RwLock<HashMap<String, Value>>,
    last_access: Mutex<DateTime<Utc>>,
}

impl MemorySession {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            values: RwLock::new(HashMap::new()),
            last_access: Mutex::new(Utc::now()),
        }
    }

    fn touch(&self) {
        *self.last_access.lock() = Utc::now();
    }
}

impl Session for MemorySession {
    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values.write().insert(key.to_string(), value);
        self.touch();
        Ok(())
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.touch();
        self.values.read().get(key).cloned()
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        self.touch();
        Ok(())
    }

    fn session_id(&self) -> &SessionId {
        &self.id
    }
}

/// In-memory provider; unknown ids fail with `Error::NotFound`.
#[derive(Default)]
pub struct MemoryProvider {
    sessions: RwLock<HashMap<SessionId, Arc<MemorySession>>>,
    gc_calls: Mutex<Vec<Duration>>,
    fail_init: bool,
    fail_destroy: bool,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that cannot initialize any session.
    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }

    /// A provider whose destroy always fails.
    pub fn failing_destroy() -> Self {
        Self {
            fail_destroy: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().contains_key(id)
    }

    /// Pretend the session was last used `secs` seconds ago.
    pub fn backdate(&self, id: &SessionId, secs: i64) {
        if let Some(session) = self.sessions.read().get(id) {
            *session.last_access.lock() = Utc::now() - chrono::Duration::seconds(secs);
        }
    }

    pub fn gc_calls(&self) -> Vec<Duration> {
        self.gc_calls.lock().clone()
    }
}

impl Provider for MemoryProvider {
    fn id(&self) -> &str {
        "memory"
    }

    fn session_init(&self, id: &SessionId) -> Result<SessionRef> {
        if self.fail_init {
            return Err(Error::provider(
                "memory",
                std::io::Error::other("backend offline"),
            ));
        }
        let session = Arc::new(MemorySession::new(id.clone()));
        self.sessions.write().insert(id.clone(), session.clone());
        Ok(session)
    }

    fn session_read(&self, id: &SessionId) -> Result<SessionRef> {
        match self.sessions.read().get(id) {
            Some(session) => {
                session.touch();
                Ok(session.clone() as SessionRef)
            }
            None => Err(Error::NotFound(id.to_string())),
        }
    }

    fn session_destroy(&self, id: &SessionId) -> Result<()> {
        if self.fail_destroy {
            return Err(Error::provider(
                "memory",
                std::io::Error::other("backend offline"),
            ));
        }
        self.sessions.write().remove(id);
        Ok(())
    }

    fn session_gc(&self, max_lifetime: Duration) {
        self.gc_calls.lock().push(max_lifetime);
        let Ok(lifetime) = chrono::Duration::from_std(max_lifetime) else {
            return;
        };
        let Some(cutoff) = Utc::now().checked_sub_signed(lifetime) else {
            return;
        };
        self.sessions
            .write()
            .retain(|_, session| *session.last_access.lock() > cutoff);
    }
}

/// Generator whose entropy source is gone.
pub struct BrokenIdGenerator;

impl IdGenerator for BrokenIdGenerator {
    fn generate(&self) -> Result<SessionId> {
        Err(Error::EntropyUnavailable("random source closed".to_string()))
    }
}

/// Generator counting how often it was asked for an id.
#[derive(Default)]
pub struct CountingIdGenerator {
    pub calls: AtomicUsize,
}

impl IdGenerator for CountingIdGenerator {
    fn generate(&self) -> Result<SessionId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        SessionId::generate()
    }
}

pub const COOKIE: &str = "sessionid";
pub const LIFETIME: Duration = Duration::from_secs(3600);

/// Registry with `provider` registered as "memory", plus a manager over it.
pub fn manager_with(provider: Arc<MemoryProvider>) -> Manager {
    let mut registry = ProviderRegistry::new();
    registry.register("memory", provider);
    Manager::new(&registry, "memory", COOKIE, LIFETIME).expect("memory provider is registered")
}
