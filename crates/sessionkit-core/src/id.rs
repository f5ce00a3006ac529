//! Session identifier generation and transport encoding.
//!
//! Identifiers are 32 bytes from the operating system CSPRNG, encoded as
//! URL-safe base64. Collisions are not checked; 256 bits of entropy make them
//! negligible.

use std::fmt;
use std::ops::Deref;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of random bytes behind every identifier.
pub const SESSION_ID_BYTES: usize = 32;

/// Length of the encoded identifier (padded base64 of 32 bytes).
pub const SESSION_ID_LEN: usize = 44;

/// Opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh identifier from the OS random source.
    pub fn generate() -> Result<Self> {
        Self::generate_with(&mut OsRng)
    }

    /// Generate an identifier from the given random source.
    ///
    /// A failing source is reported as [`Error::EntropyUnavailable`]; no
    /// identifier is ever derived from a partially filled buffer.
    pub fn generate_with<R: RngCore + ?Sized>(rng: &mut R) -> Result<Self> {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        rng.try_fill_bytes(&mut bytes)
            .map_err(|e| Error::EntropyUnavailable(e.to_string()))?;
        Ok(Self(URL_SAFE.encode(bytes)))
    }

    /// Wrap an identifier received from a client or a provider.
    ///
    /// No validation happens here: unknown ids are the provider's business.
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Decode the identifier back into its raw bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        URL_SAFE
            .decode(self.0.as_bytes())
            .map_err(|e| Error::InvalidIdentifier(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Query-escaped form, safe for cookie and header values.
    pub fn escaped(&self) -> String {
        escape(&self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for SessionId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

/// Source of new session identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Result<SessionId>;
}

/// Default generator backed by [`OsRng`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngGenerator;

impl IdGenerator for OsRngGenerator {
    fn generate(&self) -> Result<SessionId> {
        SessionId::generate()
    }
}

/// Query-escape a value for transport.
pub fn escape(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Reverse [`escape`].
///
/// Follows query-string rules: a literal `+` decodes to a space, while
/// `%2B` decodes to `+`.
pub fn unescape(value: &str) -> Result<String> {
    urlencoding::decode(&value.replace('+', " "))
        .map(|s| s.into_owned())
        .map_err(|e| Error::InvalidIdentifier(e.to_string()))
}
