//! # sessionkit-core
//!
//! Core types and abstractions for Sessionkit.
//!
//! This crate provides:
//! - Cryptographically random session identifiers and their transport encoding
//! - The `Session` capability trait implemented by storage backends
//! - Configuration system
//! - Common error types

pub mod config;
pub mod error;
pub mod id;
pub mod session;

pub use config::{CookieConfig, SessionConfig, DEFAULT_TOKEN_HEADER};
pub use error::{format_error_with_suggestion, Error, Result};
pub use id::{IdGenerator, OsRngGenerator, SessionId, SESSION_ID_BYTES, SESSION_ID_LEN};
pub use session::{Session, SessionRef, Value};
