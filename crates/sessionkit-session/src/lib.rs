//! # sessionkit-session
//!
//! Session lifecycle management for Sessionkit.
//!
//! This crate provides:
//! - The `Manager`: one provider, one mutex, two transport bindings
//! - Cookie transport for browsers
//! - `X-Session-Token` header transport for API clients
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use sessionkit_session::Manager;
//!
//! // Backends register themselves at startup
//! sessionkit_providers::register("memory", Arc::new(MemoryProvider::new()));
//!
//! let manager = Manager::with_global("memory", "sessionid", Duration::from_secs(3600))?;
//!
//! // Browser request
//! let session = manager.session_start(request.headers(), response.headers_mut())?;
//! session.set("user", json!("alice"))?;
//!
//! // API request; new tokens must be echoed back explicitly
//! let session = manager.api_session_start(request.headers())?;
//! manager.write_token(response.headers_mut(), session.as_ref())?;
//! ```
//!
//! Every operation returns a `Result`. Callers that prefer to treat provider
//! failures as "no session" can call `.ok()` on it.

pub mod cookies;
pub mod manager;
pub mod token;

pub use cookies::CookieSettings;
pub use manager::Manager;
pub use token::SESSION_TOKEN;
