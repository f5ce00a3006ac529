//! # sessionkit-providers
//!
//! Pluggable storage abstraction for Sessionkit.
//!
//! This crate provides:
//! - The `Provider` trait every session backend implements
//! - An injectable `ProviderRegistry` keyed by backend name
//! - A process-wide registry for backends that self-register at startup
//!
//! Concrete backends live outside this crate.

pub mod registry;
pub mod traits;

pub use registry::{global, register, ProviderRegistry};
pub use traits::Provider;
