//! Configuration system for Sessionkit.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Error;

/// Default request/response header carrying API session tokens.
pub const DEFAULT_TOKEN_HEADER: &str = "X-Session-Token";

/// Default config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "sessionkit.toml";

/// Manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Registered provider name
    pub provider: String,
    /// Cookie name for the browser transport
    pub cookie_name: String,
    /// Maximum session lifetime in seconds (cookie max-age and GC threshold)
    pub max_lifetime_secs: u64,
    /// Header carrying API session tokens
    pub token_header: String,
    /// Cookie attributes
    pub cookie: CookieConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            provider: "memory".to_string(),
            cookie_name: "sessionid".to_string(),
            max_lifetime_secs: 3600,
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            cookie: CookieConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Cookie path
    pub path: String,
    /// Cookie domain
    pub domain: Option<String>,
    /// Send only over HTTPS
    pub secure: bool,
    /// Hide from client-side scripts
    pub http_only: bool,
    /// SameSite policy: strict, lax, none
    pub same_site: Option<String>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: true,
            same_site: None,
        }
    }
}

/// Validation result with multiple issues.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Check if validation passed (no errors).
    pub fn is_ok(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == IssueSeverity::Error)
    }

    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error)
            .collect()
    }

    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .collect()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            severity: IssueSeverity::Error,
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            severity: IssueSeverity::Warning,
            field: field.into(),
            message: message.into(),
        });
    }
}

/// A single validation issue.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    /// Field path (e.g., "cookie.same_site")
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// Warnings don't prevent loading
    Warning,
    /// Errors prevent loading
    Error,
}

impl SessionConfig {
    /// Load configuration from defaults, `sessionkit.toml` and `SESSIONKIT_*` env vars.
    ///
    /// Nested keys use a double underscore: `SESSIONKIT_COOKIE__SECURE=true`.
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration using an explicit file path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(SessionConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SESSIONKIT_").split("__"))
            .extract()
    }

    /// Load and validate configuration.
    pub fn load_validated() -> Result<Self, Error> {
        let config = Self::load().map_err(|e| Error::Config(e.to_string()))?;
        config.into_validated()
    }

    /// Validate an already loaded configuration, logging warnings.
    pub fn into_validated(self) -> Result<Self, Error> {
        let result = self.validate();

        if !result.is_ok() {
            let errors: Vec<String> = result
                .errors()
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            return Err(Error::Config(format!(
                "Configuration validation failed:\n  {}",
                errors.join("\n  ")
            )));
        }

        for warning in result.warnings() {
            tracing::warn!("Config warning - {}: {}", warning.field, warning.message);
        }

        Ok(self)
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        if self.provider.is_empty() {
            result.add_error("provider", "Provider name cannot be empty");
        }

        if self.cookie_name.is_empty() {
            result.add_error("cookie_name", "Cookie name cannot be empty");
        } else if self
            .cookie_name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "()<>@,;:\\\"/[]?={}".contains(c))
        {
            result.add_error(
                "cookie_name",
                format!("Cookie name '{}' contains reserved characters", self.cookie_name),
            );
        }

        if self.max_lifetime_secs == 0 {
            result.add_error("max_lifetime_secs", "max_lifetime_secs must be greater than 0");
        } else if self.max_lifetime_secs > i64::MAX as u64 {
            result.add_error(
                "max_lifetime_secs",
                "max_lifetime_secs does not fit a cookie max-age",
            );
        }

        if http::HeaderName::from_bytes(self.token_header.as_bytes()).is_err() {
            result.add_error(
                "token_header",
                format!("Invalid header name '{}'", self.token_header),
            );
        }

        if !self.cookie.path.starts_with('/') {
            result.add_error("cookie.path", "Cookie path must start with '/'");
        }

        if let Some(ref same_site) = self.cookie.same_site {
            let valid = ["strict", "lax", "none"];
            if !valid.contains(&same_site.to_ascii_lowercase().as_str()) {
                result.add_error(
                    "cookie.same_site",
                    format!("Invalid SameSite policy '{}'. Valid values: {:?}", same_site, valid),
                );
            } else if same_site.eq_ignore_ascii_case("none") && !self.cookie.secure {
                result.add_warning(
                    "cookie.same_site",
                    "SameSite=None cookies are rejected by browsers unless secure = true",
                );
            }
        }

        if !self.cookie.http_only {
            result.add_warning("cookie.http_only", "Session cookie is readable from scripts");
        }

        if !self.cookie.secure {
            result.add_warning("cookie.secure", "Session cookie is sent over plain HTTP");
        }

        result
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}
