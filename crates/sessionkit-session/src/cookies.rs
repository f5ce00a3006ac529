//! Cookie transport for browser sessions.

use std::time::Duration;

use cookie::time::Duration as CookieDuration;
use cookie::{Cookie, SameSite};
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};
use sessionkit_core::{CookieConfig, Error, Result, SessionId};

/// Attributes of the session cookie.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    name: String,
    path: String,
    domain: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl CookieSettings {
    /// `Path=/` and `HttpOnly`, nothing else.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: true,
            same_site: None,
        }
    }

    pub fn from_config(name: impl Into<String>, config: &CookieConfig) -> Result<Self> {
        let same_site = config
            .same_site
            .as_deref()
            .map(parse_same_site)
            .transpose()?;

        Ok(Self {
            name: name.into(),
            path: config.path.clone(),
            domain: config.domain.clone(),
            secure: config.secure,
            http_only: config.http_only,
            same_site,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie carrying a freshly created session.
    pub fn issue(&self, id: &SessionId, max_lifetime: Duration) -> Cookie<'static> {
        let max_age = i64::try_from(max_lifetime.as_secs()).unwrap_or(i64::MAX);
        self.build(id, CookieDuration::seconds(max_age))
    }

    /// Cookie instructing the client to drop the session immediately.
    pub fn expire(&self, id: &SessionId) -> Cookie<'static> {
        self.build(id, CookieDuration::seconds(-1))
    }

    fn build(&self, id: &SessionId, max_age: CookieDuration) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name.clone(), id.escaped()))
            .path(self.path.clone())
            .http_only(self.http_only)
            .secure(self.secure)
            .max_age(max_age);

        if let Some(ref domain) = self.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(same_site) = self.same_site {
            builder = builder.same_site(same_site);
        }

        builder.build()
    }
}

fn parse_same_site(value: &str) -> Result<SameSite> {
    match value.to_ascii_lowercase().as_str() {
        "strict" => Ok(SameSite::Strict),
        "lax" => Ok(SameSite::Lax),
        "none" => Ok(SameSite::None),
        other => Err(Error::Config(format!("Invalid SameSite policy '{}'", other))),
    }
}

/// Raw (still escaped) value of the first cookie called `name`.
///
/// An empty value counts as absent.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| Cookie::split_parse(header))
        .filter_map(|parsed| parsed.ok())
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Append a `Set-Cookie` header to the response.
pub fn append_set_cookie(headers: &mut HeaderMap, cookie: &Cookie<'_>) -> Result<()> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| Error::InvalidIdentifier(e.to_string()))?;
    headers.append(SET_COOKIE, value);
    Ok(())
}
