//! Header token transport for API clients.

use http::{HeaderMap, HeaderName, HeaderValue};
use sessionkit_core::id::unescape;
use sessionkit_core::{Error, Result, SessionId};

/// Default header carrying the session token in both directions.
pub const SESSION_TOKEN: HeaderName = HeaderName::from_static("x-session-token");

/// Read and unescape the token, `None` when the header is missing or empty.
pub fn read_token(headers: &HeaderMap, header: &HeaderName) -> Result<Option<SessionId>> {
    let Some(raw) = headers.get(header) else {
        return Ok(None);
    };
    let raw = raw
        .to_str()
        .map_err(|e| Error::InvalidIdentifier(e.to_string()))?;
    let token = unescape(raw)?;
    if token.is_empty() {
        Ok(None)
    } else {
        Ok(Some(SessionId::from_raw(token)))
    }
}

/// Set the escaped token on the response, replacing any previous value.
pub fn write_token(headers: &mut HeaderMap, header: &HeaderName, id: &SessionId) -> Result<()> {
    let value = HeaderValue::from_str(&id.escaped())
        .map_err(|e| Error::InvalidIdentifier(e.to_string()))?;
    headers.insert(header.clone(), value);
    Ok(())
}
