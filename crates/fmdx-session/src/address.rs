//! Server address normalization.
//!
//! Users type whatever they copied: a bare host, an `http(s)://` URL or the
//! `ws(s)://` form the tuner's web UI shows.  Everything is reduced to one
//! canonical `http`/`https` endpoint so it can be persisted and compared.

use url::Url;

use crate::error::{Result, SessionError};

/// Normalize a user-supplied server address.
///
/// `ws`/`wss` map to `http`/`https`, a missing scheme defaults to `http`, and
/// a root-only path (`/`) is dropped.  Idempotent.
pub fn normalize(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SessionError::InvalidInput("Server URL is required".into()));
    }

    let with_scheme = match scheme_split(trimmed) {
        Some(("http", _)) | Some(("https", _)) => trimmed.to_string(),
        Some(("ws", rest)) => format!("http://{}", rest),
        Some(("wss", rest)) => format!("https://{}", rest),
        _ => format!("http://{}", trimmed),
    };

    let url = Url::parse(&with_scheme)
        .map_err(|_| SessionError::InvalidInput("Invalid server URL".into()))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(SessionError::InvalidInput("Invalid server URL".into()));
    }

    let rendered = url.to_string();
    let root_only = url.path() == "/" && url.query().is_none() && url.fragment().is_none();
    Ok(match rendered.strip_suffix('/') {
        Some(stripped) if root_only => stripped.to_string(),
        _ => rendered,
    })
}

/// Split `scheme://rest`, lowercasing the scheme.  Only the four schemes we
/// understand are recognised; anything else is treated as scheme-less.
fn scheme_split(input: &str) -> Option<(&'static str, &str)> {
    let (scheme, rest) = input.split_once("://")?;
    let scheme = match scheme.to_ascii_lowercase().as_str() {
        "http" => "http",
        "https" => "https",
        "ws" => "ws",
        "wss" => "wss",
        _ => return None,
    };
    Some((scheme, rest))
}
