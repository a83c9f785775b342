//! URL routing and query parsing for the pet resource API.

use crate::RequestError;
use petstore_core::{CatalogError, Status, STATUS_SEPARATOR};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    /// `/pet`
    Collection,
    /// `/pet/{id}`, with the raw, still unparsed id segment.
    Pet(&'a str),
    /// `/pet/findByStatus`, with the raw query string if any.
    FindByStatus(Option<&'a str>),
    /// `/health`
    Health,
}

/// Match a request URL against the known routes.
pub fn parse_route(url: &str) -> Option<Route<'_>> {
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    };
    if path == "/health" {
        return Some(Route::Health);
    }
    let rest = path.strip_prefix("/pet")?;
    match rest {
        "" | "/" => Some(Route::Collection),
        "/findByStatus" => Some(Route::FindByStatus(query)),
        _ => {
            let segment = rest.strip_prefix('/')?;
            if segment.is_empty() || segment.contains('/') {
                None
            } else {
                Some(Route::Pet(segment))
            }
        }
    }
}

/// Parse a path id. Ids must be non-negative 64-bit integers.
pub fn parse_pet_id(raw: &str) -> Result<i64, RequestError> {
    let id: i64 = raw
        .parse()
        .map_err(|_| CatalogError::InvalidArgument(format!("id '{raw}' is not a number")))?;
    if id < 0 {
        return Err(CatalogError::InvalidArgument(format!("id {id} is invalid")).into());
    }
    Ok(id)
}

fn decode_component(raw: &str) -> Result<String, RequestError> {
    let plus_decoded = raw.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(Cow::into_owned)
        .map_err(|e| CatalogError::InvalidArgument(format!("malformed query: {e}")).into())
}

/// Build the store's filter string from the `status` query parameters.
///
/// `status` may repeat and each value may hold a comma-separated list, so
/// `status=available&status=sold` and `status=available,%20sold` both yield
/// `"available, sold"`. Every token must be a known status label.
pub fn status_filter(query: Option<&str>) -> Result<String, RequestError> {
    let mut tokens: Vec<String> = Vec::new();
    for pair in query.unwrap_or("").split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if decode_component(key)? != "status" {
            continue;
        }
        let value = decode_component(value)?;
        for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            token.parse::<Status>()?;
            tokens.push(token.to_owned());
        }
    }
    if tokens.is_empty() {
        return Err(
            CatalogError::InvalidArgument("status query parameter is required".to_owned()).into(),
        );
    }
    Ok(tokens.join(STATUS_SEPARATOR))
}
