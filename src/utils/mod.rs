//! Utility functions and helpers.

pub mod http;
pub mod text;

use url::Url;

use crate::error::Result;

/// Join an API path onto a base URL.
///
/// A leading slash on `path` is relative to the host root, so
/// `("https://host/app", "/api/x")` resolves to `https://host/api/x`.
pub fn endpoint(base_url: &str, path: &str) -> Result<Url> {
    let base = Url::parse(base_url)?;
    Ok(base.join(path)?)
}

/// Build an "Apply" link for a listing.
///
/// The credential is attached as `access_token` only when one was obtained;
/// without it the link still points at the listing.
pub fn apply_link(apply_url: &str, listing_id: &str, token: Option<&str>) -> Result<String> {
    let mut url = Url::parse(apply_url)?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("advancedSearch", "1");
        pairs.append_pair("id", listing_id);
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            pairs.append_pair("access_token", token);
        }
    }
    Ok(url.to_string())
}
