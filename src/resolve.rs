//! URL resolution and validation for reference items

use crate::schema::Item;
use regex::Regex;
use tracing::debug;

/// Resolver prefix for DOIs
pub const DOI_RESOLVER: &str = "https://doi.org/";

/// Derive the URL to preserve from an item.
///
/// A non-empty DOI always wins over the URL field, whatever either contains.
pub fn resolve_url(item: &Item) -> String {
    debug!(url = %item.url, doi = %item.doi, "resolving item URL");

    let url = if item.doi.is_empty() {
        item.url.clone()
    } else {
        format!("{}{}", DOI_RESOLVER, item.doi)
    };

    debug!(%url, "using url");
    url
}

/// Syntactic HTTP/HTTPS check. No network access.
pub fn is_valid_url(url: &str) -> bool {
    Regex::new(r"^https?://.+")
        .map(|re| re.is_match(url))
        .unwrap_or(false)
}

/// URIR mode is forced for DOI targets or when the preference says "yes"
pub fn forces_urir(url: &str, always_urir: Option<&str>) -> bool {
    url.contains("doi.org") || always_urir == Some("yes")
}
