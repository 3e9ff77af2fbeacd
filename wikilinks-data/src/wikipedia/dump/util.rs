//! Helpers shared by the dump operations and sources.

use super::BaseUrl;

/// Public Wikimedia dump mirror.
pub const DEFAULT_BASE_URL: &str = "https://dumps.wikimedia.org";

/// Trim trailing slashes and fall back to the public Wikimedia mirror.
pub(crate) fn sanitise_base_url(url: impl Into<String>) -> BaseUrl {
    let raw = url.into();
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        BaseUrl::from(DEFAULT_BASE_URL)
    } else {
        BaseUrl::new(trimmed)
    }
}
