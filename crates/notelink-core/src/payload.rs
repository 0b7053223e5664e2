//! Payload classification, identifier extraction and deep-link building
//!
//! All functions here are pure: no I/O, no logging side effects beyond trace
//! output, and the same input always yields the same result.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::error::{Error, Result};
use crate::types::{ContentId, DeepLink, LinkShape, PayloadKind, RawPayload, APP_SCHEME};

/// Hosts whose web links can carry a note identifier
pub const WEB_HOSTS: &[&str] = &["xiaohongshu.com", "xhslink.com"];

/// `explore/<24 lowercase hex>` as a whole path segment pair
static EXPLORE_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|/)explore/([0-9a-f]{24})(?:/|$)").expect("Invalid explore segment regex")
});

/// Classify a payload. Never fails; anything unknown is `Unrecognized`.
pub fn classify(payload: &RawPayload) -> PayloadKind {
    let text = payload.text();

    if has_app_scheme(text) {
        return PayloadKind::AppUri;
    }

    match Url::parse(text) {
        Ok(url) if is_web_scheme(&url) && url.host_str().is_some_and(is_known_host) => {
            PayloadKind::WebUrl
        }
        _ => PayloadKind::Unrecognized,
    }
}

/// Case-insensitive `xhsdiscover://` prefix test
fn has_app_scheme(text: &str) -> bool {
    text.get(..APP_SCHEME.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(APP_SCHEME))
        && text[APP_SCHEME.len()..].starts_with("://")
}

fn is_web_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Exact host or any subdomain of a known host
fn is_known_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    WEB_HOSTS.iter().any(|known| {
        host == *known
            || host
                .strip_suffix(known)
                .is_some_and(|rest| rest.ends_with('.'))
    })
}

/// Pull the note identifier out of a web URL's `/explore/<id>` segment.
///
/// Query parameters and fragments are ignored. There is no fallback to other
/// path segments: a link without `explore/<id>` yields `IdentifierNotFound`.
pub fn extract_content_id(payload: &RawPayload) -> Result<ContentId> {
    let url = Url::parse(payload.text())
        .map_err(|_| Error::identifier_not_found(payload.text()))?;

    EXPLORE_SEGMENT
        .captures(url.path())
        .and_then(|caps| caps.get(1))
        .and_then(|m| ContentId::parse(m.as_str()))
        .ok_or_else(|| Error::identifier_not_found(payload.text()))
}

/// Build the deep link for an identifier. Deterministic.
pub fn build_deep_link(id: &ContentId, shape: &LinkShape) -> DeepLink {
    DeepLink::build(id, shape)
}
