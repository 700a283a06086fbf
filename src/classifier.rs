//! URL validation and source classification.
//!
//! Classification is a substring heuristic: any valid URL whose text contains
//! [`VIDEO_PLATFORM_MARKER`] is treated as a video page. A website that merely
//! mentions the marker in its path (`https://example.com/youtube.com-tips`) is
//! misclassified, and `youtu.be` short links are treated as websites.

use crate::{SourceKind, SummaryError};
use tracing::debug;
use url::Url;

pub const VIDEO_PLATFORM_MARKER: &str = "youtube.com";

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

/// Parses `url` and checks that it is an absolute http(s) URL with a host.
pub fn validate(url: &str) -> Result<Url, SummaryError> {
    let url = url.trim();
    let parsed =
        Url::parse(url).map_err(|e| SummaryError::InvalidUrl(format!("{url:?}: {e}")))?;

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(SummaryError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(SummaryError::InvalidUrl(format!("{url:?}: no host in URL"))),
    }
}

/// Validates `url` and decides which loader handles it.
pub fn classify(url: &str) -> Result<SourceKind, SummaryError> {
    validate(url)?;

    let kind = if is_video_platform_url(url) {
        SourceKind::VideoPlatform
    } else {
        SourceKind::GenericWebsite
    };
    debug!(url = %url, ?kind, "Classified URL");
    Ok(kind)
}

fn is_video_platform_url(url: &str) -> bool {
    url.contains(VIDEO_PLATFORM_MARKER)
}
