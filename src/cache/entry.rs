//! Cache entry metadata with expiry and validation support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::ResponseMeta;

/// Metadata stored alongside a cached response body: the canonical URL,
/// response headers, expiry and the validators usable for conditional
/// revalidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Canonical URL the entry was stored under.
    pub url: String,
    /// Response headers captured at write time.
    pub headers: Vec<(String, String)>,
    /// Expiry as seconds since the Unix epoch, when known.
    pub expires_at: Option<u64>,
    /// `ETag` validator, when the response carried one.
    pub etag: Option<String>,
    /// Raw `Last-Modified` validator, when the response carried one.
    pub last_modified: Option<String>,
}

impl CacheMetadata {
    /// Empty metadata for `url`.
    pub fn new(url: &Url) -> Self {
        Self {
            url: url.as_str().to_string(),
            headers: Vec::new(),
            expires_at: None,
            etag: None,
            last_modified: None,
        }
    }

    /// Build metadata from a finished response, capturing headers,
    /// validators and a `Cache-Control: max-age` expiry when present.
    pub fn from_response(meta: &ResponseMeta) -> Self {
        let headers = meta
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect::<Vec<_>>();

        let header = |wanted: &str| {
            headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
                .map(|(_, value)| value.clone())
        };

        let expires_at = header("cache-control")
            .and_then(|value| Self::parse_max_age(&value))
            .and_then(|max_age| {
                SystemTime::now()
                    .checked_add(Duration::from_secs(max_age))?
                    .duration_since(UNIX_EPOCH)
                    .ok()
            })
            .map(|since_epoch| since_epoch.as_secs());

        Self {
            url: meta.url.as_str().to_string(),
            etag: header("etag"),
            last_modified: header("last-modified"),
            headers,
            expires_at,
        }
    }

    /// Parse the `max-age` value out of a `Cache-Control` header.
    fn parse_max_age(cache_control: &str) -> Option<u64> {
        for directive in cache_control.split(',') {
            let directive = directive.trim();
            if let Some(seconds) = directive.strip_prefix("max-age=") {
                if let Ok(seconds) = seconds.parse::<u64>() {
                    return Some(seconds);
                }
            }
        }
        None
    }

    /// Whether the entry's expiry has passed. Entries without an expiry
    /// never expire on their own.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let Some(expires_at) = self.expires_at else {
            return false;
        };
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(false, |now| now.as_secs() > expires_at)
    }

    /// Whether the entry can be revalidated with a conditional request.
    #[must_use]
    pub fn can_validate(&self) -> bool {
        self.etag.is_some() || self.last_modified.is_some()
    }
}
