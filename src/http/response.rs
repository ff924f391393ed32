//! Response metadata reported by a finished operation.

use http::header::LOCATION;
use http::{HeaderMap, StatusCode};
use url::Url;

/// Metadata carried by an operation's terminal `Finished` event.
///
/// `url` is the resolved URL of the hop that produced the response, which
/// is also the base against which a relative redirect target is resolved.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    /// Response status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Resolved URL of the operation that produced this response.
    pub url: Url,
}

impl ResponseMeta {
    /// Create response metadata.
    pub fn new(status: StatusCode, headers: HeaderMap, url: Url) -> Self {
        Self {
            status,
            headers,
            url,
        }
    }

    /// The redirect target of this response, if it carries one.
    ///
    /// Requires a 3xx status and a parseable `Location` header. Relative
    /// targets are resolved against the response URL.
    #[must_use]
    pub fn redirect_target(&self) -> Option<Url> {
        if !self.status.is_redirection() {
            return None;
        }

        let location = self.headers.get(LOCATION)?.to_str().ok()?;
        self.url.join(location).ok()
    }
}
