//! HTTP request type and cache-load policy.
//!
//! [`HttpRequest`] is the canonical request representation handed to the
//! transport. It deliberately keeps the cache-load policy as a first-class
//! attribute so the augmentation layer can distinguish "the caller never
//! touched it" from "the caller explicitly asked for this".

use bytes::Bytes;
use http::{HeaderMap, Method};
use url::Url;

/// How an individual request interacts with the response cache.
///
/// `Default` means the caller expressed no preference; the augmentation
/// layer rewrites it to `PreferCache` before dispatch. Every other variant
/// is an explicit caller choice and is never overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// No explicit preference; tightened to `PreferCache` before dispatch.
    #[default]
    Default,
    /// Always load from the network, never touching the cache.
    AlwaysNetwork,
    /// Load from the network, falling back to the cache on failure.
    PreferNetwork,
    /// Serve from the cache when the entry is valid, else fetch.
    PreferCache,
    /// Only serve from the cache, erroring on a miss.
    AlwaysCache,
}

/// An outgoing HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
    cache_policy: CachePolicy,
}

impl HttpRequest {
    /// Create a request with the given method and URL.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            cache_policy: CachePolicy::Default,
        }
    }

    /// Convenience constructor for a GET request.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Convenience constructor for a POST request with a body.
    pub fn post(url: Url, body: impl Into<Bytes>) -> Self {
        let mut request = Self::new(Method::POST, url);
        request.body = Some(body.into());
        request
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the request headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Replace the request body.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = Some(body.into());
    }

    /// The cache-load policy attached to this request.
    pub fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    /// Set the cache-load policy explicitly.
    pub fn set_cache_policy(&mut self, policy: CachePolicy) {
        self.cache_policy = policy;
    }

    /// A copy of this request with only the URL replaced. Headers, method,
    /// body and cache policy are preserved; used when re-issuing a request
    /// at a redirect target.
    #[must_use]
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = url;
        self
    }
}
