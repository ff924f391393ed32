//! Outgoing request normalization.
//!
//! Rewrites every request before dispatch: identification header,
//! content-type default for body-carrying submissions, and the
//! prefer-cache default for requests that expressed no cache preference.

use http::header::{CONTENT_TYPE, USER_AGENT};
use http::{HeaderValue, Method};

use super::Middleware;
use crate::error::{HttpError, Result};
use crate::http::{CachePolicy, HttpRequest};

/// Normalizes outgoing requests with the application identity and the
/// layer's defaults. Pure transformation; safe to apply before every
/// dispatch, including each hop of a redirect chain.
#[derive(Debug, Clone)]
pub struct RequestAugmenter {
    user_agent: HeaderValue,
}

impl RequestAugmenter {
    /// Build an augmenter identifying as `"<app_name> <app_version>"`.
    pub fn new(app_name: &str, app_version: &str) -> Result<Self> {
        let user_agent = HeaderValue::from_str(&format!("{app_name} {app_version}"))
            .map_err(|err| HttpError::builder(format!("invalid application identity: {err}")))?;
        Ok(Self { user_agent })
    }

    fn is_submission(method: &Method) -> bool {
        *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
    }
}

impl Middleware for RequestAugmenter {
    fn process_request(&self, mut request: HttpRequest) -> Result<HttpRequest> {
        request
            .headers_mut()
            .insert(USER_AGENT, self.user_agent.clone());

        if Self::is_submission(request.method())
            && !request.headers().contains_key(CONTENT_TYPE)
        {
            request.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
        }

        // Prefer the cache unless the caller has changed the setting already.
        if request.cache_policy() == CachePolicy::Default {
            request.set_cache_policy(CachePolicy::PreferCache);
        }

        Ok(request)
    }
}
