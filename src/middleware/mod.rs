//! Request middleware applied before dispatch.

use std::sync::Arc;

use crate::error::Result;
use crate::http::HttpRequest;

mod augment;

pub use augment::RequestAugmenter;

/// A pure request transformation applied before a request reaches the
/// transport.
pub trait Middleware: Send + Sync {
    /// Rewrite a request before it is dispatched.
    fn process_request(&self, request: HttpRequest) -> Result<HttpRequest> {
        Ok(request)
    }
}

/// Middleware chain for sequential processing.
#[derive(Default, Clone)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Run every middleware over `request` in insertion order.
    pub fn process_request(&self, mut request: HttpRequest) -> Result<HttpRequest> {
        for middleware in &self.middlewares {
            request = middleware.process_request(request)?;
        }
        Ok(request)
    }
}
