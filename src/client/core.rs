//! Client composition: augmentation, dispatch, deadline enforcement and
//! redirect following over a pluggable transport.

use std::sync::Arc;

use http::{HeaderMap, StatusCode};

use crate::cache::SharedResponseCache;
use crate::config::ClientConfig;
use crate::error::{HttpError, Result};
use crate::http::{HttpRequest, ResponseMeta};
use crate::middleware::{MiddlewareChain, RequestAugmenter};
use crate::redirect::RedirectFollower;
use crate::timeout::TimeoutSupervisor;
use crate::transport::{Operation, Transport};

/// The dispatch pipeline: middleware rewrite, transport start, timeout
/// registration. Implements [`Transport`] so a redirect follower re-enters
/// the full pipeline for every hop.
struct Pipeline {
    transport: Arc<dyn Transport>,
    middleware: MiddlewareChain,
    timeouts: Arc<TimeoutSupervisor>,
}

impl Pipeline {
    /// An operation that was rejected before reaching the transport. The
    /// failure travels the normal per-operation event surface.
    fn rejected(request: HttpRequest, error: HttpError) -> Operation {
        let url = request.url().clone();
        tracing::warn!(
            target: "reqguard::client",
            url = %url,
            error = %error,
            "request rejected before dispatch"
        );
        let (controller, operation) = Operation::channel(request);
        controller.send_error(error);
        controller.finish(ResponseMeta::new(
            StatusCode::BAD_REQUEST,
            HeaderMap::new(),
            url,
        ));
        operation
    }
}

impl Transport for Pipeline {
    fn start(&self, request: HttpRequest) -> Operation {
        let original = request.clone();
        let request = match self.middleware.process_request(request) {
            Ok(request) => request,
            Err(error) => return Self::rejected(original, error),
        };

        let operation = self.transport.start(request);
        self.timeouts.register(&operation);
        operation
    }
}

/// Issues requests through a transport with augmentation, per-request
/// deadlines, bounded redirect following and a process-wide response
/// cache.
pub struct NetworkClient {
    pipeline: Arc<Pipeline>,
    cache: SharedResponseCache,
    max_redirects: u32,
}

impl NetworkClient {
    /// Build a client over `transport`.
    ///
    /// Initializes the process-wide response cache for the configured
    /// directory if this is the first client in the process.
    ///
    /// # Errors
    ///
    /// Returns a builder error when the configuration is invalid, or a
    /// cache error when the cache directory cannot be created.
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate().map_err(HttpError::Builder)?;

        let cache = SharedResponseCache::new(&config.cache_dir)?;
        let augmenter = RequestAugmenter::new(&config.app_name, &config.app_version)?;
        let pipeline = Arc::new(Pipeline {
            transport,
            middleware: MiddlewareChain::new().add(augmenter),
            timeouts: Arc::new(TimeoutSupervisor::new(config.request_timeout)),
        });

        Ok(Self {
            pipeline,
            cache,
            max_redirects: config.max_redirects,
        })
    }

    /// Issue a single request: augmented, dispatched, deadline-watched.
    pub fn request(&self, request: HttpRequest) -> Operation {
        self.pipeline.start(request)
    }

    /// Issue a request and transparently follow redirects, up to the
    /// configured budget. The returned operation aggregates the whole
    /// chain: one event surface, exactly one terminal finished event.
    pub fn request_following_redirects(&self, request: HttpRequest) -> Operation {
        let first = self.pipeline.start(request);
        let issuer: Arc<dyn Transport> = Arc::clone(&self.pipeline) as Arc<dyn Transport>;
        RedirectFollower::spawn(first, self.max_redirects, issuer)
    }

    /// The process-wide response cache.
    pub fn cache(&self) -> &SharedResponseCache {
        &self.cache
    }

    /// Number of operations currently watched for timeout.
    pub fn watched_operations(&self) -> usize {
        self.pipeline.timeouts.watched()
    }
}
