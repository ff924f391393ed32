//! Canonical types for working with the request layer.

pub use crate::cache::{CacheMetadata, CacheWriteHandle, DiskCacheStore, SharedResponseCache};
pub use crate::client::NetworkClient;
pub use crate::config::ClientConfig;
pub use crate::error::{HttpError, Result};
pub use crate::http::{CachePolicy, HttpRequest, ResponseMeta};
pub use crate::middleware::{Middleware, MiddlewareChain, RequestAugmenter};
pub use crate::redirect::RedirectFollower;
pub use crate::timeout::TimeoutSupervisor;
pub use crate::transport::{
    AbortHandle, CompletionFlag, Operation, OperationController, OperationEvent, OperationId,
    Transport,
};
