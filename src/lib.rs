//! # reqguard
//!
//! A resilient HTTP request layer for client applications, sitting above
//! an asynchronous transport primitive with start/abort/event semantics.
//!
//! ## Components
//!
//! - **[`SharedResponseCache`]**: a mutual-exclusion wrapper around the
//!   single process-wide disk-backed response cache, safe for concurrent
//!   access from any thread.
//! - **[`RequestAugmenter`]**: rewrites every outgoing request before
//!   dispatch with the identification header, a content-type default for
//!   submissions and the prefer-cache policy default.
//! - **[`TimeoutSupervisor`]**: aborts any in-flight operation that
//!   exceeds a configured deadline.
//! - **[`RedirectFollower`]**: follows redirect chains up to a bound
//!   while re-exposing the chain as a single operation with one event
//!   surface and exactly one terminal finished event.
//!
//! [`NetworkClient`] composes all four over a [`Transport`]
//! implementation.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use reqguard::prelude::*;
//! use url::Url;
//!
//! # async fn example(transport: Arc<dyn Transport>) -> Result<()> {
//! let client = NetworkClient::new(ClientConfig::default(), transport)?;
//! let url = Url::parse("http://example.com/feed").expect("static URL");
//!
//! let mut operation = client.request_following_redirects(HttpRequest::get(url));
//! while let Some(event) = operation.next_event().await {
//!     match event {
//!         OperationEvent::Data(chunk) => println!("{} bytes", chunk.len()),
//!         OperationEvent::Finished(meta) => {
//!             println!("done: {}", meta.status);
//!             break;
//!         }
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod redirect;
pub mod timeout;
pub mod transport;

pub mod prelude;

pub use crate::cache::SharedResponseCache;
pub use crate::client::NetworkClient;
pub use crate::config::ClientConfig;
pub use crate::error::{HttpError, Result};
pub use crate::http::{CachePolicy, HttpRequest, ResponseMeta};
pub use crate::middleware::RequestAugmenter;
pub use crate::redirect::RedirectFollower;
pub use crate::timeout::TimeoutSupervisor;
pub use crate::transport::{Operation, OperationEvent, Transport};
