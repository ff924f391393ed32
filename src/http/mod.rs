//! HTTP request and response model shared by every component in the layer.

mod request;
mod response;

pub use request::{CachePolicy, HttpRequest};
pub use response::ResponseMeta;
