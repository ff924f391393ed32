//! Redirect handling.
//!
//! A [`RedirectFollower`] presents a multi-hop redirect chain to the
//! caller as a single operation: one data stream, one progress stream, one
//! error stream, and exactly one terminal finished event. Each hop is
//! re-issued through the same issuer that produced the first, so request
//! augmentation and timeout supervision apply to every hop.

mod follower;

pub use follower::RedirectFollower;
