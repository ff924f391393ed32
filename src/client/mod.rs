//! The augmented client facade.

mod core;

pub use core::NetworkClient;
