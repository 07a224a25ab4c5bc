//! Protocol types and errors shared across `burnbox` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
