//! Shared error and result types.

pub mod error;
pub mod result;

pub use error::MetapinError;
pub use result::{MetapinResult, OptionExt};
