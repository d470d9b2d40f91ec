//! Convenient re-exports for downstream crates.

pub use crate::config::{ReaderConfig, DEFAULT_READER_SIZE, MIN_READER_SIZE};
pub use crate::error::{Error, Result};
