#![forbid(unsafe_code)]
//! fwdread-core: error taxonomy and configuration shared by the fwdread crates.
//!
//! No readers live here. `fwdread-io` builds the buffered reader on top of
//! these types.

pub mod config;
pub mod error;
pub mod prelude;

pub use config::ReaderConfig;
pub use error::{Error, Result};
