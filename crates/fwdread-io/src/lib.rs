#![forbid(unsafe_code)]
//! fwdread-io: byte sources and the forward reader.
//!
//! - `source`: the `Source`/`Forward` capability traits and adapters for
//!   `Read` and `Read + Seek` streams.
//! - `buf`: `ForwardReader`, the look-ahead buffer with skip and bulk copy.

pub mod buf;
pub mod source;

pub use buf::{forward_from_path, ForwardReader};
pub use source::{Forward, Pulled, ReadSource, SeekSource, Source};
