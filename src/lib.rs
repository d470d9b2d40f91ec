//! fwdread: a forward-only buffered reader with look-ahead, cheap skipping,
//! and bulk copy.
//!
//! ```
//! use fwdread::ForwardReader;
//!
//! let mut rd = ForwardReader::from_read(&b"GIF89a...."[..], 64);
//! assert_eq!(rd.peek(3).unwrap(), b"GIF");
//! assert_eq!(rd.skip(6).unwrap(), 6);
//! assert_eq!(rd.input_offset(), 6);
//! ```

pub use fwdread_core::prelude::*;
pub use fwdread_core::{config, error};
pub use fwdread_io::{buf, source};
pub use fwdread_io::{
    forward_from_path, Forward, ForwardReader, Pulled, ReadSource, SeekSource, Source,
};
