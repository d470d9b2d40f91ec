//! Byte sources the reader pulls from.
//!
//! A source only has to produce bytes. Sources that can also move forward
//! without producing them advertise it through [`Source::forward`], which
//! lets `ForwardReader::skip` avoid reading skipped regions.

use std::io::{self, Read, Seek, SeekFrom};

/// Outcome of a single pull.
///
/// Data and end of data may arrive together: `Pulled { count: 3, end: true }`
/// means three bytes were produced and nothing follows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulled {
    pub count: usize,
    pub end: bool,
}

impl Pulled {
    pub fn data(count: usize) -> Self {
        Self { count, end: false }
    }

    pub fn end() -> Self {
        Self { count: 0, end: true }
    }
}

/// Sequential byte producer.
pub trait Source {
    /// Produce up to `buf.len()` bytes into the front of `buf`.
    ///
    /// Blocks until at least one byte, end of data, or a failure is
    /// available. Returning zero bytes without `end` is treated by the reader
    /// as a stalled source.
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Pulled>;

    /// Relative forward positioning, if this source supports it.
    fn forward(&mut self) -> Option<&mut dyn Forward> {
        None
    }
}

/// Capability: move forward without producing the skipped bytes.
pub trait Forward {
    /// Move forward by `n` bytes and return how far the position actually
    /// moved. Less than `n` means the end of data was reached.
    ///
    /// An error means the position did not move; the reader then reads
    /// through the bytes instead.
    fn skip_forward(&mut self, n: u64) -> io::Result<u64>;
}

impl<S: Source + ?Sized> Source for &mut S {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Pulled> {
        (**self).pull(buf)
    }

    fn forward(&mut self) -> Option<&mut dyn Forward> {
        (**self).forward()
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Pulled> {
        (**self).pull(buf)
    }

    fn forward(&mut self) -> Option<&mut dyn Forward> {
        (**self).forward()
    }
}

/// Adapts any [`Read`] as a sequential-only source.
///
/// `Ok(0)` from a non-empty buffer is end of data, per the `Read` contract.
pub struct ReadSource<R: Read> {
    inner: R,
}

impl<R: Read> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Source for ReadSource<R> {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Pulled> {
        read_pull(&mut self.inner, buf)
    }
}

/// Adapts a [`Read`] + [`Seek`] stream; advertises [`Forward`].
///
/// Forward moves are clamped to the end of the stream so a short skip can be
/// detected instead of silently landing past the end. Each move costs three
/// seeks since the end is looked up fresh (the stream may still be growing).
///
/// Streams that refuse to seek (pipes and FIFOs opened as a `File`) stop
/// advertising [`Forward`] after the first failed move, and skips read
/// through the data from then on.
pub struct SeekSource<R: Read + Seek> {
    inner: R,
    seekable: bool,
}

impl<R: Read + Seek> SeekSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            seekable: true,
        }
    }

    /// Whether forward moves are still attempted.
    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Source for SeekSource<R> {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Pulled> {
        read_pull(&mut self.inner, buf)
    }

    fn forward(&mut self) -> Option<&mut dyn Forward> {
        if self.seekable {
            Some(self)
        } else {
            None
        }
    }
}

impl<R: Read + Seek> SeekSource<R> {
    fn seek_forward(&mut self, n: u64) -> io::Result<u64> {
        let start = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        let target = start.saturating_add(n).min(end.max(start));
        if let Err(e) = self.inner.seek(SeekFrom::Start(target)) {
            // Best effort: put the position back where the caller left it.
            let _ = self.inner.seek(SeekFrom::Start(start));
            return Err(e);
        }
        Ok(target - start)
    }
}

impl<R: Read + Seek> Forward for SeekSource<R> {
    fn skip_forward(&mut self, n: u64) -> io::Result<u64> {
        let moved = self.seek_forward(n);
        if moved.is_err() {
            self.seekable = false;
        }
        moved
    }
}

fn read_pull<R: Read>(inner: &mut R, buf: &mut [u8]) -> io::Result<Pulled> {
    if buf.is_empty() {
        return Ok(Pulled::data(0));
    }
    match inner.read(buf)? {
        0 => Ok(Pulled::end()),
        n => Ok(Pulled::data(n)),
    }
}
