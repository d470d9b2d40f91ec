//! Forward-only buffered reader with look-ahead.
//!
//! The buffer is one contiguous allocation split into three regions:
//!
//! ```text
//! [ consumed: 0..pos ][ pending: pos..filled ][ free: filled..capacity ]
//! ```
//!
//! Every fill first slides the pending region down to offset 0 and then
//! issues exactly one pull into the free region. Failures reported by the
//! source are parked in a single sticky slot and handed to exactly one caller.

use std::fs::File;
use std::io::{self, BufRead, Read, Seek, Write};
use std::path::Path;

use fwdread_core::config::{ReaderConfig, DEFAULT_READER_SIZE, MIN_READER_SIZE};
use fwdread_core::error::{Error, Result};

use crate::source::{Pulled, ReadSource, SeekSource, Source};

/// Buffered look-ahead reader over a [`Source`].
///
/// Slices returned by [`peek`](Self::peek), [`next`](Self::next) and
/// [`buffer`](Self::buffer) borrow the reader and stay valid until the next
/// call that takes `&mut self`.
pub struct ForwardReader<S> {
    source: S,
    // len() is the working capacity; bytes past `filled` are scratch.
    data: Vec<u8>,
    pos: usize,
    filled: usize,
    pending: Option<Error>,
    input_offset: u64,
}

impl<S: Source> ForwardReader<S> {
    /// Create a reader with a buffer of `capacity` bytes (at least
    /// [`MIN_READER_SIZE`]).
    pub fn new(source: S, capacity: usize) -> Self {
        Self {
            source,
            data: vec![0u8; capacity.max(MIN_READER_SIZE)],
            pos: 0,
            filled: 0,
            pending: None,
            input_offset: 0,
        }
    }

    /// Create a reader with a [`DEFAULT_READER_SIZE`] buffer.
    pub fn with_default_size(source: S) -> Self {
        Self::new(source, DEFAULT_READER_SIZE)
    }

    /// Create a reader sized by `config`.
    pub fn from_config(source: S, config: &ReaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(source, config.effective_buffer_size()))
    }

    /// Adopt `initial` as the backing buffer.
    ///
    /// Bytes already in `initial` are pending data and are delivered before
    /// the source is touched. Its spare capacity becomes free space; the
    /// total is padded up to [`MIN_READER_SIZE`].
    pub fn with_buffer(source: S, mut initial: Vec<u8>) -> Self {
        let filled = initial.len();
        let capacity = initial.capacity().max(MIN_READER_SIZE);
        initial.resize(capacity, 0);
        Self {
            source,
            data: initial,
            pos: 0,
            filled,
            pending: None,
            input_offset: 0,
        }
    }

    /// Swap in a new source. Pending bytes, the sticky error and the input
    /// offset are cleared; the buffer capacity is kept.
    pub fn reset(&mut self, source: S) {
        self.source = source;
        self.pos = 0;
        self.filled = 0;
        self.pending = None;
        self.input_offset = 0;
        #[cfg(feature = "tracing")]
        tracing::trace!(capacity = self.data.len(), "reader reset");
    }

    /// Like [`reset`](Self::reset), also resizing the buffer to `capacity`
    /// (at least [`MIN_READER_SIZE`]).
    pub fn reset_with_size(&mut self, source: S, capacity: usize) {
        self.data = vec![0u8; capacity.max(MIN_READER_SIZE)];
        self.reset(source);
    }

    /// Number of bytes buffered and not yet delivered.
    pub fn buffered(&self) -> usize {
        self.filled - self.pos
    }

    /// The pending bytes. After a short [`peek`](Self::peek) this is the
    /// shorter run that was available.
    pub fn buffer(&self) -> &[u8] {
        &self.data[self.pos..self.filled]
    }

    /// Current buffer capacity.
    pub fn buffer_size(&self) -> usize {
        self.data.len()
    }

    /// Bytes delivered to callers since construction or the last reset.
    pub fn input_offset(&self) -> u64 {
        self.input_offset
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Reading from the source directly desynchronizes the reader.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Give back the source. Buffered bytes are lost.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Mark up to `n` pending bytes as delivered without looking at them.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.buffered());
        self.advance(n);
    }

    /// Return the next `n` bytes without consuming them.
    ///
    /// Grows the buffer when `n` exceeds its capacity. If the source fails or
    /// runs dry first, the failure is returned (once) and the shorter run is
    /// left in [`buffer`](Self::buffer).
    pub fn peek(&mut self, n: usize) -> Result<&[u8]> {
        self.ensure(n)?;
        Ok(&self.data[self.pos..self.pos + n])
    }

    /// Return the next `n` bytes and consume them.
    pub fn next(&mut self, n: usize) -> Result<&[u8]> {
        self.ensure(n)?;
        let start = self.pos;
        self.advance(n);
        Ok(&self.data[start..start + n])
    }

    pub fn peek_one(&mut self) -> Result<u8> {
        Ok(self.peek(1)?[0])
    }

    pub fn read_one(&mut self) -> Result<u8> {
        if self.buffered() < 1 && self.pending.is_none() {
            self.fill_once();
        }
        if self.buffered() < 1 {
            return Err(self.take_error());
        }
        let b = self.data[self.pos];
        self.advance(1);
        Ok(b)
    }

    /// Move past `n` bytes without copying them out.
    ///
    /// Seekable sources are moved directly and never produce the skipped
    /// bytes; if the move fails the bytes are read through instead. Running out of data before `n` gives [`Error::Truncated`];
    /// after any failure [`input_offset`](Self::input_offset) still accounts
    /// for what was skipped.
    pub fn skip(&mut self, n: usize) -> Result<usize> {
        if self.buffered() >= n {
            self.advance(n);
            return Ok(n);
        }

        if let Some(err) = self.pending.take() {
            let skipped = self.buffered();
            self.advance(skipped);
            return Err(shortfall(err, n, skipped));
        }

        let buffered = self.buffered();
        let remaining = (n - buffered) as u64;
        match self.source.forward().map(|f| f.skip_forward(remaining)) {
            Some(Ok(moved)) => {
                // Buffered bytes are stale relative to the new source position.
                self.advance(buffered);
                self.pos = 0;
                self.filled = 0;
                self.input_offset += moved;
                #[cfg(feature = "tracing")]
                tracing::trace!(requested = remaining, moved, "positioned skip");
                if moved < remaining {
                    return Err(Error::truncated(n as u64, buffered as u64 + moved));
                }
                return Ok(n);
            }
            // The source did not move; read through the bytes instead.
            Some(Err(_e)) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(error = %_e, "positioned skip failed, reading through");
            }
            None => {}
        }

        let mut remaining = n;
        let mut skipped = 0;
        loop {
            let step = self.buffered().min(remaining);
            self.advance(step);
            skipped += step;
            remaining -= step;
            if remaining == 0 {
                return Ok(n);
            }
            if self.pending.is_some() {
                break;
            }
            self.fill_once();
        }
        let err = self.take_error();
        Err(shortfall(err, n, skipped))
    }

    /// Copy into `buf`, touching the source at most once.
    ///
    /// May return fewer bytes than asked for. Errors only when nothing at all
    /// is available.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() <= self.buffered() {
            return Ok(self.copy_out(buf));
        }
        if self.pending.is_none() {
            self.fill_once();
        }
        if self.buffered() > 0 {
            return Ok(self.copy_out(buf));
        }
        Err(self.take_error())
    }

    /// Fill `buf` completely.
    ///
    /// On early end of data returns [`Error::Truncated`]; the first
    /// `delivered` bytes of `buf` are valid.
    pub fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut copied = 0;
        loop {
            copied += self.copy_out(&mut buf[copied..]);
            if copied == buf.len() {
                return Ok(copied);
            }
            if self.pending.is_some() {
                break;
            }
            self.fill_once();
        }
        let err = self.take_error();
        Err(shortfall(err, buf.len(), copied))
    }

    /// Drain everything that is left into `sink`.
    ///
    /// End of data is the normal way out and yields the total byte count.
    /// Any other failure aborts; bytes handed over before it are reflected in
    /// [`input_offset`](Self::input_offset).
    pub fn copy_to<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<u64> {
        let mut total = 0u64;
        loop {
            total += self.drain_to(sink)?;
            match self.pending.take() {
                Some(Error::EndOfData) => return Ok(total),
                Some(err) => return Err(err),
                None => {
                    self.fill_once();
                }
            }
        }
    }

    /// Hand every pending byte to `sink`, counting each accepted chunk as
    /// delivered before the next write.
    fn drain_to<W: Write + ?Sized>(&mut self, sink: &mut W) -> io::Result<u64> {
        let mut written = 0u64;
        while self.buffered() > 0 {
            match sink.write(&self.data[self.pos..self.filled]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "sink accepted no bytes",
                    ));
                }
                Ok(k) => {
                    let k = k.min(self.buffered());
                    self.advance(k);
                    written += k as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(written)
    }

    /// Make `n` bytes pending, or surface why that is impossible.
    fn ensure(&mut self, n: usize) -> Result<()> {
        if self.data.len() < n {
            self.realloc(n + self.buffered());
        }
        while self.buffered() < n && self.pending.is_none() {
            self.fill_once();
        }
        if self.buffered() < n {
            return Err(self.take_error());
        }
        Ok(())
    }

    /// Compact, then pull once into the free region. Returns the bytes added.
    fn fill_once(&mut self) -> usize {
        if self.pos != 0 {
            self.data.copy_within(self.pos..self.filled, 0);
            self.filled -= self.pos;
            self.pos = 0;
        }

        let free = &mut self.data[self.filled..];
        if free.is_empty() {
            return 0;
        }
        match self.source.pull(free) {
            Ok(Pulled { count, end }) => {
                let count = count.min(free.len());
                self.filled += count;
                if end {
                    self.pending = Some(Error::EndOfData);
                } else if count == 0 {
                    self.pending = Some(Error::NoProgress);
                }
                count
            }
            Err(e) => {
                self.pending = Some(Error::Io(e));
                0
            }
        }
    }

    fn realloc(&mut self, capacity: usize) {
        let pending = self.buffered();
        let mut data = vec![0u8; capacity.max(MIN_READER_SIZE)];
        data[..pending].copy_from_slice(&self.data[self.pos..self.filled]);
        #[cfg(feature = "tracing")]
        tracing::trace!(from = self.data.len(), to = data.len(), pending, "buffer realloc");
        self.data = data;
        self.pos = 0;
        self.filled = pending;
    }

    fn copy_out(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.buffered());
        dst[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.advance(n);
        n
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
        self.input_offset += n as u64;
    }

    // Called only after a fill came up short, so the slot is normally full.
    fn take_error(&mut self) -> Error {
        self.pending.take().unwrap_or(Error::NoProgress)
    }
}

fn shortfall(err: Error, requested: usize, delivered: usize) -> Error {
    match err {
        Error::EndOfData => Error::truncated(requested as u64, delivered as u64),
        other => other,
    }
}

impl<R: Read> ForwardReader<ReadSource<R>> {
    /// Wrap a plain [`Read`]; skips read through the skipped bytes.
    pub fn from_read(inner: R, capacity: usize) -> Self {
        Self::new(ReadSource::new(inner), capacity)
    }
}

impl<R: Read + Seek> ForwardReader<SeekSource<R>> {
    /// Wrap a seekable stream; skips reposition it instead of reading.
    pub fn from_seek(inner: R, capacity: usize) -> Self {
        Self::new(SeekSource::new(inner), capacity)
    }
}

/// Convenience helper to create a forward reader over a file path.
pub fn forward_from_path<P: AsRef<Path>>(
    path: P,
    cap: usize,
) -> io::Result<ForwardReader<SeekSource<File>>> {
    let file = File::open(path)?;
    Ok(ForwardReader::from_seek(file, cap))
}

impl<S: Source> Read for ForwardReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match ForwardReader::read(self, buf) {
            Ok(n) => Ok(n),
            Err(Error::EndOfData) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

impl<S: Source> BufRead for ForwardReader<S> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.buffered() == 0 {
            if self.pending.is_none() {
                self.fill_once();
            }
            if self.buffered() == 0 {
                return match self.take_error() {
                    Error::EndOfData => Ok(&[]),
                    e => Err(e.into()),
                };
            }
        }
        Ok(self.buffer())
    }

    fn consume(&mut self, amt: usize) {
        ForwardReader::consume(self, amt)
    }
}
