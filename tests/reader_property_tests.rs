use std::io::{self, Cursor, Read};

use fwdread::{Error, ForwardReader, Pulled, ReadSource, SeekSource, Source};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = vec![0u8; len];
    rng.fill(&mut out[..]);
    out
}

/// Produces a random, never-empty prefix of each request and signals end of
/// data together with the last chunk.
struct ChoppySource {
    data: Vec<u8>,
    at: usize,
    rng: StdRng,
}

impl ChoppySource {
    fn new(data: Vec<u8>, seed: u64) -> Self {
        Self {
            data,
            at: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Source for ChoppySource {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Pulled> {
        let left = self.data.len() - self.at;
        let n = self.rng.gen_range(1..=buf.len()).min(left);
        buf[..n].copy_from_slice(&self.data[self.at..self.at + n]);
        self.at += n;
        Ok(Pulled {
            count: n,
            end: self.at == self.data.len(),
        })
    }
}

#[test]
fn test_any_chunking_reproduces_source() {
    for seed in 0..8u64 {
        let bts = random_bytes(3000, seed);
        let mut chunker = StdRng::seed_from_u64(seed + 100);
        let capacity = 16 + seed as usize * 40;
        let mut rd = ForwardReader::new(ChoppySource::new(bts.clone(), seed), capacity);
        let mut out = Vec::with_capacity(bts.len());

        loop {
            let mut chunk = vec![0u8; chunker.gen_range(1..600)];
            let res = if chunker.gen_bool(0.5) {
                rd.read(&mut chunk)
            } else {
                rd.read_full(&mut chunk)
            };
            match res {
                Ok(n) => out.extend_from_slice(&chunk[..n]),
                Err(Error::EndOfData) => break,
                Err(e) if e.is_truncated() => {
                    let n = e.delivered().unwrap() as usize;
                    out.extend_from_slice(&chunk[..n]);
                    break;
                }
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(out, bts, "seed {seed}");
        assert_eq!(rd.input_offset(), bts.len() as u64);
    }
}

#[test]
fn test_peek_then_next_agree() {
    let bts = random_bytes(2048, 21);
    let mut rd = ForwardReader::new(ChoppySource::new(bts.clone(), 21), 32);
    let mut at = 0usize;
    for n in [1usize, 7, 31, 32, 33, 100, 500] {
        let peeked = rd.peek(n).unwrap().to_vec();
        assert_eq!(rd.input_offset(), at as u64);
        assert_eq!(rd.next(n).unwrap(), &peeked[..]);
        assert_eq!(&peeked[..], &bts[at..at + n]);
        at += n;
        assert_eq!(rd.input_offset(), at as u64);
    }
}

#[test]
fn test_skip_lands_on_absolute_position() {
    let bts = random_bytes(5000, 22);
    for n in [0usize, 1, 15, 16, 17, 199, 200, 201, 4999] {
        let mut rd = ForwardReader::new(ChoppySource::new(bts.clone(), 22), 16);
        assert_eq!(rd.skip(n).unwrap(), n);
        assert_eq!(rd.read_one().unwrap(), bts[n], "skip {n}");

        let mut rd = ForwardReader::from_seek(Cursor::new(bts.clone()), 16);
        assert_eq!(rd.skip(n).unwrap(), n);
        assert_eq!(rd.read_one().unwrap(), bts[n], "seek skip {n}");
    }
}

#[test]
fn test_skip_past_end_counts_remaining() {
    let bts = random_bytes(1024, 23);
    let mut rd = ForwardReader::new(ChoppySource::new(bts.clone(), 23), 200);
    assert_eq!(rd.skip(512).unwrap(), 512);
    assert_eq!(rd.read_one().unwrap(), bts[512]);

    match rd.skip(2000) {
        Err(Error::Truncated {
            requested,
            delivered,
            ..
        }) => {
            assert_eq!(requested, 2000);
            assert_eq!(delivered, 1024 - 512 - 1);
        }
        other => panic!("expected truncation, got {other:?}"),
    }
}

#[test]
fn test_read_full_larger_than_source() {
    let bts = random_bytes(700, 24);
    let mut rd = ForwardReader::new(ChoppySource::new(bts.clone(), 24), 64);
    rd.skip(100).unwrap();
    let mut buf = vec![0u8; 1000];
    let err = rd.read_full(&mut buf).unwrap_err();
    assert_eq!(err.delivered(), Some(600));
    assert_eq!(&buf[..600], &bts[100..]);
}

#[test]
fn test_copy_to_writes_whole_source() {
    let bts = random_bytes(10_000, 25);
    let mut rd = ForwardReader::new(ChoppySource::new(bts.clone(), 25), 128);
    let mut sink = Vec::new();
    assert_eq!(rd.copy_to(&mut sink).unwrap(), 10_000);
    assert_eq!(sink, bts);

    // nothing left: still a clean completion
    assert_eq!(rd.copy_to(&mut sink).unwrap(), 0);
}

#[test]
fn test_empty_source_peek() {
    let mut rd = ForwardReader::from_read(io::empty(), 16);
    assert!(matches!(rd.peek(1), Err(Error::EndOfData)));
    assert!(rd.buffer().is_empty());
    assert_eq!(rd.input_offset(), 0);
}

#[test]
fn test_next_grows_small_buffer() {
    let bts = random_bytes(1000, 26);
    let mut rd = ForwardReader::new(ChoppySource::new(bts.clone(), 26), 128);
    assert_eq!(rd.buffer_size(), 128);
    assert_eq!(rd.next(256).unwrap(), &bts[..256]);
    assert!(rd.buffer_size() >= 256);
}

#[test]
fn test_reset_restarts_offset() {
    let mut rd = ForwardReader::new(ReadSource::new(&b"0123456789"[..]), 16);
    rd.skip(4).unwrap();
    assert_eq!(rd.input_offset(), 4);
    rd.reset(ReadSource::new(&b"abcdef"[..]));
    assert_eq!(rd.input_offset(), 0);
    assert_eq!(rd.read_one().unwrap(), b'a');
    assert_eq!(rd.input_offset(), 1);
}

#[test]
fn test_std_read_adapter_stops_at_end() {
    let bts = random_bytes(999, 27);
    let mut rd = ForwardReader::new(SeekSource::new(Cursor::new(bts.clone())), 50);
    rd.skip(99).unwrap();
    let mut rest = Vec::new();
    rd.read_to_end(&mut rest).unwrap();
    assert_eq!(rest, &bts[99..]);
    assert_eq!(rd.input_offset(), 999);
}
