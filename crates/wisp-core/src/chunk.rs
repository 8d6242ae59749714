//! Chunked formatter interface.
//!
//! A formatter never sees the destination buffer. It renders into a small
//! caller-owned scratch array and hands each filled chunk to a sink. The
//! sink answers [`ControlFlow::Continue`] to receive more output or
//! [`ControlFlow::Break`] to stop the formatter early (the destination could
//! not grow). The scratch array is reused for every chunk.
//!
//! ```text
//! formatter ──render──▶ ChunkWriter ──chunk──▶ sink (e.g. buffer append)
//!                          ▲                     │
//!                          └──── Continue/Break ─┘
//! ```

use std::fmt;
use std::ops::ControlFlow;

/// Size of the scratch array a formatter renders into.
///
/// Matches the minimum callback buffer of stb-style chunked printf engines.
pub const SCRATCH_LEN: usize = 512;

/// Receiver of rendered chunks.
///
/// Each call delivers between 1 and [`SCRATCH_LEN`] bytes. Returning
/// `Break` asks the formatter to stop producing output.
pub type ChunkSink<'a> = dyn FnMut(&[u8]) -> ControlFlow<()> + 'a;

/// A formatting strategy that renders through bounded chunks.
pub trait ChunkFormatter {
    /// Render the full output, delivering it to `sink` in chunks written
    /// into `scratch`.
    ///
    /// Implementations must stop calling `sink` once it has returned
    /// `Break`.
    fn render(&self, scratch: &mut [u8; SCRATCH_LEN], sink: &mut ChunkSink<'_>);
}

impl<F: ChunkFormatter + ?Sized> ChunkFormatter for &F {
    fn render(&self, scratch: &mut [u8; SCRATCH_LEN], sink: &mut ChunkSink<'_>) {
        (**self).render(scratch, sink);
    }
}

impl ChunkFormatter for fmt::Arguments<'_> {
    fn render(&self, scratch: &mut [u8; SCRATCH_LEN], sink: &mut ChunkSink<'_>) {
        let mut writer = ChunkWriter::new(scratch, sink);
        // An error here is either the sink stopping us or a Display impl
        // failing; in both cases whatever was rendered is still flushed.
        let _ = fmt::write(&mut writer, *self);
        let _ = writer.finish();
    }
}

impl ChunkFormatter for [u8] {
    fn render(&self, scratch: &mut [u8; SCRATCH_LEN], sink: &mut ChunkSink<'_>) {
        let mut writer = ChunkWriter::new(scratch, sink);
        if writer.push(self).is_continue() {
            let _ = writer.finish();
        }
    }
}

impl ChunkFormatter for str {
    fn render(&self, scratch: &mut [u8; SCRATCH_LEN], sink: &mut ChunkSink<'_>) {
        self.as_bytes().render(scratch, sink);
    }
}

/// Accumulates output in a scratch array and flushes it to a sink.
///
/// Formatters build on this instead of talking to the sink directly. Once
/// the sink returns `Break`, every further push is dropped and reports
/// `Break`.
pub struct ChunkWriter<'s, 'k, 'f> {
    scratch: &'s mut [u8; SCRATCH_LEN],
    pos: usize,
    sink: &'k mut ChunkSink<'f>,
    stopped: bool,
}

impl<'s, 'k, 'f> ChunkWriter<'s, 'k, 'f> {
    /// Create a writer over `scratch` that flushes into `sink`.
    pub fn new(scratch: &'s mut [u8; SCRATCH_LEN], sink: &'k mut ChunkSink<'f>) -> Self {
        Self {
            scratch,
            pos: 0,
            sink,
            stopped: false,
        }
    }

    /// Whether the sink has asked to stop.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Bytes buffered but not yet delivered.
    pub fn pending(&self) -> usize {
        self.pos
    }

    /// Append `bytes`, flushing every time the scratch array fills.
    pub fn push(&mut self, mut bytes: &[u8]) -> ControlFlow<()> {
        while !bytes.is_empty() {
            if self.stopped {
                return ControlFlow::Break(());
            }
            let n = (SCRATCH_LEN - self.pos).min(bytes.len());
            self.scratch[self.pos..self.pos + n].copy_from_slice(&bytes[..n]);
            self.pos += n;
            bytes = &bytes[n..];
            if self.pos == SCRATCH_LEN {
                self.flush()?;
            }
        }
        self.flow()
    }

    /// Append a single byte.
    pub fn push_byte(&mut self, byte: u8) -> ControlFlow<()> {
        self.push(std::slice::from_ref(&byte))
    }

    /// Append `byte` repeated `count` times (padding).
    pub fn push_repeat(&mut self, byte: u8, mut count: usize) -> ControlFlow<()> {
        while count > 0 {
            if self.stopped {
                return ControlFlow::Break(());
            }
            let n = (SCRATCH_LEN - self.pos).min(count);
            self.scratch[self.pos..self.pos + n].fill(byte);
            self.pos += n;
            count -= n;
            if self.pos == SCRATCH_LEN {
                self.flush()?;
            }
        }
        self.flow()
    }

    /// Deliver buffered bytes to the sink now.
    pub fn flush(&mut self) -> ControlFlow<()> {
        if self.stopped {
            return ControlFlow::Break(());
        }
        if self.pos == 0 {
            return ControlFlow::Continue(());
        }
        let flow = (self.sink)(&self.scratch[..self.pos]);
        self.pos = 0;
        if flow.is_break() {
            self.stopped = true;
        }
        flow
    }

    /// Flush the tail and consume the writer.
    pub fn finish(mut self) -> ControlFlow<()> {
        self.flush()
    }

    fn flow(&self) -> ControlFlow<()> {
        if self.stopped {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

impl fmt::Write for ChunkWriter<'_, '_, '_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        match self.push(s.as_bytes()) {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(()) => Err(fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn collect<F: ChunkFormatter + ?Sized>(f: &F) -> (Vec<u8>, Vec<usize>) {
        let mut scratch = [0u8; SCRATCH_LEN];
        let mut out = Vec::new();
        let mut sizes = Vec::new();
        f.render(&mut scratch, &mut |chunk: &[u8]| {
            sizes.push(chunk.len());
            out.extend_from_slice(chunk);
            ControlFlow::Continue(())
        });
        (out, sizes)
    }

    #[test]
    fn arguments_render_in_one_chunk_when_small() {
        let (out, sizes) = collect(&format_args!("x={} y={}", 1, "two"));
        assert_eq!(out, b"x=1 y=two");
        assert_eq!(sizes, vec![9]);
    }

    #[test]
    fn long_output_is_split_at_scratch_len() {
        let text = "a".repeat(SCRATCH_LEN * 2 + 7);
        let (out, sizes) = collect(text.as_str());
        assert_eq!(out.len(), text.len());
        assert_eq!(sizes, vec![SCRATCH_LEN, SCRATCH_LEN, 7]);
    }

    #[test]
    fn empty_output_never_calls_sink() {
        let (out, sizes) = collect(&b""[..]);
        assert!(out.is_empty());
        assert!(sizes.is_empty());
    }

    #[test]
    fn break_stops_further_chunks() {
        let text = "b".repeat(SCRATCH_LEN * 4);
        let mut scratch = [0u8; SCRATCH_LEN];
        let mut calls = 0;
        text.as_str().render(&mut scratch, &mut |_chunk: &[u8]| {
            calls += 1;
            ControlFlow::Break(())
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn writer_drops_pushes_after_break() {
        let mut scratch = [0u8; SCRATCH_LEN];
        let mut sink = |_chunk: &[u8]| ControlFlow::Break(());
        let mut w = ChunkWriter::new(&mut scratch, &mut sink);
        assert!(w.push(b"abc").is_continue());
        assert!(w.flush().is_break());
        assert!(w.is_stopped());
        assert!(w.push(b"def").is_break());
        assert_eq!(w.pending(), 0);
    }

    #[test]
    fn push_repeat_spans_chunks() {
        let mut scratch = [0u8; SCRATCH_LEN];
        let mut total = 0;
        let mut sink = |chunk: &[u8]| {
            assert!(chunk.iter().all(|&b| b == b' '));
            total += chunk.len();
            ControlFlow::Continue(())
        };
        let mut w = ChunkWriter::new(&mut scratch, &mut sink);
        assert!(w.push_repeat(b' ', SCRATCH_LEN + 3).is_continue());
        assert!(w.finish().is_continue());
        assert_eq!(total, SCRATCH_LEN + 3);
    }

    #[test]
    fn reference_formatter_delegates() {
        let inner: &str = "ref";
        let (out, _) = collect(&&inner);
        assert_eq!(out, b"ref");
    }

    proptest! {
        #[test]
        fn pushes_of_any_size_rejoin_in_full_chunks(
            pieces in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..700), 0..8),
            pad in 0usize..1200,
        ) {
            let mut scratch = [0u8; SCRATCH_LEN];
            let mut out = Vec::new();
            let mut sizes = Vec::new();
            let mut sink = |chunk: &[u8]| {
                sizes.push(chunk.len());
                out.extend_from_slice(chunk);
                ControlFlow::Continue(())
            };
            let mut w = ChunkWriter::new(&mut scratch, &mut sink);
            for piece in &pieces {
                prop_assert!(w.push(piece).is_continue());
            }
            prop_assert!(w.push_repeat(b'.', pad).is_continue());
            prop_assert!(w.finish().is_continue());

            let mut expected = pieces.concat();
            expected.resize(expected.len() + pad, b'.');
            prop_assert_eq!(&out, &expected);
            if let Some((last, full)) = sizes.split_last() {
                prop_assert!(full.iter().all(|&n| n == SCRATCH_LEN));
                prop_assert!((1..=SCRATCH_LEN).contains(last));
            } else {
                prop_assert!(expected.is_empty());
            }
        }
    }
}
