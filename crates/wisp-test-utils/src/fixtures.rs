//! Reusable inputs and chunk recorders.
//!
//! - [`ChunkRecorder`] captures every chunk a formatter delivers.
//! - [`StopAfter`] stops a formatter after a fixed number of chunks.
//! - [`words`] builds deterministic text of a given size.

use std::ops::ControlFlow;

use wisp_core::{ChunkFormatter, SCRATCH_LEN};

/// Records the chunks a [`ChunkFormatter`] produces.
#[derive(Debug, Default)]
pub struct ChunkRecorder {
    pub chunks: Vec<Vec<u8>>,
}

impl ChunkRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `formatter` and keep every chunk.
    pub fn record<F: ChunkFormatter + ?Sized>(formatter: &F) -> Self {
        let mut rec = Self::new();
        let mut scratch = [0u8; SCRATCH_LEN];
        formatter.render(&mut scratch, &mut |chunk: &[u8]| {
            rec.chunks.push(chunk.to_vec());
            ControlFlow::Continue(())
        });
        rec
    }

    /// All chunks concatenated.
    pub fn joined(&self) -> Vec<u8> {
        self.chunks.concat()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

/// Sink behaviour that accepts `limit` chunks and then stops the formatter.
#[derive(Debug)]
pub struct StopAfter {
    limit: usize,
    pub delivered: usize,
    /// Calls received after the stop was signalled (must stay zero).
    pub after_stop: usize,
}

impl StopAfter {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            delivered: 0,
            after_stop: 0,
        }
    }

    pub fn run<F: ChunkFormatter + ?Sized>(mut self, formatter: &F) -> Self {
        let mut scratch = [0u8; SCRATCH_LEN];
        formatter.render(&mut scratch, &mut |_chunk: &[u8]| {
            if self.delivered >= self.limit {
                self.after_stop += 1;
                return ControlFlow::Break(());
            }
            self.delivered += 1;
            if self.delivered == self.limit {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        self
    }
}

/// Deterministic text of exactly `len` bytes made of short words.
pub fn words(len: usize) -> String {
    const WORDS: [&str; 6] = ["wisp ", "header ", "cap ", "len ", "chunk ", "zero "];
    let mut out = String::with_capacity(len + 8);
    let mut i = 0;
    while out.len() < len {
        out.push_str(WORDS[i % WORDS.len()]);
        i += 1;
    }
    out.truncate(len);
    out
}
