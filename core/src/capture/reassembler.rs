//! TCP stream reassembly.
//!
//! Segments arrive keyed by their 32-bit sequence number, possibly out of
//! order, duplicated, or retransmitted with different bytes. The reassembler
//! appends them to a single contiguous buffer in sequence order:
//!
//! ```text
//!   add_segment(seq, bytes)
//!          │
//!          ▼
//!   ┌──────────────┐  pop(expected) while present   ┌────────────┐
//!   │ pending map  │ ─────────────────────────────▶ │   buffer   │ ──▶ peek / consume
//!   │ seq -> bytes │   expected += len (mod 2^32)   │ (≤ 64 KiB) │
//!   └──────────────┘                                └────────────┘
//! ```
//!
//! A segment further than `max_seq_distance` from the tracked sequence is a
//! new stream: all state is discarded and the stream re-anchors on it.

use hashbrown::HashMap;
use raidlens_types::ReassemblySettings;

/// Signed circular distance `a - b` on the 32-bit sequence space.
///
/// Equivalent to `((a - b + 2^31) mod 2^32) - 2^31`.
#[inline]
pub fn seq_distance(a: u32, b: u32) -> i64 {
    a.wrapping_sub(b) as i32 as i64
}

#[derive(Debug)]
pub struct StreamReassembler {
    buffer: Vec<u8>,
    pending: HashMap<u32, Vec<u8>>,
    /// Next sequence number expected at the tail of `buffer`.
    expected: Option<u32>,
    max_seq_distance: i64,
    max_buffer_bytes: usize,
    dropped_bytes: u64,
}

impl Default for StreamReassembler {
    fn default() -> Self {
        Self::new(ReassemblySettings::default())
    }
}

impl StreamReassembler {
    pub fn new(settings: ReassemblySettings) -> Self {
        Self {
            buffer: Vec::with_capacity(settings.max_buffer_bytes),
            pending: HashMap::new(),
            expected: None,
            max_seq_distance: settings.max_seq_distance,
            max_buffer_bytes: settings.max_buffer_bytes,
            dropped_bytes: 0,
        }
    }

    /// Add one TCP segment. Empty payloads are ignored.
    pub fn add_segment(&mut self, seq: u32, payload: &[u8]) {
        if payload.is_empty() {
            return;
        }

        let current = *self.expected.get_or_insert(seq);
        if seq_distance(seq, current).abs() > self.max_seq_distance {
            tracing::debug!(
                "[REASSEMBLY] Sequence {} too far from {}, restarting stream",
                seq,
                current
            );
            self.reset();
            self.expected = Some(seq);
        }

        match self.pending.get(&seq) {
            Some(existing) if existing.as_slice() == payload => {
                tracing::trace!("[REASSEMBLY] Duplicate segment ignored: seq={}", seq);
                return;
            }
            Some(existing) => {
                tracing::debug!(
                    "[REASSEMBLY] Retransmission replaces seq={} ({} -> {} bytes)",
                    seq,
                    existing.len(),
                    payload.len()
                );
            }
            None => {}
        }

        self.pending.insert(seq, payload.to_vec());
        self.reassemble();
    }

    fn reassemble(&mut self) {
        let Some(mut expected) = self.expected else {
            return;
        };

        while let Some(segment) = self.pending.remove(&expected) {
            self.buffer.extend_from_slice(&segment);
            expected = expected.wrapping_add(segment.len() as u32);
        }
        self.expected = Some(expected);

        // Anything behind the tail can never become contiguous again.
        self.pending
            .retain(|&seq, _| seq_distance(seq, expected) > 0);

        // TODO: replace the drop-half policy with back-pressure on the frame scanner.
        if self.buffer.len() > self.max_buffer_bytes {
            let half = self.buffer.len() / 2;
            self.buffer.drain(..half);
            self.dropped_bytes += half as u64;
            tracing::warn!(
                "[REASSEMBLY] Buffer over {} bytes, dropped oldest {} bytes",
                self.max_buffer_bytes,
                half
            );
        }
    }

    /// Contiguous bytes not yet consumed.
    pub fn peek(&self) -> &[u8] {
        &self.buffer
    }

    /// Drop `n` bytes from the front. `n >= len` empties the buffer.
    pub fn consume(&mut self, n: usize) {
        if n >= self.buffer.len() {
            self.buffer.clear();
        } else {
            self.buffer.drain(..n);
        }
    }

    /// Forget everything, including the stream anchor.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.pending.clear();
        self.expected = None;
    }

    pub fn expected_seq(&self) -> Option<u32> {
        self.expected
    }

    pub fn pending_segments(&self) -> usize {
        self.pending.len()
    }

    /// Total bytes discarded by the overflow policy since creation.
    pub fn dropped_bytes(&self) -> u64 {
        self.dropped_bytes
    }
}
