//! Frame and message extraction from the reassembled stream.
//!
//! Wire layout:
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────────────┬──────────────┐
//! │ 7C 4E 00×7   │ [type u32][len u32][enc u8][payload] ... │ F7 4E 00×7   │
//! │ start marker │ messages, type 0 terminates early        │ end marker   │
//! └──────────────┴──────────────────────────────────────────┴──────────────┘
//! ```
//!
//! Bytes are only reported as consumed through the end marker of a frame
//! whose messages were all read; a frame still being received consumes
//! nothing so it can be rescanned once more bytes arrive.

use memchr::memmem;

pub const MARKER_LEN: usize = 9;
pub const START_MARKER: [u8; MARKER_LEN] = [0x7C, 0x4E, 0, 0, 0, 0, 0, 0, 0];
pub const END_MARKER: [u8; MARKER_LEN] = [0xF7, 0x4E, 0, 0, 0, 0, 0, 0, 0];

/// Message header: type (4) + length (4) + encoding (1).
pub const HEADER_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Plain,
    Compressed,
    Other(u8),
}

impl From<u8> for Encoding {
    fn from(b: u8) -> Self {
        match b {
            0 => Encoding::Plain,
            1 => Encoding::Compressed,
            other => Encoding::Other(other),
        }
    }
}

/// One length-prefixed message borrowed from the scan buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedMessage<'a> {
    pub type_code: u32,
    pub length: u32,
    pub encoding: Encoding,
    pub payload: &'a [u8],
}

/// Result of one scan over the buffer.
#[derive(Debug, Default)]
pub struct FrameScan<'a> {
    pub messages: Vec<DecodedMessage<'a>>,
    pub bytes_consumed: usize,
    pub compressed_skipped: usize,
}

#[inline]
fn read_u32_le(buf: &[u8], at: usize) -> Option<u32> {
    let bytes: [u8; 4] = buf.get(at..at + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

/// Scan `buffer` for complete frames.
///
/// Compressed messages are skipped but still advance the cursor. If a
/// message inside a frame declares a payload running past the end of the
/// buffer the scan stops: messages from that frame are discarded and only
/// earlier complete frames count as consumed.
pub fn extract(buffer: &[u8]) -> FrameScan<'_> {
    let mut scan = FrameScan::default();
    let mut pivot = 0usize;

    while pivot < buffer.len() {
        let Some(start) = memmem::find(&buffer[pivot..], &START_MARKER).map(|i| i + pivot) else {
            break;
        };
        let body_start = start + MARKER_LEN;
        let Some(end) = buffer
            .get(body_start..)
            .and_then(|rest| memmem::find(rest, &END_MARKER))
            .map(|i| i + body_start)
        else {
            break;
        };

        let mut frame_messages = Vec::new();
        let mut frame_skipped = 0usize;
        let mut cursor = body_start;

        while cursor + HEADER_LEN <= buffer.len() && cursor < end {
            let (Some(type_code), Some(length)) =
                (read_u32_le(buffer, cursor), read_u32_le(buffer, cursor + 4))
            else {
                break;
            };
            let encoding = Encoding::from(buffer[cursor + 8]);

            if type_code == 0 {
                break;
            }

            let payload_start = cursor + HEADER_LEN;
            let Some(payload_end) = payload_start
                .checked_add(length as usize)
                .filter(|&e| e <= buffer.len())
            else {
                tracing::debug!(
                    "[FRAME] Message type {} declares {} bytes past buffer end, waiting",
                    type_code,
                    length
                );
                return scan;
            };

            if encoding == Encoding::Compressed {
                frame_skipped += 1;
            } else {
                frame_messages.push(DecodedMessage {
                    type_code,
                    length,
                    encoding,
                    payload: &buffer[payload_start..payload_end],
                });
            }
            cursor = payload_end;
        }

        scan.messages.append(&mut frame_messages);
        scan.compressed_skipped += frame_skipped;
        scan.bytes_consumed = end + MARKER_LEN;
        pivot = scan.bytes_consumed;
    }

    scan
}
