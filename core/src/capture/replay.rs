//! Replay of recorded segment dumps.
//!
//! Record layout, repeated to end of file:
//!
//! ```text
//! ┌────────────┬────────────┬───────────────┐
//! │ seq u32 LE │ len u32 LE │ len bytes     │
//! └────────────┴────────────┴───────────────┘
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use memmap2::Mmap;

use super::source::{Segment, SegmentSource};
use crate::error::CaptureError;

const RECORD_HEADER_LEN: usize = 8;

pub struct ReplaySource {
    mmap: Mmap,
    offset: usize,
}

impl ReplaySource {
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let open_err = |source| CaptureError::ReplayOpen {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(open_err)?;
        // Safety: the dump is treated as read-only for the life of the map.
        let mmap = unsafe { Mmap::map(&file) }.map_err(open_err)?;
        tracing::info!("[CAPTURE] Replaying {} ({} bytes)", path.display(), mmap.len());
        Ok(Self { mmap, offset: 0 })
    }

    pub fn remaining_bytes(&self) -> usize {
        self.mmap.len() - self.offset
    }
}

impl SegmentSource for ReplaySource {
    fn next_segment(&mut self) -> Result<Option<Segment>, CaptureError> {
        let bytes = &self.mmap[self.offset..];
        if bytes.is_empty() {
            return Ok(None);
        }
        let truncated = CaptureError::ReplayTruncated {
            offset: self.offset,
        };
        let Some(header) = bytes.get(..RECORD_HEADER_LEN) else {
            self.offset = self.mmap.len();
            return Err(truncated);
        };
        let seq = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
        let Some(payload) = bytes.get(RECORD_HEADER_LEN..RECORD_HEADER_LEN + len) else {
            self.offset = self.mmap.len();
            return Err(truncated);
        };

        self.offset += RECORD_HEADER_LEN + len;
        Ok(Some(Segment::new(seq, payload)))
    }

    fn is_exhausted(&self) -> bool {
        self.offset >= self.mmap.len()
    }
}

/// Append one record in replay format.
pub fn write_record(out: &mut impl Write, segment: &Segment) -> std::io::Result<()> {
    out.write_all(&segment.seq.to_le_bytes())?;
    out.write_all(&(segment.payload.len() as u32).to_le_bytes())?;
    out.write_all(&segment.payload)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn make_dump(name: &str, bytes: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "raidlens-replay-{}-{}.bin",
            name,
            std::process::id()
        ));
        std::fs::write(&path, bytes).expect("write dump");
        path
    }

    #[test]
    fn test_replay_yields_records_in_order() {
        let mut bytes = Vec::new();
        write_record(&mut bytes, &Segment::new(10, b"abc".to_vec())).expect("write");
        write_record(&mut bytes, &Segment::new(13, b"de".to_vec())).expect("write");
        let path = make_dump("order", &bytes);

        let mut source = ReplaySource::open(&path).expect("open");
        assert_eq!(source.next_segment().expect("read"), Some(Segment::new(10, b"abc".to_vec())));
        assert!(!source.is_exhausted());
        assert_eq!(source.next_segment().expect("read"), Some(Segment::new(13, b"de".to_vec())));
        assert!(source.is_exhausted());
        assert_eq!(source.next_segment().expect("read"), None);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_truncated_record_is_an_error() {
        let mut bytes = Vec::new();
        write_record(&mut bytes, &Segment::new(1, b"full".to_vec())).expect("write");
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(b"short");
        let path = make_dump("truncated", &bytes);

        let mut source = ReplaySource::open(&path).expect("open");
        assert!(source.next_segment().expect("first record").is_some());
        let err = source.next_segment().expect_err("truncated record");
        assert!(matches!(err, CaptureError::ReplayTruncated { offset: 12 }));
        assert!(source.is_exhausted());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file() {
        let err = ReplaySource::open(Path::new("/nonexistent/raidlens.bin"))
            .err()
            .expect("open must fail");
        assert!(matches!(err, CaptureError::ReplayOpen { .. }));
    }
}
