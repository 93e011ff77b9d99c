use crate::error::CaptureError;

/// One TCP payload matching the capture filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub seq: u32,
    pub payload: Vec<u8>,
}

impl Segment {
    pub fn new(seq: u32, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            seq,
            payload: payload.into(),
        }
    }
}

/// Something that yields filtered TCP segments from one device or dump.
pub trait SegmentSource: Send {
    /// Next segment, or `Ok(None)` when nothing arrived within the read
    /// timeout.
    fn next_segment(&mut self) -> Result<Option<Segment>, CaptureError>;

    /// Whether the source can never yield again. Live devices never are.
    fn is_exhausted(&self) -> bool {
        false
    }
}
