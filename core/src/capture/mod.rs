//! Packet capture and stream assembly.
//!
//! - **source**: the [`SegmentSource`] seam every capture backend implements
//! - **service**: the capture thread feeding the engine
//! - **replay**: memory-mapped segment dumps as a source
//! - **reassembler**: TCP segments to one contiguous byte stream
//! - **frame**: frames and length-prefixed messages out of that stream

pub mod frame;
mod reassembler;
pub mod replay;
pub mod service;
mod source;

pub use frame::{DecodedMessage, Encoding, FrameScan, extract};
pub use reassembler::{StreamReassembler, seq_distance};
pub use replay::ReplaySource;
pub use service::{CaptureService, SourceFactory};
pub use source::{Segment, SegmentSource};
