//! PMS5003-style frame protocol: frame validation, scanning and decoding.

pub mod frame;
pub mod record;
pub mod scanner;

pub use frame::{ChecksumPolicy, RawFrame, FRAME_LEN, FRAME_MARKER, PAYLOAD_LEN};
pub use record::{decode, MeasurementRecord};
pub use scanner::{scan, Candidate, FrameScanner};
