//! Core runtime: serial access, acquisition loop, shared latest reading, presentation.

pub mod acquisition;
pub mod error;
pub mod link;
pub mod presenter;
pub mod serial_service;
pub mod shared;

pub use acquisition::{AcquisitionConfig, AcquisitionHandle, AcquisitionLoop, CycleOutcome};
pub use error::{Error, Result};
pub use link::{Link, LinkState};
pub use presenter::{render, render_current, ReadingView};
pub use serial_service::{ByteSource, PortInfo, SerialConfig, SerialService};
pub use shared::{ServiceClock, SharedReading, Snapshot};
