use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};
use pmwatch_decode::{decode, scan, ChecksumPolicy, FRAME_LEN};
use std::io::{ErrorKind, Read};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::link::{Link, LinkState};
use crate::serial_service::ByteSource;
use crate::shared::SharedReading;

#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Most bytes pulled from the port per cycle. Never below one frame.
    pub chunk_size: usize,
    /// How long a cycle waits for its window to fill.
    pub read_timeout: Duration,
    /// Pause between cycles.
    pub cycle_delay: Duration,
    pub checksum: ChecksumPolicy,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            read_timeout: Duration::from_millis(1000),
            cycle_delay: Duration::from_millis(2000),
            checksum: ChecksumPolicy::Lenient,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A full window was scanned; `frames` of them were published.
    Scanned { frames: usize, rejected: usize },
    /// Fewer than one frame's worth of bytes arrived.
    NoCompleteFrame { bytes: usize },
    /// The port is closed and could not be reopened this cycle.
    LinkDown,
}

/// Reads the sensor, decodes frames and publishes them. Sole writer of the
/// [`SharedReading`] it was built with.
pub struct AcquisitionLoop<S: ByteSource> {
    source: S,
    port: Option<S::Port>,
    cfg: AcquisitionConfig,
    shared: SharedReading,
    link: Link,
    buf: Vec<u8>,
}

impl<S: ByteSource> AcquisitionLoop<S> {
    pub fn new(source: S, cfg: AcquisitionConfig, shared: SharedReading, link: Link) -> Self {
        let buf = vec![0u8; cfg.chunk_size.max(FRAME_LEN)];
        Self {
            source,
            port: None,
            cfg,
            shared,
            link,
            buf,
        }
    }

    /// Opens the source and marks the link connected.
    pub fn connect(&mut self) -> Result<()> {
        let port = self.source.open()?;
        info!("opened {}", self.source.describe());
        self.port = Some(port);
        self.link.set(LinkState::Connected);
        Ok(())
    }

    pub fn run_cycle(&mut self) -> CycleOutcome {
        if self.port.is_none() {
            if let Err(e) = self.connect() {
                warn!("reopen failed: {e}");
                return CycleOutcome::LinkDown;
            }
        }
        let Some(port) = self.port.as_mut() else {
            return CycleOutcome::LinkDown;
        };

        let (n, lost) = read_window(port, &mut self.buf, self.cfg.read_timeout);
        // frames that arrived before a drop still count
        let scanned = (n >= FRAME_LEN).then(|| self.publish_frames(n));

        if let Some(e) = lost {
            warn!("lost {}: {e}", self.source.describe());
            self.port = None;
            self.link.set(LinkState::Disconnected);
            return CycleOutcome::LinkDown;
        }

        match scanned {
            Some((frames, rejected)) => CycleOutcome::Scanned { frames, rejected },
            None => {
                warn!("no complete frame received ({n} bytes)");
                if n > 0 {
                    debug!("short read: {}", hex::encode(&self.buf[..n]));
                }
                CycleOutcome::NoCompleteFrame { bytes: n }
            }
        }
    }

    fn publish_frames(&self, n: usize) -> (usize, usize) {
        let mut scanner = scan(&self.buf[..n], self.cfg.checksum);
        let mut frames = 0;
        for candidate in scanner.by_ref() {
            let record = decode(&candidate.frame);
            info!("frame at offset {}\n{record}", candidate.offset);
            self.shared.publish_now(record);
            frames += 1;
        }
        let rejected = scanner.rejected();
        if rejected > 0 {
            debug!("{rejected} marker hit(s) rejected in {n} bytes");
        }
        (frames, rejected)
    }

    /// Cycles until `shutdown` fires or its sender goes away.
    pub fn run(mut self, shutdown: Receiver<()>) {
        loop {
            self.run_cycle();
            match shutdown.recv_timeout(self.cfg.cycle_delay) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("acquisition stopped");
    }
}

/// Fills `buf` from `port` until it is full, the port reports end of data, or
/// `timeout` elapses. Driver timeouts count as "nothing yet", not as errors.
///
/// Returns the number of bytes filled and, if the port failed part way, the
/// error that stopped the read. Bytes read before the error are kept.
pub fn read_window<R: Read>(
    port: &mut R,
    buf: &mut [u8],
    timeout: Duration,
) -> (usize, Option<std::io::Error>) {
    let deadline = Instant::now() + timeout;
    let mut filled = 0;
    while filled < buf.len() {
        match port.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return (filled, Some(e)),
        }
        if Instant::now() >= deadline {
            break;
        }
    }
    (filled, None)
}

/// Running acquisition thread. There is only ever one; the handle is not `Clone`.
pub struct AcquisitionHandle {
    shutdown: Sender<()>,
    thread: JoinHandle<()>,
}

impl AcquisitionHandle {
    /// Stops the loop at its next wait and joins the thread.
    pub fn shutdown(self) {
        let _ = self.shutdown.send(());
        if self.thread.join().is_err() {
            error!("acquisition thread panicked");
        }
    }
}

/// Starts the acquisition thread. The initial open happens on that thread;
/// its outcome is reported through `link` (`Connected` or `Failed`).
pub fn spawn<S>(
    source: S,
    cfg: AcquisitionConfig,
    shared: SharedReading,
    link: Link,
) -> Result<AcquisitionHandle>
where
    S: ByteSource + 'static,
{
    let (tx, rx) = bounded::<()>(1);
    let thread = std::thread::Builder::new()
        .name("acquisition".into())
        .spawn(move || {
            let mut acq = AcquisitionLoop::new(source, cfg, shared, link.clone());
            if let Err(e) = acq.connect() {
                error!("{e}");
                link.set(LinkState::Failed(e.to_string()));
                return;
            }
            acq.run(rx);
        })
        .map_err(Error::Spawn)?;
    Ok(AcquisitionHandle { shutdown: tx, thread })
}
