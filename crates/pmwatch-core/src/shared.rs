use parking_lot::RwLock;
use pmwatch_decode::MeasurementRecord;
use std::sync::Arc;
use std::time::Instant;

/// Milliseconds since the service started. Monotonic.
#[derive(Debug, Clone, Copy)]
pub struct ServiceClock {
    started: Instant,
}

impl ServiceClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub record: MeasurementRecord,
    /// Capture time in service milliseconds, 0 until the first publish.
    pub captured_at_ms: u64,
    /// Number of publishes so far.
    pub sequence: u64,
}

impl Snapshot {
    pub fn has_data(&self) -> bool {
        self.sequence > 0
    }
}

/// Latest reading, shared between the acquisition thread and request handlers.
///
/// Publishing swaps the whole snapshot under the write lock and readers copy it
/// out under the read lock, so a reader never sees fields from two publishes.
#[derive(Debug, Clone)]
pub struct SharedReading {
    inner: Arc<RwLock<Snapshot>>,
    clock: ServiceClock,
}

impl SharedReading {
    pub fn new(clock: ServiceClock) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Snapshot::default())),
            clock,
        }
    }

    pub fn publish(&self, record: MeasurementRecord, captured_at_ms: u64) {
        let mut slot = self.inner.write();
        *slot = Snapshot {
            record,
            captured_at_ms,
            sequence: slot.sequence + 1,
        };
    }

    /// Publishes stamped with the current service time.
    pub fn publish_now(&self, record: MeasurementRecord) {
        self.publish(record, self.clock.now_ms());
    }

    pub fn read(&self) -> Snapshot {
        *self.inner.read()
    }

    pub fn clock(&self) -> ServiceClock {
        self.clock
    }
}
