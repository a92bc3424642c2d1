//! JSON shape served to clients.

use serde::Serialize;

use crate::shared::{SharedReading, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MassConcentration {
    pub pm1_0: u16,
    pub pm2_5: u16,
    pub pm10: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParticleCounts {
    pub count_03um: u16,
    pub count_05um: u16,
    pub count_10um: u16,
    pub count_25um: u16,
    pub count_50um: u16,
    pub count_100um: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadingView {
    pub pm_cf: MassConcentration,
    pub pm_ae: MassConcentration,
    pub counts: ParticleCounts,
    /// Capture time, milliseconds since service start. 0 means no reading yet.
    pub timestamp: u64,
}

pub fn render(snapshot: &Snapshot) -> ReadingView {
    let r = &snapshot.record;
    ReadingView {
        pm_cf: MassConcentration {
            pm1_0: r.pm1_0_cf1,
            pm2_5: r.pm2_5_cf1,
            pm10: r.pm10_cf1,
        },
        pm_ae: MassConcentration {
            pm1_0: r.pm1_0_ae,
            pm2_5: r.pm2_5_ae,
            pm10: r.pm10_ae,
        },
        counts: ParticleCounts {
            count_03um: r.count_03um,
            count_05um: r.count_05um,
            count_10um: r.count_10um,
            count_25um: r.count_25um,
            count_50um: r.count_50um,
            count_100um: r.count_100um,
        },
        timestamp: snapshot.captured_at_ms,
    }
}

/// Renders whatever is currently published.
pub fn render_current(shared: &SharedReading) -> ReadingView {
    render(&shared.read())
}
