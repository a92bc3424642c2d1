use std::fmt;

use crate::frame::{be_u16, RawFrame};

/// One sensor reading. Mass concentrations are µg/m³, counts are particles
/// per 0.1 L of air at or above the named diameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeasurementRecord {
    pub pm1_0_cf1: u16,
    pub pm2_5_cf1: u16,
    pub pm10_cf1: u16,
    pub pm1_0_ae: u16,
    pub pm2_5_ae: u16,
    pub pm10_ae: u16,
    pub count_03um: u16,
    pub count_05um: u16,
    pub count_10um: u16,
    pub count_25um: u16,
    pub count_50um: u16,
    pub count_100um: u16,
}

/// Decodes the twelve big-endian fields at frame offsets 4..28.
pub fn decode(frame: &RawFrame) -> MeasurementRecord {
    let b = frame.as_bytes();
    let field = |n: usize| be_u16(b, 4 + n * 2);
    MeasurementRecord {
        pm1_0_cf1: field(0),
        pm2_5_cf1: field(1),
        pm10_cf1: field(2),
        pm1_0_ae: field(3),
        pm2_5_ae: field(4),
        pm10_ae: field(5),
        count_03um: field(6),
        count_05um: field(7),
        count_10um: field(8),
        count_25um: field(9),
        count_50um: field(10),
        count_100um: field(11),
    }
}

impl fmt::Display for MeasurementRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "PM_CF: 1.0={:3}  2.5={:3}  10={:3}",
            self.pm1_0_cf1, self.pm2_5_cf1, self.pm10_cf1
        )?;
        writeln!(
            f,
            "PM_AE: 1.0={:3}  2.5={:3}  10={:3}",
            self.pm1_0_ae, self.pm2_5_ae, self.pm10_ae
        )?;
        writeln!(
            f,
            "Counts/0.1L: >=0.3um={:5}  >=0.5um={:5}  >=1.0um={:5}",
            self.count_03um, self.count_05um, self.count_10um
        )?;
        write!(
            f,
            "             >=2.5um={:5}  >=5.0um={:5}  >=10um={:5}",
            self.count_25um, self.count_50um, self.count_100um
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::tests::frame_bytes;
    use crate::ChecksumPolicy;

    fn validated(bytes: &[u8]) -> RawFrame {
        RawFrame::validate(bytes, ChecksumPolicy::Lenient).unwrap()
    }

    #[test]
    fn all_zero_payload_decodes_to_default() {
        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(&[0x42, 0x4D, 0x00, 0x1C]);
        assert_eq!(decode(&validated(&bytes)), MeasurementRecord::default());
    }

    #[test]
    fn fields_follow_big_endian_pairs_in_order() {
        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(&[0x42, 0x4D, 0x00, 0x1C]);
        for (i, b) in bytes[4..28].iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(37).wrapping_add(3);
        }
        let rec = decode(&validated(&bytes));
        let pair = |n: usize| u16::from(bytes[4 + 2 * n]) << 8 | u16::from(bytes[5 + 2 * n]);
        let got = [
            rec.pm1_0_cf1,
            rec.pm2_5_cf1,
            rec.pm10_cf1,
            rec.pm1_0_ae,
            rec.pm2_5_ae,
            rec.pm10_ae,
            rec.count_03um,
            rec.count_05um,
            rec.count_10um,
            rec.count_25um,
            rec.count_50um,
            rec.count_100um,
        ];
        for (n, value) in got.iter().enumerate() {
            assert_eq!(*value, pair(n), "field {n}");
        }
    }

    #[test]
    fn high_byte_values_survive() {
        let bytes = frame_bytes([0xFFFF, 0x0100, 0x00FF, 1, 2, 3, 4, 5, 6, 7, 8, 0xABCD]);
        let rec = decode(&validated(&bytes));
        assert_eq!(rec.pm1_0_cf1, 0xFFFF);
        assert_eq!(rec.pm2_5_cf1, 0x0100);
        assert_eq!(rec.pm10_cf1, 0x00FF);
        assert_eq!(rec.count_100um, 0xABCD);
    }

    #[test]
    fn decoding_is_repeatable() {
        let frame = validated(&frame_bytes([12, 18, 20, 11, 17, 20, 2034, 600, 120, 9, 2, 1]));
        assert_eq!(decode(&frame), decode(&frame));
    }

    #[test]
    fn summary_mentions_every_group() {
        let rec = MeasurementRecord {
            pm2_5_ae: 17,
            count_100um: 4,
            ..Default::default()
        };
        let text = rec.to_string();
        assert!(text.starts_with("PM_CF:"));
        assert!(text.contains("PM_AE: 1.0=  0  2.5= 17"));
        assert!(text.contains(">=10um=    4"));
        assert_eq!(text.lines().count(), 4);
    }
}
