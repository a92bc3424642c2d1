use serde::Deserialize;

/// Start-of-frame marker, `"BM"`.
pub const FRAME_MARKER: [u8; 2] = [0x42, 0x4D];
pub const FRAME_LEN: usize = 32;
/// Length the sensor declares in bytes 2..4: everything after the length field.
pub const PAYLOAD_LEN: u16 = 28;

const CHECKSUM_OFFSET: usize = FRAME_LEN - 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    /// Marker and declared length only.
    #[default]
    Lenient,
    /// Also require the trailing checksum to match.
    Strict,
}

/// A 32-byte window that passed validation. Only [`RawFrame::validate`] builds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame([u8; FRAME_LEN]);

impl RawFrame {
    /// Checks the window at the start of `bytes`. Returns `None` when fewer than
    /// 32 bytes are available or the window is not a frame under `policy`.
    pub fn validate(bytes: &[u8], policy: ChecksumPolicy) -> Option<Self> {
        let window: [u8; FRAME_LEN] = bytes.get(..FRAME_LEN)?.try_into().ok()?;
        let frame = Self(window);
        if window[..2] != FRAME_MARKER || frame.declared_len() != PAYLOAD_LEN {
            return None;
        }
        if policy == ChecksumPolicy::Strict && frame.checksum() != frame.computed_checksum() {
            return None;
        }
        Some(frame)
    }

    pub fn declared_len(&self) -> u16 {
        be_u16(&self.0, 2)
    }

    /// Checksum carried in the last two bytes.
    pub fn checksum(&self) -> u16 {
        be_u16(&self.0, CHECKSUM_OFFSET)
    }

    /// Wrapping sum of every byte before the checksum field.
    pub fn computed_checksum(&self) -> u16 {
        self.0[..CHECKSUM_OFFSET]
            .iter()
            .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)))
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }
}

pub(crate) fn be_u16(bytes: &[u8; FRAME_LEN], offset: usize) -> u16 {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}
