use crate::frame::{ChecksumPolicy, RawFrame, FRAME_LEN, FRAME_MARKER};

/// A frame found by the scanner and where it started in the scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub offset: usize,
    pub frame: RawFrame,
}

/// Walks a buffer left to right yielding every valid frame.
///
/// After a hit the cursor jumps past the whole frame; on a miss it slips by a
/// single byte, which is how it resynchronizes after garbage or a partial
/// frame. The cursor stops once fewer than [`FRAME_LEN`] bytes remain, so it
/// never looks beyond the end of the buffer.
#[derive(Debug, Clone)]
pub struct FrameScanner<'a> {
    buf: &'a [u8],
    pos: usize,
    policy: ChecksumPolicy,
    rejected: usize,
}

/// Starts a fresh scan over `buf`.
pub fn scan(buf: &[u8], policy: ChecksumPolicy) -> FrameScanner<'_> {
    FrameScanner {
        buf,
        pos: 0,
        policy,
        rejected: 0,
    }
}

impl FrameScanner<'_> {
    /// Marker hits so far that failed the length or checksum check.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

impl Iterator for FrameScanner<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        while self.pos + FRAME_LEN <= self.buf.len() {
            let offset = self.pos;
            let window = &self.buf[offset..offset + FRAME_LEN];
            if window[..2] == FRAME_MARKER {
                if let Some(frame) = RawFrame::validate(window, self.policy) {
                    self.pos += FRAME_LEN;
                    return Some(Candidate { offset, frame });
                }
                self.rejected += 1;
            }
            self.pos += 1;
        }
        None
    }
}
