//! Segmentation and reassembly of oversized payloads.
//!
//! Segmentable types replace the object count with segment flags:
//!
//! ```text
//! | LAST (7) | FIRST (6) | sequence (5..0) |
//! ```
//!
//! The receiver keeps one buffer per link direction. Lost, reordered or
//! foreign segments never fail the link: the buffer is dropped and the next
//! first segment starts over.

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use crate::error::EncodeError;
use crate::types::Cause;

/// Segment sequence numbers wrap at this value.
pub const SEQUENCE_MODULUS: u8 = 64;

/// Flags carried in the qualifier byte of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SegmentFlags {
    /// First segment of a payload
    pub first: bool,
    /// Last segment of a payload
    pub last: bool,
    /// Sequence number (0-63)
    pub sequence: u8,
}

impl SegmentFlags {
    /// Flags of a payload sent in one frame.
    pub const SINGLE: Self = Self {
        first: true,
        last: true,
        sequence: 0,
    };

    /// Parse from a qualifier byte.
    #[inline]
    pub const fn from_u8(byte: u8) -> Self {
        Self {
            first: (byte & 0x40) != 0,
            last: (byte & 0x80) != 0,
            sequence: byte & 0x3F,
        }
    }

    /// Encode to a qualifier byte.
    #[inline]
    pub const fn as_u8(&self) -> u8 {
        (self.sequence & 0x3F)
            | if self.first { 0x40 } else { 0 }
            | if self.last { 0x80 } else { 0 }
    }
}

/// Iterator over the segments of one payload.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    remaining: &'a [u8],
    max: usize,
    sequence: u8,
    first: bool,
    done: bool,
}

impl<'a> Iterator for Segments<'a> {
    type Item = (SegmentFlags, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let (chunk, rest) = self.remaining.split_at(self.remaining.len().min(self.max));
        self.remaining = rest;
        let flags = SegmentFlags {
            first: self.first,
            last: rest.is_empty(),
            sequence: self.sequence,
        };
        self.first = false;
        self.sequence = (self.sequence + 1) % SEQUENCE_MODULUS;
        self.done = flags.last;
        Some((flags, chunk))
    }
}

/// Split `payload` into chunks of at most `max` bytes.
///
/// Sequence numbers start at 0. An empty payload still yields one frame with
/// both flags set.
pub fn split(payload: &[u8], max: usize) -> Result<Segments<'_>, EncodeError> {
    if max == 0 {
        return Err(EncodeError::out_of_range("max segment size", max));
    }
    Ok(Segments {
        remaining: payload,
        max,
        sequence: 0,
        first: true,
        done: false,
    })
}

/// Identity of a segmented transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentKey {
    /// Raw type id
    pub type_id: u8,
    /// Cause of transmission
    pub cause: Cause,
    /// Common address
    pub address: u16,
}

/// Why a segment was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Continuation without a preceding first segment
    NoBuffer,
    /// Continuation of a different transfer
    KeyMismatch,
    /// Sequence number gap
    OutOfSequence {
        /// Sequence number the buffer waited for
        expected: u8,
        /// Sequence number received
        actual: u8,
    },
}

impl std::fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoBuffer => f.write_str("no segment buffer open"),
            Self::KeyMismatch => f.write_str("type, cause or address mismatch"),
            Self::OutOfSequence { expected, actual } => {
                write!(f, "expected sequence {expected}, got {actual}")
            }
        }
    }
}

/// Outcome of feeding one segment to a [`Reassembler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Last segment received; the full payload
    Complete(BytesMut),
    /// Segment buffered, more to come
    Pending,
    /// Retransmission of the previous frame, ignored
    Duplicate,
    /// Segment dropped and buffer cleared
    Discarded(DiscardReason),
}

/// Open transfer.
#[derive(Debug, Clone)]
pub struct SegmentBuffer {
    /// Transfer identity
    pub key: SegmentKey,
    /// Sequence number of the last accepted segment
    pub last_sequence: u8,
    /// Payload bytes received so far
    pub accumulated: BytesMut,
    /// Last accepted frame, for retransmit detection
    pub last_frame: Bytes,
}

#[derive(Debug, Clone, Default)]
enum State {
    #[default]
    Idle,
    Accumulating(SegmentBuffer),
}

/// Receive-side segment state machine.
#[derive(Debug, Clone, Default)]
pub struct Reassembler {
    state: State,
}

impl Reassembler {
    /// Create an idle reassembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no transfer is open.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    /// Open transfer, if any.
    pub fn buffer(&self) -> Option<&SegmentBuffer> {
        match &self.state {
            State::Idle => None,
            State::Accumulating(buffer) => Some(buffer),
        }
    }

    /// Drop any open transfer.
    pub fn reset(&mut self) {
        if let State::Accumulating(buffer) = std::mem::take(&mut self.state) {
            debug!(
                type_id = buffer.key.type_id,
                address = buffer.key.address,
                buffered = buffer.accumulated.len(),
                "Segment buffer reset"
            );
        }
    }

    /// Feed one segment.
    ///
    /// `chunk` is the payload part of the segment and `frame` the complete
    /// received frame it came from.
    pub fn accept(
        &mut self,
        key: SegmentKey,
        flags: SegmentFlags,
        chunk: &[u8],
        frame: &[u8],
    ) -> Progress {
        if flags.first {
            self.open(key, flags, chunk, frame)
        } else {
            self.continue_with(key, flags, chunk, frame)
        }
    }

    fn open(&mut self, key: SegmentKey, flags: SegmentFlags, chunk: &[u8], frame: &[u8]) -> Progress {
        if let State::Accumulating(buffer) = &self.state {
            if buffer.key != key {
                warn!(
                    old_type_id = buffer.key.type_id,
                    old_address = buffer.key.address,
                    type_id = key.type_id,
                    address = key.address,
                    dropped = buffer.accumulated.len(),
                    "Segment buffer replaced by new transfer"
                );
            } else {
                debug!(
                    type_id = key.type_id,
                    address = key.address,
                    "First segment repeated, restarting transfer"
                );
            }
        }

        if flags.last {
            self.state = State::Idle;
            return Progress::Complete(BytesMut::from(chunk));
        }

        self.state = State::Accumulating(SegmentBuffer {
            key,
            last_sequence: flags.sequence,
            accumulated: BytesMut::from(chunk),
            last_frame: Bytes::copy_from_slice(frame),
        });
        Progress::Pending
    }

    fn continue_with(
        &mut self,
        key: SegmentKey,
        flags: SegmentFlags,
        chunk: &[u8],
        frame: &[u8],
    ) -> Progress {
        let buffer = match &mut self.state {
            State::Idle => {
                warn!(
                    type_id = key.type_id,
                    address = key.address,
                    sequence = flags.sequence,
                    "Segment discarded: {}",
                    DiscardReason::NoBuffer
                );
                return Progress::Discarded(DiscardReason::NoBuffer);
            }
            State::Accumulating(buffer) => buffer,
        };

        if buffer.last_frame.as_ref() == frame {
            debug!(
                type_id = key.type_id,
                address = key.address,
                sequence = flags.sequence,
                "Duplicate segment ignored"
            );
            return Progress::Duplicate;
        }

        let expected = (buffer.last_sequence + 1) % SEQUENCE_MODULUS;
        let reason = if buffer.key != key {
            Some(DiscardReason::KeyMismatch)
        } else if flags.sequence != expected {
            Some(DiscardReason::OutOfSequence {
                expected,
                actual: flags.sequence,
            })
        } else {
            None
        };
        if let Some(reason) = reason {
            warn!(
                type_id = buffer.key.type_id,
                address = buffer.key.address,
                dropped = buffer.accumulated.len(),
                "Segment discarded: {}",
                reason
            );
            self.state = State::Idle;
            return Progress::Discarded(reason);
        }

        buffer.accumulated.extend_from_slice(chunk);
        if flags.last {
            let payload = std::mem::take(&mut buffer.accumulated);
            self.state = State::Idle;
            return Progress::Complete(payload);
        }
        buffer.last_sequence = flags.sequence;
        buffer.last_frame = Bytes::copy_from_slice(frame);
        Progress::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CauseType;
    use tracing_test::traced_test;

    fn key(address: u16) -> SegmentKey {
        SegmentKey {
            type_id: 81,
            cause: Cause::new(CauseType::Authentication),
            address,
        }
    }

    // Stand-in for a received frame: a header byte in front of the chunk
    fn frame(flags: SegmentFlags, chunk: &[u8]) -> Vec<u8> {
        let mut out = vec![flags.as_u8()];
        out.extend_from_slice(chunk);
        out
    }

    fn reassemble(reassembler: &mut Reassembler, payload: &[u8], max: usize) -> Option<BytesMut> {
        let mut result = None;
        for (flags, chunk) in split(payload, max).unwrap() {
            match reassembler.accept(key(1), flags, chunk, &frame(flags, chunk)) {
                Progress::Complete(bytes) => result = Some(bytes),
                Progress::Pending => {}
                other => panic!("unexpected {:?}", other),
            }
        }
        result
    }

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_three_part_split() {
        let data = payload(300);
        let segments: Vec<_> = split(&data, 128).unwrap().collect();
        assert_eq!(segments.len(), 3);

        assert_eq!(
            segments[0].0,
            SegmentFlags {
                first: true,
                last: false,
                sequence: 0
            }
        );
        assert_eq!(
            segments[1].0,
            SegmentFlags {
                first: false,
                last: false,
                sequence: 1
            }
        );
        assert_eq!(
            segments[2].0,
            SegmentFlags {
                first: false,
                last: true,
                sequence: 2
            }
        );
        assert_eq!(segments[2].1.len(), 44);

        let mut reassembler = Reassembler::new();
        assert_eq!(reassemble(&mut reassembler, &data, 128).unwrap(), &data[..]);
        assert!(reassembler.is_idle());
    }

    #[test]
    fn test_split_reassemble_idempotent() {
        let max = 16;
        for n in [0, 1, 5] {
            for r in [1, 7, max - 1] {
                let data = payload(n * max + r);
                let mut reassembler = Reassembler::new();
                let out = reassemble(&mut reassembler, &data, max).unwrap();
                assert_eq!(&out[..], &data[..], "N={} r={}", n, r);
            }
        }
    }

    #[test]
    fn test_single_and_empty_payload() {
        let segments: Vec<_> = split(&[1, 2, 3], 10).unwrap().collect();
        assert_eq!(segments, vec![(SegmentFlags::SINGLE, &[1u8, 2, 3][..])]);

        let segments: Vec<_> = split(&[], 10).unwrap().collect();
        assert_eq!(segments, vec![(SegmentFlags::SINGLE, &[][..])]);

        // Exact multiple leaves no empty trailing segment
        let data = payload(20);
        let segments: Vec<_> = split(&data, 10).unwrap().collect();
        assert_eq!(segments.len(), 2);
        assert!(segments[1].0.last);

        assert!(matches!(
            split(&data, 0),
            Err(EncodeError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_sequence_wraps() {
        let data = payload(70);
        let segments: Vec<_> = split(&data, 1).unwrap().collect();
        assert_eq!(segments[63].0.sequence, 63);
        assert_eq!(segments[64].0.sequence, 0);
        assert_eq!(segments[69].0.sequence, 5);

        let mut reassembler = Reassembler::new();
        assert_eq!(reassemble(&mut reassembler, &data, 1).unwrap(), &data[..]);
    }

    #[test]
    fn test_flags_byte() {
        let flags = SegmentFlags {
            first: true,
            last: false,
            sequence: 5,
        };
        assert_eq!(flags.as_u8(), 0x45);
        assert_eq!(SegmentFlags::from_u8(0x45), flags);
        assert_eq!(SegmentFlags::SINGLE.as_u8(), 0xC0);
        assert_eq!(SegmentFlags::from_u8(0xBF).sequence, 63);
    }

    #[traced_test]
    #[test]
    fn test_duplicate_continuation_ignored() {
        let data = payload(30);
        let segments: Vec<_> = split(&data, 10).unwrap().collect();
        let mut reassembler = Reassembler::new();

        let (flags, chunk) = segments[0];
        assert_eq!(reassembler.accept(key(1), flags, chunk, &frame(flags, chunk)), Progress::Pending);

        let (flags, chunk) = segments[1];
        let second = frame(flags, chunk);
        assert_eq!(reassembler.accept(key(1), flags, chunk, &second), Progress::Pending);
        assert_eq!(reassembler.accept(key(1), flags, chunk, &second), Progress::Duplicate);
        assert_eq!(reassembler.buffer().map(|b| b.accumulated.len()), Some(20));

        let (flags, chunk) = segments[2];
        match reassembler.accept(key(1), flags, chunk, &frame(flags, chunk)) {
            Progress::Complete(out) => assert_eq!(&out[..], &data[..]),
            other => panic!("unexpected {:?}", other),
        }
        assert!(logs_contain("Duplicate segment ignored"));
    }

    #[traced_test]
    #[test]
    fn test_key_mismatch_discards() {
        let data = payload(30);
        let segments: Vec<_> = split(&data, 10).unwrap().collect();
        let mut reassembler = Reassembler::new();

        let (flags, chunk) = segments[0];
        reassembler.accept(key(1), flags, chunk, &frame(flags, chunk));

        let (flags, chunk) = segments[1];
        assert_eq!(
            reassembler.accept(key(2), flags, chunk, &frame(flags, chunk)),
            Progress::Discarded(DiscardReason::KeyMismatch)
        );
        assert!(reassembler.is_idle());
        assert!(logs_contain("Segment discarded"));

        // Ready for a fresh transfer
        assert_eq!(reassemble(&mut reassembler, &data, 10).unwrap(), &data[..]);
    }

    #[traced_test]
    #[test]
    fn test_sequence_gap_discards() {
        let data = payload(30);
        let segments: Vec<_> = split(&data, 10).unwrap().collect();
        let mut reassembler = Reassembler::new();

        let (flags, chunk) = segments[0];
        reassembler.accept(key(1), flags, chunk, &frame(flags, chunk));

        let (flags, chunk) = segments[2];
        assert_eq!(
            reassembler.accept(key(1), flags, chunk, &frame(flags, chunk)),
            Progress::Discarded(DiscardReason::OutOfSequence {
                expected: 1,
                actual: 2
            })
        );
        assert!(reassembler.is_idle());
        assert!(logs_contain("expected sequence 1, got 2"));
    }

    #[traced_test]
    #[test]
    fn test_continuation_without_buffer() {
        let mut reassembler = Reassembler::new();
        let flags = SegmentFlags {
            first: false,
            last: true,
            sequence: 1,
        };
        assert_eq!(
            reassembler.accept(key(1), flags, &[1], &frame(flags, &[1])),
            Progress::Discarded(DiscardReason::NoBuffer)
        );
        assert!(logs_contain("no segment buffer open"));
    }

    #[traced_test]
    #[test]
    fn test_new_first_segment_replaces_buffer() {
        let data = payload(30);
        let segments: Vec<_> = split(&data, 10).unwrap().collect();
        let mut reassembler = Reassembler::new();

        let (flags, chunk) = segments[0];
        reassembler.accept(key(1), flags, chunk, &frame(flags, chunk));
        let (flags, chunk) = segments[0];
        assert_eq!(reassembler.accept(key(2), flags, chunk, &frame(flags, chunk)), Progress::Pending);
        assert!(logs_contain("Segment buffer replaced by new transfer"));
        assert_eq!(reassembler.buffer().map(|b| b.key), Some(key(2)));

        // Same key restarts without duplicating bytes
        assert_eq!(reassembler.accept(key(2), flags, chunk, &frame(flags, chunk)), Progress::Pending);
        assert_eq!(reassembler.buffer().map(|b| b.accumulated.len()), Some(10));
        assert!(logs_contain("restarting transfer"));

        reassembler.reset();
        assert!(reassembler.is_idle());
    }
}
