//! Primitive information element codecs.
//!
//! Fixed-point numbers, bitstrings, step positions, double-point states and
//! command qualifiers as defined by IEC 60870-5-4. All multi-byte values are
//! little-endian on the wire.
//!
//! Decoders take a `&mut &[u8]` cursor and advance it past the consumed
//! bytes, so the slice left behind is the rest of the frame.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{DecodeError, EncodeError};

/// Divisor of the normalized value (NVA) encoding.
pub const NORMALIZED_SCALE: f32 = 32767.0;

/// Check that `src` holds at least `needed` bytes.
#[inline]
pub(crate) fn ensure(src: &[u8], needed: usize, field: &'static str) -> Result<(), DecodeError> {
    if src.len() < needed {
        Err(DecodeError::truncated(field, needed, src.len()))
    } else {
        Ok(())
    }
}

#[inline]
pub(crate) fn read_u8(src: &mut &[u8], field: &'static str) -> Result<u8, DecodeError> {
    ensure(src, 1, field)?;
    Ok(src.get_u8())
}

#[inline]
pub(crate) fn read_u16(src: &mut &[u8], field: &'static str) -> Result<u16, DecodeError> {
    ensure(src, 2, field)?;
    Ok(src.get_u16_le())
}

#[inline]
pub(crate) fn read_u32(src: &mut &[u8], field: &'static str) -> Result<u32, DecodeError> {
    ensure(src, 4, field)?;
    Ok(src.get_u32_le())
}

/// Split `len` bytes off the front of `src`.
#[inline]
pub(crate) fn take<'a>(
    src: &mut &'a [u8],
    len: usize,
    field: &'static str,
) -> Result<&'a [u8], DecodeError> {
    ensure(src, len, field)?;
    let (head, tail) = src.split_at(len);
    *src = tail;
    Ok(head)
}

/// Copy `src` into a fixed `N`-byte array, filling the tail with zeros.
///
/// This is the only padding rule used for fixed-width byte arrays. Input
/// longer than `N` is rejected rather than truncated.
pub fn zero_pad<const N: usize>(src: &[u8], field: &'static str) -> Result<[u8; N], EncodeError> {
    if src.len() > N {
        return Err(EncodeError::out_of_range(
            field,
            format!("{} bytes (max {})", src.len(), N),
        ));
    }
    let mut out = [0u8; N];
    out[..src.len()].copy_from_slice(src);
    Ok(out)
}

/// Decode a normalized value (NVA): `int16 / 32767`.
#[inline]
pub fn decode_normalized(src: &mut &[u8]) -> Result<f32, DecodeError> {
    let raw = read_u16(src, "normalized value")? as i16;
    Ok(raw as f32 / NORMALIZED_SCALE)
}

/// Smallest normalized value a wire NVA can carry (`-32768 / 32767`).
pub const NORMALIZED_MIN: f32 = i16::MIN as f32 / NORMALIZED_SCALE;

/// Encode a normalized value (NVA).
///
/// Accepts the whole decodable range `NORMALIZED_MIN..=1.0`, so every
/// decoded value encodes back to the same two bytes.
pub fn encode_normalized(value: f32, dst: &mut BytesMut) -> Result<(), EncodeError> {
    if !(NORMALIZED_MIN..=1.0).contains(&value) {
        return Err(EncodeError::out_of_range("normalized value", value));
    }
    dst.put_i16_le((value * NORMALIZED_SCALE).round() as i16);
    Ok(())
}

/// Decode a scaled value (SVA).
#[inline]
pub fn decode_scaled(src: &mut &[u8]) -> Result<i16, DecodeError> {
    Ok(read_u16(src, "scaled value")? as i16)
}

/// Encode a scaled value (SVA).
#[inline]
pub fn encode_scaled(value: i16, dst: &mut BytesMut) {
    dst.put_i16_le(value);
}

/// Decode an IEEE 754 short floating point value.
#[inline]
pub fn decode_float(src: &mut &[u8]) -> Result<f32, DecodeError> {
    Ok(f32::from_bits(read_u32(src, "floating value")?))
}

/// Encode an IEEE 754 short floating point value.
#[inline]
pub fn encode_float(value: f32, dst: &mut BytesMut) {
    dst.put_f32_le(value);
}

/// Decode a binary counter reading (BCR counter part).
#[inline]
pub fn decode_counter(src: &mut &[u8]) -> Result<i32, DecodeError> {
    Ok(read_u32(src, "binary counter")? as i32)
}

/// Encode a binary counter reading (BCR counter part).
#[inline]
pub fn encode_counter(value: i32, dst: &mut BytesMut) {
    dst.put_i32_le(value);
}

/// Bitstring of 32 bits (BSI).
///
/// Bit `n` lives in byte `n / 8` at position `n % 8` (LSB first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitstring32(pub [u8; 4]);

impl Bitstring32 {
    /// Create from a 32-bit integer (little-endian byte order).
    #[inline]
    pub const fn from_u32(value: u32) -> Self {
        Self(value.to_le_bytes())
    }

    /// Get the value as a 32-bit integer.
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    /// Create from up to 4 bytes, zero-padding the rest.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EncodeError> {
        Ok(Self(zero_pad::<4>(bytes, "bitstring")?))
    }

    /// Create from up to 32 bits, zero-padding the rest.
    pub fn from_bits(bits: &[bool]) -> Result<Self, EncodeError> {
        if bits.len() > 32 {
            return Err(EncodeError::out_of_range(
                "bitstring",
                format!("{} bits (max 32)", bits.len()),
            ));
        }
        let mut out = [0u8; 4];
        for (index, _) in bits.iter().enumerate().filter(|(_, set)| **set) {
            out[index / 8] |= 1 << (index % 8);
        }
        Ok(Self(out))
    }

    /// Get bit `index` (0-31). Out-of-range indices read as clear.
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        index < 32 && (self.0[index / 8] & (1 << (index % 8))) != 0
    }

    /// Decode 4 bytes.
    pub fn decode(src: &mut &[u8]) -> Result<Self, DecodeError> {
        let bytes = take(src, 4, "bitstring")?;
        Ok(Self([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Encode 4 bytes.
    #[inline]
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.put_slice(&self.0);
    }
}

/// Value with transient state indication (VTI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StepPosition {
    /// Step position (-64..=63)
    pub value: i8,
    /// Equipment is in transient state
    pub transient: bool,
}

impl StepPosition {
    /// Smallest representable step.
    pub const MIN: i8 = -64;
    /// Largest representable step.
    pub const MAX: i8 = 63;

    /// Create a new step position.
    #[inline]
    pub const fn new(value: i8, transient: bool) -> Self {
        Self { value, transient }
    }

    /// Parse from a VTI byte (I7 two's complement in bits 0-6).
    #[inline]
    pub const fn from_u8(byte: u8) -> Self {
        Self {
            value: ((byte << 1) as i8) >> 1,
            transient: (byte & 0x80) != 0,
        }
    }

    /// Encode to a VTI byte.
    pub fn to_u8(&self) -> Result<u8, EncodeError> {
        if !(Self::MIN..=Self::MAX).contains(&self.value) {
            return Err(EncodeError::out_of_range("step position", self.value));
        }
        Ok((self.value as u8 & 0x7F) | if self.transient { 0x80 } else { 0 })
    }
}

/// Double-point information / double command state (DPI, DCS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DoublePointValue {
    /// Indeterminate or intermediate (00)
    #[default]
    Indeterminate = 0,
    /// Determined OFF (01)
    Off = 1,
    /// Determined ON (10)
    On = 2,
    /// Indeterminate (11)
    IndeterminateOrFaulty = 3,
}

impl DoublePointValue {
    /// Parse from byte (lower 2 bits).
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            0 => Self::Indeterminate,
            1 => Self::Off,
            2 => Self::On,
            _ => Self::IndeterminateOrFaulty,
        }
    }

    /// Raw 2-bit value.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Qualifier shared by single, double and regulating step commands.
///
/// ```text
/// | S/E (7) | QU (6..2) | state (1..0) |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CommandQualifier {
    /// Select (true) or execute (false)
    pub select: bool,
    /// Qualifier of command (QU, 0-31)
    pub qualifier: u8,
}

impl CommandQualifier {
    /// Execute, no additional definition.
    pub const EXECUTE: Self = Self {
        select: false,
        qualifier: 0,
    };

    /// Select, no additional definition.
    pub const SELECT: Self = Self {
        select: true,
        qualifier: 0,
    };

    /// Parse from a command byte (ignores the state bits).
    #[inline]
    pub const fn from_u8(byte: u8) -> Self {
        Self {
            select: (byte & 0x80) != 0,
            qualifier: (byte >> 2) & 0x1F,
        }
    }

    /// Encode the qualifier bits (state bits left clear).
    pub fn to_bits(&self) -> Result<u8, EncodeError> {
        if self.qualifier > 0x1F {
            return Err(EncodeError::out_of_range("command qualifier", self.qualifier));
        }
        Ok((self.qualifier << 2) | if self.select { 0x80 } else { 0 })
    }
}

/// Qualifier of set-point command (QOS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SetpointQualifier {
    /// Select (true) or execute (false)
    pub select: bool,
    /// QL (0-127)
    pub qualifier: u8,
}

impl SetpointQualifier {
    /// Execute, default qualifier.
    pub const EXECUTE: Self = Self {
        select: false,
        qualifier: 0,
    };

    /// Parse from a QOS byte.
    #[inline]
    pub const fn from_u8(byte: u8) -> Self {
        Self {
            select: (byte & 0x80) != 0,
            qualifier: byte & 0x7F,
        }
    }

    /// Encode to a QOS byte.
    pub fn to_u8(&self) -> Result<u8, EncodeError> {
        if self.qualifier > 0x7F {
            return Err(EncodeError::out_of_range("set-point qualifier", self.qualifier));
        }
        Ok(self.qualifier | if self.select { 0x80 } else { 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_encoding() {
        let mut buf = BytesMut::new();
        encode_normalized(0.5, &mut buf).unwrap();
        // 0.5 * 32767 = 16383.5 -> 16384
        assert_eq!(&buf[..], &[0x00, 0x40]);

        let mut src = &buf[..];
        let value = decode_normalized(&mut src).unwrap();
        assert!((value - 0.5).abs() <= 1.0 / NORMALIZED_SCALE);
        assert!(src.is_empty());
    }

    #[test]
    fn test_normalized_tolerance() {
        for value in [-1.0f32, -0.75, -0.001, 0.0, 0.1234, 0.999] {
            let mut buf = BytesMut::new();
            encode_normalized(value, &mut buf).unwrap();
            let decoded = decode_normalized(&mut &buf[..]).unwrap();
            assert!(
                (decoded - value).abs() <= 1.0 / NORMALIZED_SCALE,
                "{} decoded as {}",
                value,
                decoded
            );
        }
    }

    #[test]
    fn test_normalized_wire_extremes() {
        for raw in [[0xFF, 0x7F], [0x00, 0x80], [0x01, 0x80]] {
            let value = decode_normalized(&mut &raw[..]).unwrap();
            let mut buf = BytesMut::new();
            encode_normalized(value, &mut buf).unwrap();
            assert_eq!(&buf[..], &raw[..], "{} re-encoded differently", value);
        }
        let mut buf = BytesMut::new();
        encode_normalized(1.0, &mut buf).unwrap();
        encode_normalized(NORMALIZED_MIN, &mut buf).unwrap();
        assert_eq!(&buf[..], &[0xFF, 0x7F, 0x00, 0x80]);
    }

    #[test]
    fn test_normalized_out_of_range() {
        let mut buf = BytesMut::new();
        for value in [1.0001f32, 1.5, -1.01, f32::NAN] {
            let err = encode_normalized(value, &mut buf).unwrap_err();
            assert!(matches!(err, EncodeError::ValueOutOfRange { .. }));
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn test_numeric_little_endian() {
        let mut buf = BytesMut::new();
        encode_scaled(-2, &mut buf);
        encode_float(23.5, &mut buf);
        encode_counter(123_456, &mut buf);
        assert_eq!(&buf[0..2], &[0xFE, 0xFF]);
        assert_eq!(&buf[2..6], &23.5f32.to_le_bytes());
        assert_eq!(&buf[6..10], &[0x40, 0xE2, 0x01, 0x00]);

        let mut src = &buf[..];
        assert_eq!(decode_scaled(&mut src).unwrap(), -2);
        assert_eq!(decode_float(&mut src).unwrap(), 23.5);
        assert_eq!(decode_counter(&mut src).unwrap(), 123_456);
        assert!(src.is_empty());
    }

    #[test]
    fn test_truncated_input() {
        let err = decode_float(&mut &[0x00, 0x01][..]).unwrap_err();
        assert_eq!(err, DecodeError::truncated("floating value", 4, 2));

        let err = decode_scaled(&mut &[][..]).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { needed: 2, .. }));

        assert!(Bitstring32::decode(&mut &[1, 2, 3][..]).is_err());
    }

    #[test]
    fn test_zero_pad() {
        assert_eq!(zero_pad::<4>(&[0xAA], "field").unwrap(), [0xAA, 0, 0, 0]);
        assert_eq!(zero_pad::<4>(&[], "field").unwrap(), [0; 4]);
        assert_eq!(zero_pad::<2>(&[1, 2], "field").unwrap(), [1, 2]);
        assert!(matches!(
            zero_pad::<2>(&[1, 2, 3], "field"),
            Err(EncodeError::ValueOutOfRange { field: "field", .. })
        ));
    }

    #[test]
    fn test_bitstring_bit_order() {
        let bits = Bitstring32::from_bits(&[true, false, false, false, false, false, false, false, true])
            .unwrap();
        assert_eq!(bits.0, [0x01, 0x01, 0x00, 0x00]);
        assert!(bits.bit(0));
        assert!(bits.bit(8));
        assert!(!bits.bit(1));
        assert!(!bits.bit(40));

        assert_eq!(Bitstring32::from_u32(0x1234_5678).0, [0x78, 0x56, 0x34, 0x12]);
        assert_eq!(Bitstring32::from_slice(&[0xFF]).unwrap().as_u32(), 0xFF);
        assert!(Bitstring32::from_bits(&[false; 33]).is_err());
    }

    #[test]
    fn test_step_position() {
        assert_eq!(StepPosition::from_u8(0x3F), StepPosition::new(63, false));
        assert_eq!(StepPosition::from_u8(0x40), StepPosition::new(-64, false));
        assert_eq!(StepPosition::from_u8(0xFF), StepPosition::new(-1, true));

        assert_eq!(StepPosition::new(-1, true).to_u8().unwrap(), 0xFF);
        assert_eq!(StepPosition::new(5, false).to_u8().unwrap(), 0x05);
        assert!(StepPosition::new(64, false).to_u8().is_err());
        assert!(StepPosition::new(-65, false).to_u8().is_err());
    }

    #[test]
    fn test_command_qualifiers() {
        let qualifier = CommandQualifier {
            select: true,
            qualifier: 1,
        };
        assert_eq!(qualifier.to_bits().unwrap(), 0x84);
        assert_eq!(CommandQualifier::from_u8(0x85), qualifier);
        assert!(CommandQualifier {
            select: false,
            qualifier: 32
        }
        .to_bits()
        .is_err());

        assert_eq!(SetpointQualifier::from_u8(0x81).qualifier, 1);
        assert!(SetpointQualifier::from_u8(0x81).select);
        assert!(SetpointQualifier {
            select: false,
            qualifier: 128
        }
        .to_u8()
        .is_err());
    }

    #[test]
    fn test_double_point_value() {
        assert_eq!(DoublePointValue::from_u8(0x02), DoublePointValue::On);
        assert_eq!(DoublePointValue::from_u8(0xF1), DoublePointValue::Off);
        assert_eq!(DoublePointValue::IndeterminateOrFaulty.as_u8(), 3);
    }
}
