//! Information elements of the IEC 60870-5-103 companion standard.
//!
//! Protection equipment reports carry their own four-octet time, so unlike
//! 101/104 the time tag is an element field.

use bytes::{BufMut, BytesMut};

use crate::error::{DecodeError, EncodeError};
use crate::types::primitive::{decode_float, encode_float, read_u16, read_u8, take, zero_pad};
use crate::types::{DoublePointValue, TimeWidth, Timestamp};

/// Divisor of the 13-bit measurand value.
const MEASURAND_SCALE: f32 = 4096.0;

/// Length of the identification text.
pub const IDENTIFICATION_TEXT_LEN: usize = 8;

/// Length of the manufacturer specific software identification.
pub const SOFTWARE_ID_LEN: usize = 4;

/// Measurand with quality descriptor (MEA).
///
/// ```text
/// | 15 .. 3          | 2   | 1  | 0  |
/// | value (I13, /4096) | RES | ER | OV |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurand {
    /// Value in `[-1.0, 1.0)`
    pub value: f32,
    /// Overflow (OV)
    pub overflow: bool,
    /// Error (ER)
    pub error: bool,
}

impl Measurand {
    /// Create a measurand with clear flags.
    pub const fn new(value: f32) -> Self {
        Self {
            value,
            overflow: false,
            error: false,
        }
    }

    fn decode(src: &mut &[u8]) -> Result<Self, DecodeError> {
        let raw = read_u16(src, "measurand")?;
        Ok(Self {
            value: ((raw as i16) >> 3) as f32 / MEASURAND_SCALE,
            overflow: (raw & 0x01) != 0,
            error: (raw & 0x02) != 0,
        })
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<(), EncodeError> {
        if !(-1.0..1.0).contains(&self.value) {
            return Err(EncodeError::out_of_range("measurand", self.value));
        }
        let scaled = ((self.value * MEASURAND_SCALE).round() as i16).min(4095);
        let flags = u16::from(self.overflow) | (u16::from(self.error) << 1);
        dst.put_u16_le(((scaled << 3) as u16) | flags);
        Ok(())
    }
}

/// Information element.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Time-tagged message (DPI + time + SIN)
    TimeTagged {
        state: DoublePointValue,
        time: Timestamp,
        supplementary: u8,
    },

    /// Time-tagged message with relative time (DPI + RET + FAN + time + SIN)
    RelativeTimeTagged {
        state: DoublePointValue,
        relative_ms: u16,
        fault_number: u16,
        time: Timestamp,
        supplementary: u8,
    },

    /// One measurand of Measurands I
    MeasurandI(Measurand),

    /// Fault location (SCL + RET + FAN + time)
    FaultLocation {
        distance: f32,
        relative_ms: u16,
        fault_number: u16,
        time: Timestamp,
    },

    /// Identification (COL + ASCII text + software id)
    Identification {
        compatibility: u8,
        text: [u8; IDENTIFICATION_TEXT_LEN],
        software: [u8; SOFTWARE_ID_LEN],
    },

    /// Time synchronization (CP56Time2a)
    ClockSync { time: Timestamp },

    /// General interrogation initiation (SCN)
    GeneralInterrogation { scan: u8 },

    /// General interrogation termination (SCN)
    InterrogationEnd { scan: u8 },

    /// One measurand of Measurands II
    MeasurandII(Measurand),

    /// General command (DCO + RII)
    GeneralCommand {
        state: DoublePointValue,
        return_id: u8,
    },
}

impl Element {
    /// Create an identification element. Text and software id shorter than
    /// their fields are zero padded.
    pub fn identification(compatibility: u8, text: &str, software: &[u8]) -> Result<Self, EncodeError> {
        Ok(Self::Identification {
            compatibility,
            text: zero_pad(text.as_bytes(), "identification text")?,
            software: zero_pad(software, "software identification")?,
        })
    }

    /// Time carried inside the element, if any.
    pub fn time(&self) -> Option<&Timestamp> {
        match self {
            Self::TimeTagged { time, .. }
            | Self::RelativeTimeTagged { time, .. }
            | Self::FaultLocation { time, .. }
            | Self::ClockSync { time } => Some(time),
            _ => None,
        }
    }
}

fn double_point(src: &mut &[u8], field: &'static str) -> Result<DoublePointValue, DecodeError> {
    Ok(DoublePointValue::from_u8(read_u8(src, field)?))
}

fn protection_time(src: &mut &[u8]) -> Result<Timestamp, DecodeError> {
    Timestamp::decode(src, TimeWidth::Cp32)
}

/// Decode one element for `type_id`.
pub(crate) fn decode(src: &mut &[u8], type_id: super::TypeId) -> Result<Element, DecodeError> {
    use super::TypeId;

    Ok(match type_id {
        TypeId::TimeTagged => Element::TimeTagged {
            state: double_point(src, "double-point information")?,
            time: protection_time(src)?,
            supplementary: read_u8(src, "supplementary information")?,
        },
        TypeId::RelativeTimeTagged => Element::RelativeTimeTagged {
            state: double_point(src, "double-point information")?,
            relative_ms: read_u16(src, "relative time")?,
            fault_number: read_u16(src, "fault number")?,
            time: protection_time(src)?,
            supplementary: read_u8(src, "supplementary information")?,
        },
        TypeId::MeasurandsI => Element::MeasurandI(Measurand::decode(src)?),
        TypeId::FaultLocation => Element::FaultLocation {
            distance: decode_float(src)?,
            relative_ms: read_u16(src, "relative time")?,
            fault_number: read_u16(src, "fault number")?,
            time: protection_time(src)?,
        },
        TypeId::Identification => {
            let compatibility = read_u8(src, "compatibility level")?;
            let mut text = [0u8; IDENTIFICATION_TEXT_LEN];
            text.copy_from_slice(take(src, IDENTIFICATION_TEXT_LEN, "identification text")?);
            let mut software = [0u8; SOFTWARE_ID_LEN];
            software.copy_from_slice(take(src, SOFTWARE_ID_LEN, "software identification")?);
            Element::Identification {
                compatibility,
                text,
                software,
            }
        }
        TypeId::ClockSync => Element::ClockSync {
            time: Timestamp::decode(src, TimeWidth::Cp56)?,
        },
        TypeId::GeneralInterrogation => Element::GeneralInterrogation {
            scan: read_u8(src, "scan number")?,
        },
        TypeId::InterrogationEnd => Element::InterrogationEnd {
            scan: read_u8(src, "scan number")?,
        },
        TypeId::MeasurandsII => Element::MeasurandII(Measurand::decode(src)?),
        TypeId::GeneralCommand => Element::GeneralCommand {
            state: double_point(src, "double command")?,
            return_id: read_u8(src, "return information identifier")?,
        },
    })
}

/// Encode `element`. The caller has checked that it matches the type.
pub(crate) fn encode(element: &Element, dst: &mut BytesMut) -> Result<(), EncodeError> {
    // Fields are staged so a failing time tag leaves `dst` untouched.
    let mut buf = BytesMut::new();
    match element {
        Element::TimeTagged {
            state,
            time,
            supplementary,
        } => {
            buf.put_u8(state.as_u8());
            time.encode(TimeWidth::Cp32, &mut buf)?;
            buf.put_u8(*supplementary);
        }
        Element::RelativeTimeTagged {
            state,
            relative_ms,
            fault_number,
            time,
            supplementary,
        } => {
            buf.put_u8(state.as_u8());
            buf.put_u16_le(*relative_ms);
            buf.put_u16_le(*fault_number);
            time.encode(TimeWidth::Cp32, &mut buf)?;
            buf.put_u8(*supplementary);
        }
        Element::MeasurandI(measurand) | Element::MeasurandII(measurand) => measurand.encode(&mut buf)?,
        Element::FaultLocation {
            distance,
            relative_ms,
            fault_number,
            time,
        } => {
            encode_float(*distance, &mut buf);
            buf.put_u16_le(*relative_ms);
            buf.put_u16_le(*fault_number);
            time.encode(TimeWidth::Cp32, &mut buf)?;
        }
        Element::Identification {
            compatibility,
            text,
            software,
        } => {
            buf.put_u8(*compatibility);
            buf.put_slice(text);
            buf.put_slice(software);
        }
        Element::ClockSync { time } => time.encode(TimeWidth::Cp56, &mut buf)?,
        Element::GeneralInterrogation { scan } | Element::InterrogationEnd { scan } => buf.put_u8(*scan),
        Element::GeneralCommand { state, return_id } => {
            buf.put_u8(state.as_u8());
            buf.put_u8(*return_id);
        }
    }
    dst.put_slice(&buf);
    Ok(())
}
