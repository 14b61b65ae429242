//! Information elements of the IEC 60870-5-101 companion standard.
//!
//! IEC 60870-5-104 reuses the same element layouts, so both profiles share
//! [`Element`]. Field order follows the standard; time tags are handled
//! by the envelope, except for clock synchronization where the time is the
//! element itself.

use bytes::{BufMut, BytesMut};

use crate::error::{DecodeError, EncodeError};
use crate::types::primitive::{
    decode_counter, decode_float, decode_normalized, decode_scaled, encode_counter, encode_float,
    encode_normalized, encode_scaled, read_u16, read_u8,
};
use crate::types::{
    Bitstring32, CommandQualifier, DoublePointValue, Quality, QualityKind, SetpointQualifier,
    StepPosition, TimeWidth, Timestamp,
};

/// Qualifier of interrogation for station interrogation.
pub const STATION_INTERROGATION: u8 = 20;

/// Fixed test bit pattern (FBP).
pub const TEST_PATTERN: u16 = 0x55AA;

/// Regulating step command state (RCS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepDirection {
    /// Next step lower
    Lower = 1,
    /// Next step higher
    Higher = 2,
}

impl StepDirection {
    fn from_bits(bits: u8) -> Result<Self, DecodeError> {
        match bits & 0x03 {
            1 => Ok(Self::Lower),
            2 => Ok(Self::Higher),
            other => Err(DecodeError::InvalidValue {
                field: "regulating step state",
                value: other,
            }),
        }
    }
}

/// Information element.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Single-point information (SIQ)
    SinglePoint { value: bool, quality: Quality },

    /// Double-point information (DIQ)
    DoublePoint {
        value: DoublePointValue,
        quality: Quality,
    },

    /// Step position (VTI + QDS)
    StepPosition { value: StepPosition, quality: Quality },

    /// Bitstring of 32 bit (BSI + QDS)
    Bitstring { value: Bitstring32, quality: Quality },

    /// Normalized measured value (NVA), QDS absent for `M_ME_ND_1`
    Normalized {
        value: f32,
        quality: Option<Quality>,
    },

    /// Scaled measured value (SVA + QDS)
    Scaled { value: i16, quality: Quality },

    /// Short floating point measured value (IEEE STD 754 + QDS)
    Float { value: f32, quality: Quality },

    /// Integrated total (BCR)
    IntegratedTotal { value: i32, quality: Quality },

    /// Event of protection equipment (SEP + CP16 elapsed time)
    ProtectionEvent {
        state: DoublePointValue,
        quality: Quality,
        elapsed_ms: u16,
    },

    /// Single command (SCO)
    SingleCommand {
        state: bool,
        qualifier: CommandQualifier,
    },

    /// Double command (DCO)
    DoubleCommand {
        state: DoublePointValue,
        qualifier: CommandQualifier,
    },

    /// Regulating step command (RCO)
    RegulatingStep {
        direction: StepDirection,
        qualifier: CommandQualifier,
    },

    /// Set-point command, normalized (NVA + QOS)
    SetpointNormalized {
        value: f32,
        qualifier: SetpointQualifier,
    },

    /// Set-point command, scaled (SVA + QOS)
    SetpointScaled {
        value: i16,
        qualifier: SetpointQualifier,
    },

    /// Set-point command, short floating point (IEEE STD 754 + QOS)
    SetpointFloat {
        value: f32,
        qualifier: SetpointQualifier,
    },

    /// Bitstring of 32 bit command (BSI)
    BitstringCommand { value: Bitstring32 },

    /// End of initialization (COI)
    EndOfInit { cause: u8, local_change: bool },

    /// Interrogation command (QOI)
    Interrogation { qualifier: u8 },

    /// Counter interrogation command (QCC)
    CounterInterrogation { request: u8, freeze: u8 },

    /// Read command (no element bytes)
    Read,

    /// Clock synchronization command (CP56Time2a)
    ClockSync { time: Timestamp },

    /// Test command: the fixed test pattern, or the test sequence counter
    /// when sent with a time tag
    TestCommand { pattern: u16 },

    /// Reset process command (QRP)
    ResetProcess { qualifier: u8 },

    /// Parameter of measured value, normalized (NVA + QPM)
    ParameterNormalized { value: f32, qualifier: u8 },

    /// Parameter of measured value, scaled (SVA + QPM)
    ParameterScaled { value: i16, qualifier: u8 },

    /// Parameter of measured value, short floating point (IEEE STD 754 + QPM)
    ParameterFloat { value: f32, qualifier: u8 },

    /// Parameter activation (QPA)
    ParameterActivation { qualifier: u8 },
}

/// Wire layout of an element, independent of the time tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Format {
    SinglePoint,
    DoublePoint,
    StepPosition,
    Bitstring,
    Normalized,
    NormalizedNoQuality,
    Scaled,
    Float,
    IntegratedTotal,
    ProtectionEvent,
    SingleCommand,
    DoubleCommand,
    RegulatingStep,
    SetpointNormalized,
    SetpointScaled,
    SetpointFloat,
    BitstringCommand,
    EndOfInit,
    Interrogation,
    CounterInterrogation,
    Read,
    ClockSync,
    TestCommand,
    ResetProcess,
    ParameterNormalized,
    ParameterScaled,
    ParameterFloat,
    ParameterActivation,
}

impl Element {
    /// Create a single-point value with good quality.
    pub fn single_point(value: bool) -> Self {
        Self::SinglePoint {
            value,
            quality: Quality::GOOD,
        }
    }

    /// Create a floating point measured value with good quality.
    pub fn float(value: f32) -> Self {
        Self::Float {
            value,
            quality: Quality::GOOD,
        }
    }

    /// Create a station interrogation command.
    pub fn station_interrogation() -> Self {
        Self::Interrogation {
            qualifier: STATION_INTERROGATION,
        }
    }

    /// Quality descriptor, if the element carries one.
    pub fn quality(&self) -> Option<Quality> {
        match self {
            Self::SinglePoint { quality, .. }
            | Self::DoublePoint { quality, .. }
            | Self::StepPosition { quality, .. }
            | Self::Bitstring { quality, .. }
            | Self::Scaled { quality, .. }
            | Self::Float { quality, .. }
            | Self::IntegratedTotal { quality, .. }
            | Self::ProtectionEvent { quality, .. } => Some(*quality),
            Self::Normalized { quality, .. } => *quality,
            _ => None,
        }
    }

    pub(crate) fn format(&self) -> Format {
        match self {
            Self::SinglePoint { .. } => Format::SinglePoint,
            Self::DoublePoint { .. } => Format::DoublePoint,
            Self::StepPosition { .. } => Format::StepPosition,
            Self::Bitstring { .. } => Format::Bitstring,
            Self::Normalized { quality: Some(_), .. } => Format::Normalized,
            Self::Normalized { quality: None, .. } => Format::NormalizedNoQuality,
            Self::Scaled { .. } => Format::Scaled,
            Self::Float { .. } => Format::Float,
            Self::IntegratedTotal { .. } => Format::IntegratedTotal,
            Self::ProtectionEvent { .. } => Format::ProtectionEvent,
            Self::SingleCommand { .. } => Format::SingleCommand,
            Self::DoubleCommand { .. } => Format::DoubleCommand,
            Self::RegulatingStep { .. } => Format::RegulatingStep,
            Self::SetpointNormalized { .. } => Format::SetpointNormalized,
            Self::SetpointScaled { .. } => Format::SetpointScaled,
            Self::SetpointFloat { .. } => Format::SetpointFloat,
            Self::BitstringCommand { .. } => Format::BitstringCommand,
            Self::EndOfInit { .. } => Format::EndOfInit,
            Self::Interrogation { .. } => Format::Interrogation,
            Self::CounterInterrogation { .. } => Format::CounterInterrogation,
            Self::Read => Format::Read,
            Self::ClockSync { .. } => Format::ClockSync,
            Self::TestCommand { .. } => Format::TestCommand,
            Self::ResetProcess { .. } => Format::ResetProcess,
            Self::ParameterNormalized { .. } => Format::ParameterNormalized,
            Self::ParameterScaled { .. } => Format::ParameterScaled,
            Self::ParameterFloat { .. } => Format::ParameterFloat,
            Self::ParameterActivation { .. } => Format::ParameterActivation,
        }
    }
}

fn quality_byte(src: &mut &[u8], kind: QualityKind) -> Result<Quality, DecodeError> {
    Ok(Quality::decode(read_u8(src, "quality descriptor")?, kind))
}

fn command_byte(src: &mut &[u8]) -> Result<(u8, CommandQualifier), DecodeError> {
    let byte = read_u8(src, "command")?;
    Ok((byte & 0x03, CommandQualifier::from_u8(byte)))
}

fn setpoint_qualifier(src: &mut &[u8]) -> Result<SetpointQualifier, DecodeError> {
    Ok(SetpointQualifier::from_u8(read_u8(src, "set-point qualifier")?))
}

/// Decode one element of `format`.
pub(crate) fn decode(src: &mut &[u8], format: Format) -> Result<Element, DecodeError> {
    Ok(match format {
        Format::SinglePoint => {
            let byte = read_u8(src, "single-point information")?;
            Element::SinglePoint {
                value: (byte & 0x01) != 0,
                quality: Quality::decode(byte, QualityKind::Indication),
            }
        }
        Format::DoublePoint => {
            let byte = read_u8(src, "double-point information")?;
            Element::DoublePoint {
                value: DoublePointValue::from_u8(byte),
                quality: Quality::decode(byte, QualityKind::Indication),
            }
        }
        Format::StepPosition => Element::StepPosition {
            value: StepPosition::from_u8(read_u8(src, "step position")?),
            quality: quality_byte(src, QualityKind::Measurement)?,
        },
        Format::Bitstring => Element::Bitstring {
            value: Bitstring32::decode(src)?,
            quality: quality_byte(src, QualityKind::Measurement)?,
        },
        Format::Normalized => Element::Normalized {
            value: decode_normalized(src)?,
            quality: Some(quality_byte(src, QualityKind::Measurement)?),
        },
        Format::NormalizedNoQuality => Element::Normalized {
            value: decode_normalized(src)?,
            quality: None,
        },
        Format::Scaled => Element::Scaled {
            value: decode_scaled(src)?,
            quality: quality_byte(src, QualityKind::Measurement)?,
        },
        Format::Float => Element::Float {
            value: decode_float(src)?,
            quality: quality_byte(src, QualityKind::Measurement)?,
        },
        Format::IntegratedTotal => Element::IntegratedTotal {
            value: decode_counter(src)?,
            quality: quality_byte(src, QualityKind::Counter)?,
        },
        Format::ProtectionEvent => {
            let byte = read_u8(src, "protection event")?;
            Element::ProtectionEvent {
                state: DoublePointValue::from_u8(byte),
                quality: Quality::decode(byte, QualityKind::Protection),
                elapsed_ms: read_u16(src, "elapsed time")?,
            }
        }
        Format::SingleCommand => {
            let (state, qualifier) = command_byte(src)?;
            Element::SingleCommand {
                state: (state & 0x01) != 0,
                qualifier,
            }
        }
        Format::DoubleCommand => {
            let (state, qualifier) = command_byte(src)?;
            Element::DoubleCommand {
                state: DoublePointValue::from_u8(state),
                qualifier,
            }
        }
        Format::RegulatingStep => {
            let (state, qualifier) = command_byte(src)?;
            Element::RegulatingStep {
                direction: StepDirection::from_bits(state)?,
                qualifier,
            }
        }
        Format::SetpointNormalized => Element::SetpointNormalized {
            value: decode_normalized(src)?,
            qualifier: setpoint_qualifier(src)?,
        },
        Format::SetpointScaled => Element::SetpointScaled {
            value: decode_scaled(src)?,
            qualifier: setpoint_qualifier(src)?,
        },
        Format::SetpointFloat => Element::SetpointFloat {
            value: decode_float(src)?,
            qualifier: setpoint_qualifier(src)?,
        },
        Format::BitstringCommand => Element::BitstringCommand {
            value: Bitstring32::decode(src)?,
        },
        Format::EndOfInit => {
            let byte = read_u8(src, "cause of initialization")?;
            Element::EndOfInit {
                cause: byte & 0x7F,
                local_change: (byte & 0x80) != 0,
            }
        }
        Format::Interrogation => Element::Interrogation {
            qualifier: read_u8(src, "qualifier of interrogation")?,
        },
        Format::CounterInterrogation => {
            let byte = read_u8(src, "counter interrogation qualifier")?;
            Element::CounterInterrogation {
                request: byte & 0x3F,
                freeze: byte >> 6,
            }
        }
        Format::Read => Element::Read,
        Format::ClockSync => Element::ClockSync {
            time: Timestamp::decode(src, TimeWidth::Cp56)?,
        },
        Format::TestCommand => Element::TestCommand {
            pattern: read_u16(src, "test pattern")?,
        },
        Format::ResetProcess => Element::ResetProcess {
            qualifier: read_u8(src, "reset process qualifier")?,
        },
        Format::ParameterNormalized => Element::ParameterNormalized {
            value: decode_normalized(src)?,
            qualifier: read_u8(src, "parameter qualifier")?,
        },
        Format::ParameterScaled => Element::ParameterScaled {
            value: decode_scaled(src)?,
            qualifier: read_u8(src, "parameter qualifier")?,
        },
        Format::ParameterFloat => Element::ParameterFloat {
            value: decode_float(src)?,
            qualifier: read_u8(src, "parameter qualifier")?,
        },
        Format::ParameterActivation => Element::ParameterActivation {
            qualifier: read_u8(src, "parameter activation qualifier")?,
        },
    })
}

/// Encode `element`. The caller has checked that its format matches the type.
pub(crate) fn encode(element: &Element, dst: &mut BytesMut) -> Result<(), EncodeError> {
    match element {
        Element::SinglePoint { value, quality } => {
            dst.put_u8(u8::from(*value) | quality.encode(QualityKind::Indication)?);
        }
        Element::DoublePoint { value, quality } => {
            dst.put_u8(value.as_u8() | quality.encode(QualityKind::Indication)?);
        }
        Element::StepPosition { value, quality } => {
            let quality = quality.encode(QualityKind::Measurement)?;
            dst.put_u8(value.to_u8()?);
            dst.put_u8(quality);
        }
        Element::Bitstring { value, quality } => {
            let quality = quality.encode(QualityKind::Measurement)?;
            value.encode(dst);
            dst.put_u8(quality);
        }
        Element::Normalized { value, quality } => {
            let quality = quality
                .map(|quality| quality.encode(QualityKind::Measurement))
                .transpose()?;
            encode_normalized(*value, dst)?;
            if let Some(quality) = quality {
                dst.put_u8(quality);
            }
        }
        Element::Scaled { value, quality } => {
            let quality = quality.encode(QualityKind::Measurement)?;
            encode_scaled(*value, dst);
            dst.put_u8(quality);
        }
        Element::Float { value, quality } => {
            let quality = quality.encode(QualityKind::Measurement)?;
            encode_float(*value, dst);
            dst.put_u8(quality);
        }
        Element::IntegratedTotal { value, quality } => {
            let quality = quality.encode(QualityKind::Counter)?;
            encode_counter(*value, dst);
            dst.put_u8(quality);
        }
        Element::ProtectionEvent {
            state,
            quality,
            elapsed_ms,
        } => {
            dst.put_u8(state.as_u8() | quality.encode(QualityKind::Protection)?);
            dst.put_u16_le(*elapsed_ms);
        }
        Element::SingleCommand { state, qualifier } => {
            dst.put_u8(qualifier.to_bits()? | u8::from(*state));
        }
        Element::DoubleCommand { state, qualifier } => {
            dst.put_u8(qualifier.to_bits()? | state.as_u8());
        }
        Element::RegulatingStep {
            direction,
            qualifier,
        } => {
            dst.put_u8(qualifier.to_bits()? | *direction as u8);
        }
        Element::SetpointNormalized { value, qualifier } => {
            let qualifier = qualifier.to_u8()?;
            encode_normalized(*value, dst)?;
            dst.put_u8(qualifier);
        }
        Element::SetpointScaled { value, qualifier } => {
            let qualifier = qualifier.to_u8()?;
            encode_scaled(*value, dst);
            dst.put_u8(qualifier);
        }
        Element::SetpointFloat { value, qualifier } => {
            let qualifier = qualifier.to_u8()?;
            encode_float(*value, dst);
            dst.put_u8(qualifier);
        }
        Element::BitstringCommand { value } => value.encode(dst),
        Element::EndOfInit {
            cause,
            local_change,
        } => {
            if *cause > 0x7F {
                return Err(EncodeError::out_of_range("cause of initialization", cause));
            }
            dst.put_u8(cause | if *local_change { 0x80 } else { 0 });
        }
        Element::Interrogation { qualifier } => dst.put_u8(*qualifier),
        Element::CounterInterrogation { request, freeze } => {
            if *request > 0x3F {
                return Err(EncodeError::out_of_range("counter request", request));
            }
            if *freeze > 0x03 {
                return Err(EncodeError::out_of_range("counter freeze", freeze));
            }
            dst.put_u8(request | (freeze << 6));
        }
        Element::Read => {}
        Element::ClockSync { time } => time.encode(TimeWidth::Cp56, dst)?,
        Element::TestCommand { pattern } => dst.put_u16_le(*pattern),
        Element::ResetProcess { qualifier } => dst.put_u8(*qualifier),
        Element::ParameterNormalized { value, qualifier } => {
            encode_normalized(*value, dst)?;
            dst.put_u8(*qualifier);
        }
        Element::ParameterScaled { value, qualifier } => {
            encode_scaled(*value, dst);
            dst.put_u8(*qualifier);
        }
        Element::ParameterFloat { value, qualifier } => {
            encode_float(*value, dst);
            dst.put_u8(*qualifier);
        }
        Element::ParameterActivation { qualifier } => dst.put_u8(*qualifier),
    }
    Ok(())
}
