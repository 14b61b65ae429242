//! IEC 60870-5-101 profile.
//!
//! Serial-line companion standard. Time-tagged monitoring types exist with
//! both CP24Time2a and CP56Time2a tags; commands are never time-tagged.

mod element;
mod type_id;

pub use element::{Element, StepDirection, STATION_INTERROGATION, TEST_PATTERN};
pub(crate) use element::Format;
pub use type_id::TypeId;

use bytes::BytesMut;

use crate::error::{DecodeError, EncodeError};
use crate::profile::Profile;
use crate::types::TimeWidth;

/// IEC 60870-5-101 profile marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Iec101;

/// Reject an element whose layout differs from what `type_id` carries.
pub(crate) fn check_format<T: std::fmt::Display>(
    element: &Element,
    expected: Format,
    type_id: T,
) -> Result<(), EncodeError> {
    if element.format() != expected {
        return Err(EncodeError::unsupported_shape(format!(
            "{:?} element cannot be encoded as {}",
            element.format(),
            type_id
        )));
    }
    Ok(())
}

pub(crate) fn decode_format(src: &mut &[u8], format: Format) -> Result<Element, DecodeError> {
    element::decode(src, format)
}

pub(crate) fn encode_unchecked(element: &Element, dst: &mut BytesMut) -> Result<(), EncodeError> {
    element::encode(element, dst)
}

pub(crate) fn shape_error(element: &Element, time: Option<TimeWidth>, profile: &str) -> EncodeError {
    match time {
        Some(width) => EncodeError::unsupported_shape(format!(
            "{profile} has no type for {:?} with {width} time tag",
            element.format()
        )),
        None => EncodeError::unsupported_shape(format!(
            "{profile} has no type for {:?} without time tag",
            element.format()
        )),
    }
}

impl Profile for Iec101 {
    const NAME: &'static str = "IEC 60870-5-101";

    type TypeId = TypeId;
    type Element = Element;

    fn decode_element(src: &mut &[u8], type_id: TypeId) -> Result<Element, DecodeError> {
        decode_format(src, type_id.format())
    }

    fn encode_element(element: &Element, type_id: TypeId, dst: &mut BytesMut) -> Result<(), EncodeError> {
        check_format(element, type_id.format(), type_id)?;
        encode_unchecked(element, dst)
    }

    fn wire_type(element: &Element, time: Option<TimeWidth>) -> Result<TypeId, EncodeError> {
        use TimeWidth::{Cp24, Cp32, Cp56};

        // CP32 timestamps travel in the short time-tag types; the configured
        // width decides what reaches the wire.
        let type_id = match (element.format(), time) {
            (Format::SinglePoint, None) => TypeId::SinglePoint,
            (Format::SinglePoint, Some(Cp24 | Cp32)) => TypeId::SinglePointTime24,
            (Format::SinglePoint, Some(Cp56)) => TypeId::SinglePointTime56,
            (Format::DoublePoint, None) => TypeId::DoublePoint,
            (Format::DoublePoint, Some(Cp24 | Cp32)) => TypeId::DoublePointTime24,
            (Format::DoublePoint, Some(Cp56)) => TypeId::DoublePointTime56,
            (Format::StepPosition, None) => TypeId::StepPosition,
            (Format::StepPosition, Some(Cp24 | Cp32)) => TypeId::StepPositionTime24,
            (Format::StepPosition, Some(Cp56)) => TypeId::StepPositionTime56,
            (Format::Bitstring, None) => TypeId::Bitstring32,
            (Format::Bitstring, Some(Cp24 | Cp32)) => TypeId::Bitstring32Time24,
            (Format::Bitstring, Some(Cp56)) => TypeId::Bitstring32Time56,
            (Format::Normalized, None) => TypeId::MeasuredNormalized,
            (Format::Normalized, Some(Cp24 | Cp32)) => TypeId::MeasuredNormalizedTime24,
            (Format::Normalized, Some(Cp56)) => TypeId::MeasuredNormalizedTime56,
            (Format::NormalizedNoQuality, None) => TypeId::MeasuredNormalizedNoQuality,
            (Format::Scaled, None) => TypeId::MeasuredScaled,
            (Format::Scaled, Some(Cp24 | Cp32)) => TypeId::MeasuredScaledTime24,
            (Format::Scaled, Some(Cp56)) => TypeId::MeasuredScaledTime56,
            (Format::Float, None) => TypeId::MeasuredFloat,
            (Format::Float, Some(Cp24 | Cp32)) => TypeId::MeasuredFloatTime24,
            (Format::Float, Some(Cp56)) => TypeId::MeasuredFloatTime56,
            (Format::IntegratedTotal, None) => TypeId::IntegratedTotals,
            (Format::IntegratedTotal, Some(Cp24 | Cp32)) => TypeId::IntegratedTotalsTime24,
            (Format::IntegratedTotal, Some(Cp56)) => TypeId::IntegratedTotalsTime56,
            (Format::ProtectionEvent, Some(Cp24 | Cp32)) => TypeId::ProtectionEventTime24,
            (Format::ProtectionEvent, Some(Cp56)) => TypeId::ProtectionEventTime56,
            (Format::SingleCommand, None) => TypeId::SingleCommand,
            (Format::DoubleCommand, None) => TypeId::DoubleCommand,
            (Format::RegulatingStep, None) => TypeId::RegulatingStep,
            (Format::SetpointNormalized, None) => TypeId::SetpointNormalized,
            (Format::SetpointScaled, None) => TypeId::SetpointScaled,
            (Format::SetpointFloat, None) => TypeId::SetpointFloat,
            (Format::BitstringCommand, None) => TypeId::Bitstring32Command,
            (Format::EndOfInit, None) => TypeId::EndOfInit,
            (Format::Interrogation, None) => TypeId::InterrogationCommand,
            (Format::CounterInterrogation, None) => TypeId::CounterInterrogation,
            (Format::Read, None) => TypeId::ReadCommand,
            (Format::ClockSync, None) => TypeId::ClockSync,
            (Format::TestCommand, None) => TypeId::TestCommand,
            (Format::ResetProcess, None) => TypeId::ResetProcess,
            (Format::ParameterNormalized, None) => TypeId::ParameterNormalized,
            (Format::ParameterScaled, None) => TypeId::ParameterScaled,
            (Format::ParameterFloat, None) => TypeId::ParameterFloat,
            (Format::ParameterActivation, None) => TypeId::ParameterActivation,
            _ => return Err(shape_error(element, time, Self::NAME)),
        };
        Ok(type_id)
    }
}
