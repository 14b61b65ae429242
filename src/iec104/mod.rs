//! IEC 60870-5-104 profile.
//!
//! Network access companion standard. Element layouts are those of 101,
//! but only CP56Time2a time tags exist, and commands may carry one.

mod type_id;

pub use crate::iec101::Element;
pub use type_id::TypeId;

use bytes::BytesMut;

use crate::error::{DecodeError, EncodeError};
use crate::iec101::{check_format, decode_format, encode_unchecked, shape_error, Format};
use crate::profile::Profile;
use crate::types::TimeWidth;

/// IEC 60870-5-104 profile marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Iec104;

impl Profile for Iec104 {
    const NAME: &'static str = "IEC 60870-5-104";

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
        let timed = match time {
            None => false,
            Some(TimeWidth::Cp56) => true,
            Some(_) => return Err(shape_error(element, time, Self::NAME)),
        };

        let type_id = match (element.format(), timed) {
            (Format::SinglePoint, false) => TypeId::SinglePoint,
            (Format::SinglePoint, true) => TypeId::SinglePointTime56,
            (Format::DoublePoint, false) => TypeId::DoublePoint,
            (Format::DoublePoint, true) => TypeId::DoublePointTime56,
            (Format::StepPosition, false) => TypeId::StepPosition,
            (Format::StepPosition, true) => TypeId::StepPositionTime56,
            (Format::Bitstring, false) => TypeId::Bitstring32,
            (Format::Bitstring, true) => TypeId::Bitstring32Time56,
            (Format::Normalized, false) => TypeId::MeasuredNormalized,
            (Format::Normalized, true) => TypeId::MeasuredNormalizedTime56,
            (Format::NormalizedNoQuality, false) => TypeId::MeasuredNormalizedNoQuality,
            (Format::Scaled, false) => TypeId::MeasuredScaled,
            (Format::Scaled, true) => TypeId::MeasuredScaledTime56,
            (Format::Float, false) => TypeId::MeasuredFloat,
            (Format::Float, true) => TypeId::MeasuredFloatTime56,
            (Format::IntegratedTotal, false) => TypeId::IntegratedTotals,
            (Format::IntegratedTotal, true) => TypeId::IntegratedTotalsTime56,
            (Format::ProtectionEvent, true) => TypeId::ProtectionEventTime56,
            (Format::SingleCommand, false) => TypeId::SingleCommand,
            (Format::SingleCommand, true) => TypeId::SingleCommandTime56,
            (Format::DoubleCommand, false) => TypeId::DoubleCommand,
            (Format::DoubleCommand, true) => TypeId::DoubleCommandTime56,
            (Format::RegulatingStep, false) => TypeId::RegulatingStep,
            (Format::RegulatingStep, true) => TypeId::RegulatingStepTime56,
            (Format::SetpointNormalized, false) => TypeId::SetpointNormalized,
            (Format::SetpointNormalized, true) => TypeId::SetpointNormalizedTime56,
            (Format::SetpointScaled, false) => TypeId::SetpointScaled,
            (Format::SetpointScaled, true) => TypeId::SetpointScaledTime56,
            (Format::SetpointFloat, false) => TypeId::SetpointFloat,
            (Format::SetpointFloat, true) => TypeId::SetpointFloatTime56,
            (Format::BitstringCommand, false) => TypeId::Bitstring32Command,
            (Format::BitstringCommand, true) => TypeId::Bitstring32CommandTime56,
            (Format::EndOfInit, false) => TypeId::EndOfInit,
            (Format::Interrogation, false) => TypeId::InterrogationCommand,
            (Format::CounterInterrogation, false) => TypeId::CounterInterrogation,
            (Format::Read, false) => TypeId::ReadCommand,
            (Format::ClockSync, false) => TypeId::ClockSync,
            (Format::TestCommand, true) => TypeId::TestCommandTime56,
            (Format::ResetProcess, false) => TypeId::ResetProcess,
            (Format::ParameterNormalized, false) => TypeId::ParameterNormalized,
            (Format::ParameterScaled, false) => TypeId::ParameterScaled,
            (Format::ParameterFloat, false) => TypeId::ParameterFloat,
            (Format::ParameterActivation, false) => TypeId::ParameterActivation,
            _ => return Err(shape_error(element, time, Self::NAME)),
        };
        Ok(type_id)
    }
}
