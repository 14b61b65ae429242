//! IEC 60870-5-103 profile.
//!
//! Companion standard for protection equipment. Information objects are
//! addressed by function type and information number (see
//! [`IoAddress::function_info`](crate::types::IoAddress::function_info)),
//! and measurands travel as a sequence of MEA elements behind one address.

mod element;
mod type_id;

pub use element::{Element, Measurand, IDENTIFICATION_TEXT_LEN, SOFTWARE_ID_LEN};
pub use type_id::TypeId;

use bytes::BytesMut;

use crate::error::{DecodeError, EncodeError};
use crate::profile::Profile;
use crate::types::TimeWidth;

/// IEC 60870-5-103 profile marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Iec103;

impl Element {
    /// The one type that carries this element.
    pub fn type_id(&self) -> TypeId {
        match self {
            Self::TimeTagged { .. } => TypeId::TimeTagged,
            Self::RelativeTimeTagged { .. } => TypeId::RelativeTimeTagged,
            Self::MeasurandI(_) => TypeId::MeasurandsI,
            Self::FaultLocation { .. } => TypeId::FaultLocation,
            Self::Identification { .. } => TypeId::Identification,
            Self::ClockSync { .. } => TypeId::ClockSync,
            Self::GeneralInterrogation { .. } => TypeId::GeneralInterrogation,
            Self::InterrogationEnd { .. } => TypeId::InterrogationEnd,
            Self::MeasurandII(_) => TypeId::MeasurandsII,
            Self::GeneralCommand { .. } => TypeId::GeneralCommand,
        }
    }
}

impl Profile for Iec103 {
    const NAME: &'static str = "IEC 60870-5-103";
    const SEQUENTIAL_ADDRESSES: bool = false;

    type TypeId = TypeId;
    type Element = Element;

    fn decode_element(src: &mut &[u8], type_id: TypeId) -> Result<Element, DecodeError> {
        element::decode(src, type_id)
    }

    fn encode_element(element: &Element, type_id: TypeId, dst: &mut BytesMut) -> Result<(), EncodeError> {
        if element.type_id() != type_id {
            return Err(EncodeError::unsupported_shape(format!(
                "{} element cannot be encoded as {}",
                element.type_id(),
                type_id
            )));
        }
        element::encode(element, dst)
    }

    fn wire_type(element: &Element, time: Option<TimeWidth>) -> Result<TypeId, EncodeError> {
        match time {
            None => Ok(element.type_id()),
            Some(width) => Err(EncodeError::unsupported_shape(format!(
                "{} has no trailing {width} time tag for {}",
                Self::NAME,
                element.type_id()
            ))),
        }
    }
}
