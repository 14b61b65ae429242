//! IEC 60870-5-7 secure authentication profile.
//!
//! Security ASDUs have no information object address and may exceed one
//! frame, so every type is segmentable. Causes 14-16 mark the
//! authentication and key maintenance exchanges (see
//! [`CauseType::is_security`](crate::types::CauseType::is_security)).

mod element;
mod type_id;

pub use element::{Element, KeyStatus};
pub use type_id::TypeId;

use bytes::BytesMut;

use crate::error::{DecodeError, EncodeError};
use crate::profile::Profile;
use crate::types::TimeWidth;

/// IEC 60870-5-7 profile marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Security;

impl Element {
    /// The one type that carries this message.
    pub fn type_id(&self) -> TypeId {
        match self {
            Self::Challenge { .. } => TypeId::Challenge,
            Self::Reply { .. } => TypeId::Reply,
            Self::AggressiveRequest { .. } => TypeId::AggressiveRequest,
            Self::KeyStatusRequest { .. } => TypeId::KeyStatusRequest,
            Self::KeyStatus { .. } => TypeId::KeyStatus,
            Self::KeyChange { .. } => TypeId::KeyChange,
            Self::Error { .. } => TypeId::Error,
            Self::UserStatusChange { .. } => TypeId::UserStatusChange,
        }
    }
}

impl Profile for Security {
    const NAME: &'static str = "IEC 60870-5-7";

    type TypeId = TypeId;
    type Element = Element;

    fn decode_element(src: &mut &[u8], type_id: TypeId) -> Result<Element, DecodeError> {
        element::decode(src, type_id)
    }

    fn encode_element(element: &Element, type_id: TypeId, dst: &mut BytesMut) -> Result<(), EncodeError> {
        if element.type_id() != type_id {
            return Err(EncodeError::unsupported_shape(format!(
                "{} message cannot be encoded as {}",
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
                "{} has no {width} time tag for {}",
                Self::NAME,
                element.type_id()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_type() {
        let element = Element::KeyStatusRequest { user: 1 };
        assert_eq!(Security::wire_type(&element, None).unwrap(), TypeId::KeyStatusRequest);
        assert!(Security::wire_type(&element, Some(TimeWidth::Cp56)).is_err());
    }

    #[test]
    fn test_encode_element_checks_type() {
        let mut buf = BytesMut::new();
        let err = Security::encode_element(&Element::KeyStatusRequest { user: 1 }, TypeId::Reply, &mut buf)
            .unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedShape(_)));

        Security::encode_element(&Element::KeyStatusRequest { user: 0x0102 }, TypeId::KeyStatusRequest, &mut buf)
            .unwrap();
        assert_eq!(&buf[..], &[0x02, 0x01]);
    }
}
