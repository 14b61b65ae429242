//! IEC 60870-5-7 security Type Identification.

use crate::error::DecodeError;
use crate::profile::{AsduType, TypeLayout};

/// IEC 60870-5-7 security Type Identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeId {
    /// Authentication challenge (S_CH_NA_1)
    Challenge = 81,

    /// Authentication reply (S_RP_NA_1)
    Reply = 82,

    /// Aggressive mode authentication request (S_AR_NA_1)
    AggressiveRequest = 83,

    /// Session key status request (S_KR_NA_1)
    KeyStatusRequest = 84,

    /// Session key status (S_KS_NA_1)
    KeyStatus = 85,

    /// Session key change (S_KC_NA_1)
    KeyChange = 86,

    /// Authentication error (S_ER_NA_1)
    Error = 87,

    /// User status change (S_US_NA_1)
    UserStatusChange = 90,
}

impl TypeId {
    /// Create TypeId from raw byte value.
    #[inline]
    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        Ok(match value {
            81 => Self::Challenge,
            82 => Self::Reply,
            83 => Self::AggressiveRequest,
            84 => Self::KeyStatusRequest,
            85 => Self::KeyStatus,
            86 => Self::KeyChange,
            87 => Self::Error,
            90 => Self::UserStatusChange,
            _ => return Err(DecodeError::UnsupportedType(value)),
        })
    }

    /// Convert to raw byte value.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get the IEC standard name (e.g., "S_CH_NA_1").
    #[inline]
    pub const fn standard_name(&self) -> &'static str {
        match self {
            Self::Challenge => "S_CH_NA_1",
            Self::Reply => "S_RP_NA_1",
            Self::AggressiveRequest => "S_AR_NA_1",
            Self::KeyStatusRequest => "S_KR_NA_1",
            Self::KeyStatus => "S_KS_NA_1",
            Self::KeyChange => "S_KC_NA_1",
            Self::Error => "S_ER_NA_1",
            Self::UserStatusChange => "S_US_NA_1",
        }
    }
}

impl AsduType for TypeId {
    fn from_u8(value: u8) -> Result<Self, DecodeError> {
        TypeId::from_u8(value)
    }

    fn as_u8(self) -> u8 {
        TypeId::as_u8(self)
    }

    fn layout(self) -> TypeLayout {
        TypeLayout::SEGMENTED
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.standard_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_roundtrip() {
        for val in [81, 82, 83, 84, 85, 86, 87, 90] {
            let type_id = TypeId::from_u8(val).unwrap();
            assert_eq!(type_id.as_u8(), val);
            assert!(type_id.layout().segmentable);
            assert!(!type_id.layout().io_address);
        }
        for val in [80, 88, 89, 91, 1] {
            assert_eq!(TypeId::from_u8(val), Err(DecodeError::UnsupportedType(val)));
        }
    }
}
