//! Cause of transmission (COT).
//!
//! ```text
//! byte 0 | T(7) | P/N(6) | cause (5..0) |
//! byte 1 | originator address          |  only with a 2-byte cause field
//! ```

use bytes::{BufMut, BytesMut};

use super::primitive::read_u8;
use crate::config::CauseSize;
use crate::error::{DecodeError, EncodeError};

/// Known cause of transmission values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CauseType {
    /// Periodic, cyclic (1)
    Periodic = 1,

    /// Background scan (2)
    Background = 2,

    /// Spontaneous (3)
    Spontaneous = 3,

    /// Initialized (4)
    Initialized = 4,

    /// Request or requested (5)
    Request = 5,

    /// Activation (6)
    Activation = 6,

    /// Activation confirmation (7)
    ActivationConfirm = 7,

    /// Deactivation (8)
    Deactivation = 8,

    /// Deactivation confirmation (9)
    DeactivationConfirm = 9,

    /// Activation termination (10)
    ActivationTermination = 10,

    /// Return information caused by a remote command (11)
    ReturnRemoteCommand = 11,

    /// Return information caused by a local command (12)
    ReturnLocalCommand = 12,

    /// File transfer (13)
    FileTransfer = 13,

    /// Authentication (14)
    Authentication = 14,

    /// Maintenance of authentication session key (15)
    SessionKey = 15,

    /// Maintenance of user role and update key (16)
    UserRoleAndUpdateKey = 16,

    /// Interrogated by station interrogation (20)
    InterrogatedByStation = 20,

    /// Interrogated by group 1 interrogation (21)
    InterrogatedByGroup1 = 21,

    /// Interrogated by group 2 interrogation (22)
    InterrogatedByGroup2 = 22,

    /// Interrogated by group 3 interrogation (23)
    InterrogatedByGroup3 = 23,

    /// Interrogated by group 4 interrogation (24)
    InterrogatedByGroup4 = 24,

    /// Interrogated by group 5 interrogation (25)
    InterrogatedByGroup5 = 25,

    /// Interrogated by group 6 interrogation (26)
    InterrogatedByGroup6 = 26,

    /// Interrogated by group 7 interrogation (27)
    InterrogatedByGroup7 = 27,

    /// Interrogated by group 8 interrogation (28)
    InterrogatedByGroup8 = 28,

    /// Interrogated by group 9 interrogation (29)
    InterrogatedByGroup9 = 29,

    /// Interrogated by group 10 interrogation (30)
    InterrogatedByGroup10 = 30,

    /// Interrogated by group 11 interrogation (31)
    InterrogatedByGroup11 = 31,

    /// Interrogated by group 12 interrogation (32)
    InterrogatedByGroup12 = 32,

    /// Interrogated by group 13 interrogation (33)
    InterrogatedByGroup13 = 33,

    /// Interrogated by group 14 interrogation (34)
    InterrogatedByGroup14 = 34,

    /// Interrogated by group 15 interrogation (35)
    InterrogatedByGroup15 = 35,

    /// Interrogated by group 16 interrogation (36)
    InterrogatedByGroup16 = 36,

    /// Requested by general counter request (37)
    RequestedByGeneralCounter = 37,

    /// Requested by group 1 counter request (38)
    RequestedByGroup1Counter = 38,

    /// Requested by group 2 counter request (39)
    RequestedByGroup2Counter = 39,

    /// Requested by group 3 counter request (40)
    RequestedByGroup3Counter = 40,

    /// Requested by group 4 counter request (41)
    RequestedByGroup4Counter = 41,

    /// Unknown type identification (44)
    UnknownTypeId = 44,

    /// Unknown cause of transmission (45)
    UnknownCot = 45,

    /// Unknown common address of ASDU (46)
    UnknownCommonAddress = 46,

    /// Unknown information object address (47)
    UnknownIoa = 47,
}

impl CauseType {
    /// Look up a known cause (lower 6 bits of `value`).
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value & 0x3F {
            1 => Self::Periodic,
            2 => Self::Background,
            3 => Self::Spontaneous,
            4 => Self::Initialized,
            5 => Self::Request,
            6 => Self::Activation,
            7 => Self::ActivationConfirm,
            8 => Self::Deactivation,
            9 => Self::DeactivationConfirm,
            10 => Self::ActivationTermination,
            11 => Self::ReturnRemoteCommand,
            12 => Self::ReturnLocalCommand,
            13 => Self::FileTransfer,
            14 => Self::Authentication,
            15 => Self::SessionKey,
            16 => Self::UserRoleAndUpdateKey,
            20 => Self::InterrogatedByStation,
            21 => Self::InterrogatedByGroup1,
            22 => Self::InterrogatedByGroup2,
            23 => Self::InterrogatedByGroup3,
            24 => Self::InterrogatedByGroup4,
            25 => Self::InterrogatedByGroup5,
            26 => Self::InterrogatedByGroup6,
            27 => Self::InterrogatedByGroup7,
            28 => Self::InterrogatedByGroup8,
            29 => Self::InterrogatedByGroup9,
            30 => Self::InterrogatedByGroup10,
            31 => Self::InterrogatedByGroup11,
            32 => Self::InterrogatedByGroup12,
            33 => Self::InterrogatedByGroup13,
            34 => Self::InterrogatedByGroup14,
            35 => Self::InterrogatedByGroup15,
            36 => Self::InterrogatedByGroup16,
            37 => Self::RequestedByGeneralCounter,
            38 => Self::RequestedByGroup1Counter,
            39 => Self::RequestedByGroup2Counter,
            40 => Self::RequestedByGroup3Counter,
            41 => Self::RequestedByGroup4Counter,
            44 => Self::UnknownTypeId,
            45 => Self::UnknownCot,
            46 => Self::UnknownCommonAddress,
            47 => Self::UnknownIoa,
            _ => return None,
        })
    }

    /// Convert to raw value.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if this is a positive confirmation.
    #[inline]
    pub const fn is_confirmation(&self) -> bool {
        matches!(
            self,
            Self::ActivationConfirm | Self::DeactivationConfirm | Self::ActivationTermination
        )
    }

    /// Check if this reports an unknown addressing element.
    #[inline]
    pub const fn is_unknown_reply(&self) -> bool {
        matches!(
            self,
            Self::UnknownTypeId | Self::UnknownCot | Self::UnknownCommonAddress | Self::UnknownIoa
        )
    }

    /// Check if this COT indicates an interrogation response.
    #[inline]
    pub const fn is_interrogation_response(&self) -> bool {
        matches!(self.as_u8(), 20..=36)
    }

    /// Check if this COT indicates a counter request response.
    #[inline]
    pub const fn is_counter_response(&self) -> bool {
        matches!(self.as_u8(), 37..=41)
    }

    /// Check if this COT belongs to the security extension.
    #[inline]
    pub const fn is_security(&self) -> bool {
        matches!(self.as_u8(), 14..=16)
    }
}

impl std::fmt::Display for CauseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Cause value as carried on the wire: a known cause or the raw 6-bit value.
///
/// Codes compare by wire value, so `Raw(3)` equals `Known(Spontaneous)`.
#[derive(Debug, Clone, Copy)]
pub enum CauseCode {
    /// Recognized cause
    Known(CauseType),
    /// Unrecognized value (0-63)
    Raw(u8),
}

impl CauseCode {
    /// Parse from the lower 6 bits of `value`.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        match CauseType::from_u8(value) {
            Some(known) => Self::Known(known),
            None => Self::Raw(value & 0x3F),
        }
    }

    /// Raw value. Not range-checked for `Raw`.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Known(known) => known.as_u8(),
            Self::Raw(raw) => raw,
        }
    }

    /// Replace a `Raw` value that names a known cause with `Known`.
    ///
    /// Values above 63 stay raw so encoding still rejects them.
    #[inline]
    pub const fn normalized(self) -> Self {
        match self {
            Self::Raw(raw) if raw <= 0x3F => Self::from_u8(raw),
            other => other,
        }
    }

    /// Get the known cause, if any.
    #[inline]
    pub const fn known(self) -> Option<CauseType> {
        match self {
            Self::Known(known) => Some(known),
            Self::Raw(_) => None,
        }
    }
}

impl PartialEq for CauseCode {
    fn eq(&self, other: &Self) -> bool {
        self.as_u8() == other.as_u8()
    }
}

impl Eq for CauseCode {}

impl std::hash::Hash for CauseCode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_u8().hash(state);
    }
}

impl From<CauseType> for CauseCode {
    fn from(value: CauseType) -> Self {
        Self::Known(value)
    }
}

impl std::fmt::Display for CauseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(known) => write!(f, "{known}"),
            Self::Raw(raw) => write!(f, "COT({raw})"),
        }
    }
}

/// Complete cause of transmission field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cause {
    /// Cause value
    pub code: CauseCode,
    /// Negative confirmation (P/N)
    pub negative_confirm: bool,
    /// Test frame (T)
    pub test: bool,
    /// Originator address (encoded only with a 2-byte cause field)
    pub originator_address: u8,
}

impl Cause {
    /// Create a cause with all flags clear.
    #[inline]
    pub fn new(code: impl Into<CauseCode>) -> Self {
        Self {
            code: code.into().normalized(),
            negative_confirm: false,
            test: false,
            originator_address: 0,
        }
    }

    /// Set the negative confirmation flag.
    #[inline]
    pub fn negative(mut self) -> Self {
        self.negative_confirm = true;
        self
    }

    /// Set the test flag.
    #[inline]
    pub fn test(mut self) -> Self {
        self.test = true;
        self
    }

    /// Set the originator address.
    #[inline]
    pub fn with_originator(mut self, originator_address: u8) -> Self {
        self.originator_address = originator_address;
        self
    }

    /// Encode the cause field.
    pub fn encode(&self, size: CauseSize, dst: &mut BytesMut) -> Result<(), EncodeError> {
        let code = self.code.as_u8();
        if code > 0x3F {
            return Err(EncodeError::out_of_range("cause of transmission", code));
        }
        let mut byte = code;
        if self.negative_confirm {
            byte |= 0x40;
        }
        if self.test {
            byte |= 0x80;
        }
        dst.put_u8(byte);
        if size == CauseSize::Two {
            dst.put_u8(self.originator_address);
        }
        Ok(())
    }

    /// Decode the cause field. A 1-byte field yields originator address 0.
    pub fn decode(src: &mut &[u8], size: CauseSize) -> Result<Self, DecodeError> {
        super::primitive::ensure(src, size.len(), "cause of transmission")?;
        let byte = read_u8(src, "cause of transmission")?;
        let originator_address = match size {
            CauseSize::One => 0,
            CauseSize::Two => read_u8(src, "originator address")?,
        };
        Ok(Self {
            code: CauseCode::from_u8(byte),
            negative_confirm: (byte & 0x40) != 0,
            test: (byte & 0x80) != 0,
            originator_address,
        })
    }
}

impl std::fmt::Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)?;
        if self.negative_confirm {
            f.write_str(",NEG")?;
        }
        if self.test {
            f.write_str(",TEST")?;
        }
        if self.originator_address != 0 {
            write!(f, ",OA={}", self.originator_address)?;
        }
        Ok(())
    }
}
