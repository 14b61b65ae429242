//! IEC 60870-5-103 Type Identification.

use crate::error::DecodeError;
use crate::profile::{AsduType, TypeLayout};

/// IEC 60870-5-103 Type Identification.
///
/// Only the compatible range is covered; private ranges are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeId {
    /// Time-tagged message (M_TM_TA_3)
    TimeTagged = 1,

    /// Time-tagged message with relative time (M_TMR_TA_3)
    RelativeTimeTagged = 2,

    /// Measurands I (M_MEI_NA_3)
    MeasurandsI = 3,

    /// Time-tagged measurands with relative time (M_TME_TA_3)
    FaultLocation = 4,

    /// Identification (M_IRC_NA_3)
    Identification = 5,

    /// Time synchronization (C_SYN_TA_3)
    ClockSync = 6,

    /// General interrogation initiation (C_IGI_NA_3)
    GeneralInterrogation = 7,

    /// General interrogation termination (M_TGI_NA_3)
    InterrogationEnd = 8,

    /// Measurands II (M_MEII_NA_3)
    MeasurandsII = 9,

    /// General command (C_GRC_NA_3)
    GeneralCommand = 20,
}

impl TypeId {
    /// Create TypeId from raw byte value.
    #[inline]
    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        Ok(match value {
            1 => Self::TimeTagged,
            2 => Self::RelativeTimeTagged,
            3 => Self::MeasurandsI,
            4 => Self::FaultLocation,
            5 => Self::Identification,
            6 => Self::ClockSync,
            7 => Self::GeneralInterrogation,
            8 => Self::InterrogationEnd,
            9 => Self::MeasurandsII,
            20 => Self::GeneralCommand,
            _ => return Err(DecodeError::UnsupportedType(value)),
        })
    }

    /// Convert to raw byte value.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if this type is in the control direction.
    #[inline]
    pub const fn is_control(&self) -> bool {
        matches!(self, Self::ClockSync | Self::GeneralInterrogation | Self::GeneralCommand)
    }

    /// Check if this type carries measurands (MEA).
    #[inline]
    pub const fn is_measurand(&self) -> bool {
        matches!(self, Self::MeasurandsI | Self::MeasurandsII)
    }

    /// Get the standard name (e.g., "M_TM_TA_3").
    #[inline]
    pub const fn standard_name(&self) -> &'static str {
        match self {
            Self::TimeTagged => "M_TM_TA_3",
            Self::RelativeTimeTagged => "M_TMR_TA_3",
            Self::MeasurandsI => "M_MEI_NA_3",
            Self::FaultLocation => "M_TME_TA_3",
            Self::Identification => "M_IRC_NA_3",
            Self::ClockSync => "C_SYN_TA_3",
            Self::GeneralInterrogation => "C_IGI_NA_3",
            Self::InterrogationEnd => "M_TGI_NA_3",
            Self::MeasurandsII => "M_MEII_NA_3",
            Self::GeneralCommand => "C_GRC_NA_3",
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

    // Time tags are element fields in 103.
    fn layout(self) -> TypeLayout {
        TypeLayout::PLAIN
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.standard_name())
    }
}
