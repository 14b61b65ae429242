//! IEC 60870-5-101 Type Identification.

use super::element::Format;
use crate::error::DecodeError;
use crate::profile::{AsduType, TypeLayout};
use crate::types::TimeWidth;

/// IEC 60870-5-101 Type Identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeId {
    // ============================================
    // Process information in monitoring direction
    // ============================================
    /// Single-point information (M_SP_NA_1)
    SinglePoint = 1,

    /// Single-point information with time tag (M_SP_TA_1)
    SinglePointTime24 = 2,

    /// Double-point information (M_DP_NA_1)
    DoublePoint = 3,

    /// Double-point information with time tag (M_DP_TA_1)
    DoublePointTime24 = 4,

    /// Step position information (M_ST_NA_1)
    StepPosition = 5,

    /// Step position information with time tag (M_ST_TA_1)
    StepPositionTime24 = 6,

    /// Bitstring of 32 bit (M_BO_NA_1)
    Bitstring32 = 7,

    /// Bitstring of 32 bit with time tag (M_BO_TA_1)
    Bitstring32Time24 = 8,

    /// Measured value, normalized (M_ME_NA_1)
    MeasuredNormalized = 9,

    /// Measured value, normalized with time tag (M_ME_TA_1)
    MeasuredNormalizedTime24 = 10,

    /// Measured value, scaled (M_ME_NB_1)
    MeasuredScaled = 11,

    /// Measured value, scaled with time tag (M_ME_TB_1)
    MeasuredScaledTime24 = 12,

    /// Measured value, short floating point (M_ME_NC_1)
    MeasuredFloat = 13,

    /// Measured value, short floating point with time tag (M_ME_TC_1)
    MeasuredFloatTime24 = 14,

    /// Integrated totals (M_IT_NA_1)
    IntegratedTotals = 15,

    /// Integrated totals with time tag (M_IT_TA_1)
    IntegratedTotalsTime24 = 16,

    /// Event of protection equipment with time tag (M_EP_TA_1)
    ProtectionEventTime24 = 17,

    /// Measured value, normalized without quality descriptor (M_ME_ND_1)
    MeasuredNormalizedNoQuality = 21,

    /// Single-point information with time tag CP56Time2a (M_SP_TB_1)
    SinglePointTime56 = 30,

    /// Double-point information with time tag CP56Time2a (M_DP_TB_1)
    DoublePointTime56 = 31,

    /// Step position information with time tag CP56Time2a (M_ST_TB_1)
    StepPositionTime56 = 32,

    /// Bitstring of 32 bit with time tag CP56Time2a (M_BO_TB_1)
    Bitstring32Time56 = 33,

    /// Measured value, normalized with time tag CP56Time2a (M_ME_TD_1)
    MeasuredNormalizedTime56 = 34,

    /// Measured value, scaled with time tag CP56Time2a (M_ME_TE_1)
    MeasuredScaledTime56 = 35,

    /// Measured value, short floating point with time tag CP56Time2a (M_ME_TF_1)
    MeasuredFloatTime56 = 36,

    /// Integrated totals with time tag CP56Time2a (M_IT_TB_1)
    IntegratedTotalsTime56 = 37,

    /// Event of protection equipment with time tag CP56Time2a (M_EP_TD_1)
    ProtectionEventTime56 = 38,

    // ============================================
    // Process information in control direction
    // ============================================
    /// Single command (C_SC_NA_1)
    SingleCommand = 45,

    /// Double command (C_DC_NA_1)
    DoubleCommand = 46,

    /// Regulating step command (C_RC_NA_1)
    RegulatingStep = 47,

    /// Set-point command, normalized (C_SE_NA_1)
    SetpointNormalized = 48,

    /// Set-point command, scaled (C_SE_NB_1)
    SetpointScaled = 49,

    /// Set-point command, short floating point (C_SE_NC_1)
    SetpointFloat = 50,

    /// Bitstring of 32 bit command (C_BO_NA_1)
    Bitstring32Command = 51,

    // ============================================
    // System information in monitoring direction
    // ============================================
    /// End of initialization (M_EI_NA_1)
    EndOfInit = 70,

    // ============================================
    // System information in control direction
    // ============================================
    /// Interrogation command (C_IC_NA_1)
    InterrogationCommand = 100,

    /// Counter interrogation command (C_CI_NA_1)
    CounterInterrogation = 101,

    /// Read command (C_RD_NA_1)
    ReadCommand = 102,

    /// Clock synchronization command (C_CS_NA_1)
    ClockSync = 103,

    /// Test command (C_TS_NA_1)
    TestCommand = 104,

    /// Reset process command (C_RP_NA_1)
    ResetProcess = 105,

    // ============================================
    // Parameters in control direction
    // ============================================
    /// Parameter of measured value, normalized (P_ME_NA_1)
    ParameterNormalized = 110,

    /// Parameter of measured value, scaled (P_ME_NB_1)
    ParameterScaled = 111,

    /// Parameter of measured value, short floating point (P_ME_NC_1)
    ParameterFloat = 112,

    /// Parameter activation (P_AC_NA_1)
    ParameterActivation = 113,
}

impl TypeId {
    /// Create TypeId from raw byte value.
    #[inline]
    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        Ok(match value {
            1 => Self::SinglePoint,
            2 => Self::SinglePointTime24,
            3 => Self::DoublePoint,
            4 => Self::DoublePointTime24,
            5 => Self::StepPosition,
            6 => Self::StepPositionTime24,
            7 => Self::Bitstring32,
            8 => Self::Bitstring32Time24,
            9 => Self::MeasuredNormalized,
            10 => Self::MeasuredNormalizedTime24,
            11 => Self::MeasuredScaled,
            12 => Self::MeasuredScaledTime24,
            13 => Self::MeasuredFloat,
            14 => Self::MeasuredFloatTime24,
            15 => Self::IntegratedTotals,
            16 => Self::IntegratedTotalsTime24,
            17 => Self::ProtectionEventTime24,
            21 => Self::MeasuredNormalizedNoQuality,
            30 => Self::SinglePointTime56,
            31 => Self::DoublePointTime56,
            32 => Self::StepPositionTime56,
            33 => Self::Bitstring32Time56,
            34 => Self::MeasuredNormalizedTime56,
            35 => Self::MeasuredScaledTime56,
            36 => Self::MeasuredFloatTime56,
            37 => Self::IntegratedTotalsTime56,
            38 => Self::ProtectionEventTime56,
            45 => Self::SingleCommand,
            46 => Self::DoubleCommand,
            47 => Self::RegulatingStep,
            48 => Self::SetpointNormalized,
            49 => Self::SetpointScaled,
            50 => Self::SetpointFloat,
            51 => Self::Bitstring32Command,
            70 => Self::EndOfInit,
            100 => Self::InterrogationCommand,
            101 => Self::CounterInterrogation,
            102 => Self::ReadCommand,
            103 => Self::ClockSync,
            104 => Self::TestCommand,
            105 => Self::ResetProcess,
            110 => Self::ParameterNormalized,
            111 => Self::ParameterScaled,
            112 => Self::ParameterFloat,
            113 => Self::ParameterActivation,
            _ => return Err(DecodeError::UnsupportedType(value)),
        })
    }

    /// Convert to raw byte value.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if this type is in the monitoring direction (from RTU to master).
    #[inline]
    pub const fn is_monitoring(&self) -> bool {
        matches!(self.as_u8(), 1..=44 | 70)
    }

    /// Check if this type is in the control direction (from master to RTU).
    #[inline]
    pub const fn is_control(&self) -> bool {
        matches!(self.as_u8(), 45..=69 | 100..=113)
    }

    /// Width of the trailing time tag, if the type carries one.
    #[inline]
    pub const fn time_tag(&self) -> Option<TimeWidth> {
        match self.as_u8() {
            2 | 4 | 6 | 8 | 10 | 12 | 14 | 16 | 17 => Some(TimeWidth::Cp24),
            30..=38 => Some(TimeWidth::Cp56),
            _ => None,
        }
    }

    /// Element layout carried by this type.
    pub(crate) const fn format(&self) -> Format {
        match self {
            Self::SinglePoint | Self::SinglePointTime24 | Self::SinglePointTime56 => {
                Format::SinglePoint
            }
            Self::DoublePoint | Self::DoublePointTime24 | Self::DoublePointTime56 => {
                Format::DoublePoint
            }
            Self::StepPosition | Self::StepPositionTime24 | Self::StepPositionTime56 => {
                Format::StepPosition
            }
            Self::Bitstring32 | Self::Bitstring32Time24 | Self::Bitstring32Time56 => {
                Format::Bitstring
            }
            Self::MeasuredNormalized
            | Self::MeasuredNormalizedTime24
            | Self::MeasuredNormalizedTime56 => Format::Normalized,
            Self::MeasuredNormalizedNoQuality => Format::NormalizedNoQuality,
            Self::MeasuredScaled | Self::MeasuredScaledTime24 | Self::MeasuredScaledTime56 => {
                Format::Scaled
            }
            Self::MeasuredFloat | Self::MeasuredFloatTime24 | Self::MeasuredFloatTime56 => {
                Format::Float
            }
            Self::IntegratedTotals
            | Self::IntegratedTotalsTime24
            | Self::IntegratedTotalsTime56 => Format::IntegratedTotal,
            Self::ProtectionEventTime24 | Self::ProtectionEventTime56 => Format::ProtectionEvent,
            Self::SingleCommand => Format::SingleCommand,
            Self::DoubleCommand => Format::DoubleCommand,
            Self::RegulatingStep => Format::RegulatingStep,
            Self::SetpointNormalized => Format::SetpointNormalized,
            Self::SetpointScaled => Format::SetpointScaled,
            Self::SetpointFloat => Format::SetpointFloat,
            Self::Bitstring32Command => Format::BitstringCommand,
            Self::EndOfInit => Format::EndOfInit,
            Self::InterrogationCommand => Format::Interrogation,
            Self::CounterInterrogation => Format::CounterInterrogation,
            Self::ReadCommand => Format::Read,
            Self::ClockSync => Format::ClockSync,
            Self::TestCommand => Format::TestCommand,
            Self::ResetProcess => Format::ResetProcess,
            Self::ParameterNormalized => Format::ParameterNormalized,
            Self::ParameterScaled => Format::ParameterScaled,
            Self::ParameterFloat => Format::ParameterFloat,
            Self::ParameterActivation => Format::ParameterActivation,
        }
    }

    /// Get the IEC standard name (e.g., "M_SP_NA_1").
    #[inline]
    pub const fn standard_name(&self) -> &'static str {
        match self {
            Self::SinglePoint => "M_SP_NA_1",
            Self::SinglePointTime24 => "M_SP_TA_1",
            Self::DoublePoint => "M_DP_NA_1",
            Self::DoublePointTime24 => "M_DP_TA_1",
            Self::StepPosition => "M_ST_NA_1",
            Self::StepPositionTime24 => "M_ST_TA_1",
            Self::Bitstring32 => "M_BO_NA_1",
            Self::Bitstring32Time24 => "M_BO_TA_1",
            Self::MeasuredNormalized => "M_ME_NA_1",
            Self::MeasuredNormalizedTime24 => "M_ME_TA_1",
            Self::MeasuredScaled => "M_ME_NB_1",
            Self::MeasuredScaledTime24 => "M_ME_TB_1",
            Self::MeasuredFloat => "M_ME_NC_1",
            Self::MeasuredFloatTime24 => "M_ME_TC_1",
            Self::IntegratedTotals => "M_IT_NA_1",
            Self::IntegratedTotalsTime24 => "M_IT_TA_1",
            Self::ProtectionEventTime24 => "M_EP_TA_1",
            Self::MeasuredNormalizedNoQuality => "M_ME_ND_1",
            Self::SinglePointTime56 => "M_SP_TB_1",
            Self::DoublePointTime56 => "M_DP_TB_1",
            Self::StepPositionTime56 => "M_ST_TB_1",
            Self::Bitstring32Time56 => "M_BO_TB_1",
            Self::MeasuredNormalizedTime56 => "M_ME_TD_1",
            Self::MeasuredScaledTime56 => "M_ME_TE_1",
            Self::MeasuredFloatTime56 => "M_ME_TF_1",
            Self::IntegratedTotalsTime56 => "M_IT_TB_1",
            Self::ProtectionEventTime56 => "M_EP_TD_1",
            Self::SingleCommand => "C_SC_NA_1",
            Self::DoubleCommand => "C_DC_NA_1",
            Self::RegulatingStep => "C_RC_NA_1",
            Self::SetpointNormalized => "C_SE_NA_1",
            Self::SetpointScaled => "C_SE_NB_1",
            Self::SetpointFloat => "C_SE_NC_1",
            Self::Bitstring32Command => "C_BO_NA_1",
            Self::EndOfInit => "M_EI_NA_1",
            Self::InterrogationCommand => "C_IC_NA_1",
            Self::CounterInterrogation => "C_CI_NA_1",
            Self::ReadCommand => "C_RD_NA_1",
            Self::ClockSync => "C_CS_NA_1",
            Self::TestCommand => "C_TS_NA_1",
            Self::ResetProcess => "C_RP_NA_1",
            Self::ParameterNormalized => "P_ME_NA_1",
            Self::ParameterScaled => "P_ME_NB_1",
            Self::ParameterFloat => "P_ME_NC_1",
            Self::ParameterActivation => "P_AC_NA_1",
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
        match self.time_tag() {
            Some(width) => TypeLayout::timed(width),
            None => TypeLayout::PLAIN,
        }
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

    const VALID_VALUES: [u8; 45] = [
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17,
        21,
        30, 31, 32, 33, 34, 35, 36, 37, 38,
        45, 46, 47, 48, 49, 50, 51,
        70,
        100, 101, 102, 103, 104, 105,
        110, 111, 112, 113,
    ];

    #[test]
    fn test_type_id_from_u8() {
        assert_eq!(TypeId::from_u8(1).unwrap(), TypeId::SinglePoint);
        assert_eq!(TypeId::from_u8(13).unwrap(), TypeId::MeasuredFloat);
        assert_eq!(TypeId::from_u8(100).unwrap(), TypeId::InterrogationCommand);
        assert_eq!(TypeId::from_u8(255), Err(DecodeError::UnsupportedType(255)));
    }

    #[test]
    fn test_type_id_all_values_roundtrip() {
        for val in VALID_VALUES {
            let type_id = TypeId::from_u8(val).unwrap();
            assert_eq!(type_id.as_u8(), val, "Roundtrip failed for value {}", val);
        }
    }

    #[test]
    fn test_type_id_invalid_values() {
        // Includes the IEC 104 only types
        let invalid_values = [0, 18, 20, 22, 29, 39, 44, 52, 58, 63, 64, 71, 99, 106, 107, 114, 255];

        for val in invalid_values {
            assert!(TypeId::from_u8(val).is_err(), "Expected error for TypeId value {}", val);
        }
    }

    #[test]
    fn test_type_id_direction() {
        for val in VALID_VALUES {
            let type_id = TypeId::from_u8(val).unwrap();
            assert_ne!(
                type_id.is_monitoring(),
                type_id.is_control(),
                "{:?} must have exactly one direction",
                type_id
            );
        }
        assert!(TypeId::EndOfInit.is_monitoring());
        assert!(TypeId::ParameterActivation.is_control());
    }

    #[test]
    fn test_type_id_layout() {
        assert_eq!(TypeId::SinglePoint.layout(), TypeLayout::PLAIN);
        assert_eq!(
            TypeId::ProtectionEventTime24.layout().time,
            Some(TimeWidth::Cp24)
        );
        assert_eq!(
            TypeId::IntegratedTotalsTime56.layout().time,
            Some(TimeWidth::Cp56)
        );
        for val in VALID_VALUES {
            let layout = TypeId::from_u8(val).unwrap().layout();
            assert!(layout.io_address);
            assert!(!layout.segmentable);
        }
    }

    #[test]
    fn test_type_id_display() {
        assert_eq!(format!("{}", TypeId::SinglePoint), "M_SP_NA_1");
        assert_eq!(format!("{}", TypeId::ProtectionEventTime56), "M_EP_TD_1");
        assert_eq!(format!("{}", TypeId::ParameterFloat), "P_ME_NC_1");
    }
}
