//! IEC 60870-5-104 Type Identification.
//!
//! The 101 type set without CP24Time2a types, plus CP56Time2a tagged
//! commands.

use crate::error::DecodeError;
use crate::iec101::Format;
use crate::profile::{AsduType, TypeLayout};
use crate::types::TimeWidth;

/// IEC 60870-5-104 Type Identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeId {
    // ============================================
    // Process information in monitoring direction
    // ============================================
    /// Single-point information (M_SP_NA_1)
    SinglePoint = 1,

    /// Double-point information (M_DP_NA_1)
    DoublePoint = 3,

    /// Step position information (M_ST_NA_1)
    StepPosition = 5,

    /// Bitstring of 32 bit (M_BO_NA_1)
    Bitstring32 = 7,

    /// Measured value, normalized (M_ME_NA_1)
    MeasuredNormalized = 9,

    /// Measured value, scaled (M_ME_NB_1)
    MeasuredScaled = 11,

    /// Measured value, short floating point (M_ME_NC_1)
    MeasuredFloat = 13,

    /// Integrated totals (M_IT_NA_1)
    IntegratedTotals = 15,

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

    /// Single command with time tag CP56Time2a (C_SC_TA_1)
    SingleCommandTime56 = 58,

    /// Double command with time tag CP56Time2a (C_DC_TA_1)
    DoubleCommandTime56 = 59,

    /// Regulating step command with time tag CP56Time2a (C_RC_TA_1)
    RegulatingStepTime56 = 60,

    /// Set-point command, normalized with time tag CP56Time2a (C_SE_TA_1)
    SetpointNormalizedTime56 = 61,

    /// Set-point command, scaled with time tag CP56Time2a (C_SE_TB_1)
    SetpointScaledTime56 = 62,

    /// Set-point command, short floating point with time tag CP56Time2a (C_SE_TC_1)
    SetpointFloatTime56 = 63,

    /// Bitstring of 32 bit command with time tag CP56Time2a (C_BO_TA_1)
    Bitstring32CommandTime56 = 64,

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

    /// Reset process command (C_RP_NA_1)
    ResetProcess = 105,

    /// Test command with time tag CP56Time2a (C_TS_TA_1)
    TestCommandTime56 = 107,

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
            3 => Self::DoublePoint,
            5 => Self::StepPosition,
            7 => Self::Bitstring32,
            9 => Self::MeasuredNormalized,
            11 => Self::MeasuredScaled,
            13 => Self::MeasuredFloat,
            15 => Self::IntegratedTotals,
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
            58 => Self::SingleCommandTime56,
            59 => Self::DoubleCommandTime56,
            60 => Self::RegulatingStepTime56,
            61 => Self::SetpointNormalizedTime56,
            62 => Self::SetpointScaledTime56,
            63 => Self::SetpointFloatTime56,
            64 => Self::Bitstring32CommandTime56,
            70 => Self::EndOfInit,
            100 => Self::InterrogationCommand,
            101 => Self::CounterInterrogation,
            102 => Self::ReadCommand,
            103 => Self::ClockSync,
            105 => Self::ResetProcess,
            107 => Self::TestCommandTime56,
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

    /// Check if this type contains a time tag.
    #[inline]
    pub const fn has_time_tag(&self) -> bool {
        matches!(self.as_u8(), 30..=38 | 58..=64 | 107)
    }

    pub(crate) const fn format(&self) -> Format {
        match self {
            Self::SinglePoint | Self::SinglePointTime56 => Format::SinglePoint,
            Self::DoublePoint | Self::DoublePointTime56 => Format::DoublePoint,
            Self::StepPosition | Self::StepPositionTime56 => Format::StepPosition,
            Self::Bitstring32 | Self::Bitstring32Time56 => Format::Bitstring,
            Self::MeasuredNormalized | Self::MeasuredNormalizedTime56 => Format::Normalized,
            Self::MeasuredNormalizedNoQuality => Format::NormalizedNoQuality,
            Self::MeasuredScaled | Self::MeasuredScaledTime56 => Format::Scaled,
            Self::MeasuredFloat | Self::MeasuredFloatTime56 => Format::Float,
            Self::IntegratedTotals | Self::IntegratedTotalsTime56 => Format::IntegratedTotal,
            Self::ProtectionEventTime56 => Format::ProtectionEvent,
            Self::SingleCommand | Self::SingleCommandTime56 => Format::SingleCommand,
            Self::DoubleCommand | Self::DoubleCommandTime56 => Format::DoubleCommand,
            Self::RegulatingStep | Self::RegulatingStepTime56 => Format::RegulatingStep,
            Self::SetpointNormalized | Self::SetpointNormalizedTime56 => Format::SetpointNormalized,
            Self::SetpointScaled | Self::SetpointScaledTime56 => Format::SetpointScaled,
            Self::SetpointFloat | Self::SetpointFloatTime56 => Format::SetpointFloat,
            Self::Bitstring32Command | Self::Bitstring32CommandTime56 => Format::BitstringCommand,
            Self::EndOfInit => Format::EndOfInit,
            Self::InterrogationCommand => Format::Interrogation,
            Self::CounterInterrogation => Format::CounterInterrogation,
            Self::ReadCommand => Format::Read,
            Self::ClockSync => Format::ClockSync,
            Self::ResetProcess => Format::ResetProcess,
            Self::TestCommandTime56 => Format::TestCommand,
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
            Self::DoublePoint => "M_DP_NA_1",
            Self::StepPosition => "M_ST_NA_1",
            Self::Bitstring32 => "M_BO_NA_1",
            Self::MeasuredNormalized => "M_ME_NA_1",
            Self::MeasuredScaled => "M_ME_NB_1",
            Self::MeasuredFloat => "M_ME_NC_1",
            Self::IntegratedTotals => "M_IT_NA_1",
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
            Self::SingleCommandTime56 => "C_SC_TA_1",
            Self::DoubleCommandTime56 => "C_DC_TA_1",
            Self::RegulatingStepTime56 => "C_RC_TA_1",
            Self::SetpointNormalizedTime56 => "C_SE_TA_1",
            Self::SetpointScaledTime56 => "C_SE_TB_1",
            Self::SetpointFloatTime56 => "C_SE_TC_1",
            Self::Bitstring32CommandTime56 => "C_BO_TA_1",
            Self::EndOfInit => "M_EI_NA_1",
            Self::InterrogationCommand => "C_IC_NA_1",
            Self::CounterInterrogation => "C_CI_NA_1",
            Self::ReadCommand => "C_RD_NA_1",
            Self::ClockSync => "C_CS_NA_1",
            Self::ResetProcess => "C_RP_NA_1",
            Self::TestCommandTime56 => "C_TS_TA_1",
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
        if self.has_time_tag() {
            TypeLayout::timed(TimeWidth::Cp56)
        } else {
            TypeLayout::PLAIN
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

    #[test]
    fn test_type_id_all_values_roundtrip() {
        let valid_values = [
            1, 3, 5, 7, 9, 11, 13, 15, 21,
            30, 31, 32, 33, 34, 35, 36, 37, 38,
            45, 46, 47, 48, 49, 50, 51,
            58, 59, 60, 61, 62, 63, 64,
            70,
            100, 101, 102, 103, 105, 107,
            110, 111, 112, 113,
        ];

        for val in valid_values {
            let type_id = TypeId::from_u8(val).unwrap();
            assert_eq!(type_id.as_u8(), val, "Roundtrip failed for value {}", val);
        }
    }

    #[test]
    fn test_type_id_invalid_values() {
        // CP24 types and the untagged test command are 101 only
        let invalid_values = [0, 2, 4, 6, 8, 10, 12, 14, 16, 17, 29, 44, 52, 65, 71, 99, 104, 106, 108, 200, 255];

        for val in invalid_values {
            let result = TypeId::from_u8(val);
            assert_eq!(result, Err(DecodeError::UnsupportedType(val)));
        }
    }

    #[test]
    fn test_type_id_time_tagged_types() {
        let time_tagged = [
            TypeId::SinglePointTime56,
            TypeId::DoublePointTime56,
            TypeId::MeasuredFloatTime56,
            TypeId::ProtectionEventTime56,
            TypeId::SingleCommandTime56,
            TypeId::DoubleCommandTime56,
            TypeId::Bitstring32CommandTime56,
            TypeId::SetpointFloatTime56,
            TypeId::TestCommandTime56,
        ];

        for type_id in time_tagged {
            assert!(type_id.has_time_tag(), "{:?} should have time tag", type_id);
            assert_eq!(type_id.layout().time, Some(TimeWidth::Cp56));
        }

        let no_time_tag = [
            TypeId::SinglePoint,
            TypeId::DoublePoint,
            TypeId::MeasuredFloat,
            TypeId::SingleCommand,
            TypeId::InterrogationCommand,
            TypeId::ClockSync,
        ];

        for type_id in no_time_tag {
            assert!(!type_id.has_time_tag(), "{:?} should not have time tag", type_id);
            assert_eq!(type_id.layout(), TypeLayout::PLAIN);
        }
    }

    #[test]
    fn test_type_id_direction() {
        assert!(TypeId::SinglePoint.is_monitoring());
        assert!(!TypeId::SinglePoint.is_control());
        assert!(TypeId::SingleCommandTime56.is_control());
        assert!(TypeId::TestCommandTime56.is_control());
        assert!(TypeId::EndOfInit.is_monitoring());
    }

    #[test]
    fn test_type_id_display() {
        assert_eq!(format!("{}", TypeId::SinglePoint), "M_SP_NA_1");
        assert_eq!(format!("{}", TypeId::MeasuredFloat), "M_ME_NC_1");
        assert_eq!(format!("{}", TypeId::RegulatingStepTime56), "C_RC_TA_1");
        assert_eq!(format!("{}", TypeId::TestCommandTime56), "C_TS_TA_1");
    }
}
