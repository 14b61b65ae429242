//! Quality descriptors.
//!
//! One flag set is shared by every element; the [`QualityKind`] decides
//! which flags exist on the wire and where they sit in the octet.
//!
//! ```text
//!              | 7  | 6  | 5  | 4  | 3  | 2..0        |
//! indication   | IV | NT | SB | BL | -  | (value)     |  SIQ / DIQ
//! measurement  | IV | NT | SB | BL | -  | OV at bit 0 |  QDS
//! counter      | IV | CA | CY | SQ (4..0)            |  BCR sequence octet
//! protection   | IV | NT | SB | BL | EI | (value)     |  SEP / QDP
//! ```

use crate::error::EncodeError;

/// Which quality octet layout applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityKind {
    /// Single/double point (SIQ, DIQ)
    Indication,
    /// Measured values (QDS)
    Measurement,
    /// Integrated totals (BCR sequence octet)
    Counter,
    /// Protection equipment events (SEP, QDP)
    Protection,
}

impl QualityKind {
    const IV: u8 = 0x80;
    const NT: u8 = 0x40;
    const SB: u8 = 0x20;
    const BL: u8 = 0x10;
    const EI: u8 = 0x08;
    const OV: u8 = 0x01;
    const CA: u8 = 0x40;
    const CY: u8 = 0x20;
    const SQ: u8 = 0x1F;

    /// Bits of the octet owned by the quality flags of this kind.
    #[inline]
    pub const fn mask(self) -> u8 {
        match self {
            Self::Indication => Self::IV | Self::NT | Self::SB | Self::BL,
            Self::Measurement => Self::IV | Self::NT | Self::SB | Self::BL | Self::OV,
            Self::Counter => 0xFF,
            Self::Protection => Self::IV | Self::NT | Self::SB | Self::BL | Self::EI,
        }
    }
}

/// Quality flags for an information element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Quality {
    /// Invalid (IV)
    pub invalid: bool,
    /// Not topical (NT)
    pub not_topical: bool,
    /// Substituted (SB)
    pub substituted: bool,
    /// Blocked (BL)
    pub blocked: bool,
    /// Overflow (OV), or carry (CY) for counters
    pub overflow: bool,
    /// Counter was adjusted (CA)
    pub adjusted: bool,
    /// Counter sequence number (SQ, 0-31)
    pub sequence: u8,
    /// Elapsed time invalid (EI)
    pub elapsed_time_invalid: bool,
}

impl Quality {
    /// Good quality (all flags clear).
    pub const GOOD: Self = Self {
        invalid: false,
        not_topical: false,
        substituted: false,
        blocked: false,
        overflow: false,
        adjusted: false,
        sequence: 0,
        elapsed_time_invalid: false,
    };

    /// Invalid quality.
    pub const INVALID: Self = Self {
        invalid: true,
        ..Self::GOOD
    };

    /// Check if quality is good (no flags set).
    #[inline]
    pub const fn is_good(&self) -> bool {
        !self.invalid
            && !self.not_topical
            && !self.substituted
            && !self.blocked
            && !self.overflow
            && !self.adjusted
            && !self.elapsed_time_invalid
    }

    /// Parse the quality bits of `byte` for `kind`. Bits outside the kind's
    /// layout are ignored.
    pub fn decode(byte: u8, kind: QualityKind) -> Self {
        let bit = |mask: u8| (byte & mask) != 0;
        match kind {
            QualityKind::Counter => Self {
                invalid: bit(QualityKind::IV),
                adjusted: bit(QualityKind::CA),
                overflow: bit(QualityKind::CY),
                sequence: byte & QualityKind::SQ,
                ..Self::GOOD
            },
            _ => Self {
                invalid: bit(QualityKind::IV),
                not_topical: bit(QualityKind::NT),
                substituted: bit(QualityKind::SB),
                blocked: bit(QualityKind::BL),
                overflow: matches!(kind, QualityKind::Measurement) && bit(QualityKind::OV),
                elapsed_time_invalid: matches!(kind, QualityKind::Protection)
                    && bit(QualityKind::EI),
                ..Self::GOOD
            },
        }
    }

    /// Encode the quality bits for `kind`.
    ///
    /// Fails if a flag is set that `kind` has no bit for, so decoding the
    /// result always reproduces `self`.
    pub fn encode(&self, kind: QualityKind) -> Result<u8, EncodeError> {
        let unsupported = match kind {
            QualityKind::Indication => {
                self.overflow || self.adjusted || self.sequence != 0 || self.elapsed_time_invalid
            }
            QualityKind::Measurement => {
                self.adjusted || self.sequence != 0 || self.elapsed_time_invalid
            }
            QualityKind::Counter => {
                self.not_topical
                    || self.substituted
                    || self.blocked
                    || self.elapsed_time_invalid
                    || self.sequence > QualityKind::SQ
            }
            QualityKind::Protection => self.overflow || self.adjusted || self.sequence != 0,
        };
        if unsupported {
            return Err(EncodeError::out_of_range("quality", format!("{self} for {kind:?}")));
        }

        let flag = |set: bool, mask: u8| if set { mask } else { 0 };
        Ok(match kind {
            QualityKind::Counter => {
                flag(self.invalid, QualityKind::IV)
                    | flag(self.adjusted, QualityKind::CA)
                    | flag(self.overflow, QualityKind::CY)
                    | self.sequence
            }
            _ => {
                flag(self.invalid, QualityKind::IV)
                    | flag(self.not_topical, QualityKind::NT)
                    | flag(self.substituted, QualityKind::SB)
                    | flag(self.blocked, QualityKind::BL)
                    | flag(self.overflow, QualityKind::OV)
                    | flag(self.elapsed_time_invalid, QualityKind::EI)
            }
        })
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_good() && self.sequence == 0 {
            return f.write_str("Good");
        }

        let flags = [
            (self.invalid, "IV"),
            (self.not_topical, "NT"),
            (self.substituted, "SB"),
            (self.blocked, "BL"),
            (self.overflow, "OV"),
            (self.adjusted, "CA"),
            (self.elapsed_time_invalid, "EI"),
        ];
        let mut first = true;
        for (_, name) in flags.iter().filter(|(set, _)| *set) {
            if !first {
                f.write_str("|")?;
            }
            first = false;
            f.write_str(name)?;
        }
        if self.sequence != 0 {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "SQ={}", self.sequence)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indication_quality() {
        let quality = Quality::decode(0x91, QualityKind::Indication);
        assert!(quality.blocked);
        assert!(quality.invalid);
        assert!(!quality.substituted);
        assert!(!quality.not_topical);
        // Bit 0 is the SPI value, not a quality flag
        assert!(!quality.overflow);

        assert_eq!(quality.encode(QualityKind::Indication).unwrap(), 0x90);
    }

    #[test]
    fn test_measurement_quality() {
        let quality = Quality::decode(0x81, QualityKind::Measurement);
        assert!(quality.invalid);
        assert!(quality.overflow);
        assert_eq!(quality.encode(QualityKind::Measurement).unwrap(), 0x81);
    }

    #[test]
    fn test_counter_quality() {
        let quality = Quality::decode(0xE5, QualityKind::Counter);
        assert!(quality.invalid);
        assert!(quality.adjusted);
        assert!(quality.overflow);
        assert_eq!(quality.sequence, 5);
        assert!(!quality.not_topical);
        assert_eq!(quality.encode(QualityKind::Counter).unwrap(), 0xE5);
    }

    #[test]
    fn test_protection_quality() {
        let quality = Quality::decode(0x0B, QualityKind::Protection);
        assert!(quality.elapsed_time_invalid);
        assert!(!quality.invalid);
        assert_eq!(quality.encode(QualityKind::Protection).unwrap(), 0x08);
    }

    #[test]
    fn test_flag_not_in_kind_rejected() {
        let overflow = Quality {
            overflow: true,
            ..Quality::GOOD
        };
        assert!(overflow.encode(QualityKind::Indication).is_err());
        assert!(overflow.encode(QualityKind::Protection).is_err());

        let sequenced = Quality {
            sequence: 3,
            ..Quality::GOOD
        };
        assert!(sequenced.encode(QualityKind::Measurement).is_err());
        assert!(Quality {
            sequence: 32,
            ..Quality::GOOD
        }
        .encode(QualityKind::Counter)
        .is_err());
        assert!(Quality {
            blocked: true,
            ..Quality::GOOD
        }
        .encode(QualityKind::Counter)
        .is_err());
    }

    #[test]
    fn test_every_octet_roundtrips_within_mask() {
        for kind in [
            QualityKind::Indication,
            QualityKind::Measurement,
            QualityKind::Counter,
            QualityKind::Protection,
        ] {
            for byte in 0..=255u8 {
                let quality = Quality::decode(byte, kind);
                assert_eq!(quality.encode(kind).unwrap(), byte & kind.mask());
            }
        }
    }

    #[test]
    fn test_quality_display() {
        assert_eq!(Quality::GOOD.to_string(), "Good");
        assert_eq!(Quality::INVALID.to_string(), "IV");
        let quality = Quality {
            blocked: true,
            invalid: true,
            sequence: 2,
            ..Quality::GOOD
        };
        assert_eq!(quality.to_string(), "IV|BL|SQ=2");
    }
}
