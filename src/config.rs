//! Link parameters for the ASDU codec.
//!
//! Field widths differ between the companion standards: IEC 101 and 103 links
//! usually run 1-byte cause and common address fields with 2-byte object
//! addresses, IEC 104 always uses 2/2/3.

use std::collections::HashMap;

use crate::profile::AsduType;
use crate::types::TimeWidth;

/// Default maximum payload per segment (ASDU length minus a 6-byte header).
pub const DEFAULT_MAX_SEGMENT_SIZE: usize = 243;

/// Width of the cause of transmission field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CauseSize {
    /// Cause only
    One,
    /// Cause followed by the originator address
    Two,
}

impl CauseSize {
    /// Encoded length in bytes.
    #[inline]
    pub const fn len(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// Width of the common address of ASDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonAddressSize {
    /// 1 byte (0-255)
    One,
    /// 2 bytes (0-65535)
    Two,
}

impl CommonAddressSize {
    /// Encoded length in bytes.
    #[inline]
    pub const fn len(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Largest address that fits.
    #[inline]
    pub const fn max(self) -> u16 {
        match self {
            Self::One => 0xFF,
            Self::Two => 0xFFFF,
        }
    }
}

/// Width of the information object address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoAddressSize {
    /// 1 byte
    One,
    /// 2 bytes
    Two,
    /// 3 bytes
    Three,
}

impl IoAddressSize {
    /// Encoded length in bytes.
    #[inline]
    pub const fn len(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Largest address that fits.
    #[inline]
    pub const fn max(self) -> u32 {
        match self {
            Self::One => 0xFF,
            Self::Two => 0xFFFF,
            Self::Three => 0x00FF_FFFF,
        }
    }
}

/// Codec configuration, fixed for the lifetime of a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Cause of transmission width
    pub cause_size: CauseSize,
    /// Common address width
    pub address_size: CommonAddressSize,
    /// Information object address width
    pub io_address_size: IoAddressSize,
    /// Flip the polarity of the SQ bit in the qualifier byte
    pub inverted_sequence_bit: bool,
    /// Maximum payload bytes per segment
    pub max_segment_size: usize,
    /// Trailing time width per raw type id, overriding the type's default
    pub time_widths: HashMap<u8, TimeWidth>,
}

impl CodecConfig {
    /// IEC 60870-5-101 defaults: 1-byte cause, 1-byte common address,
    /// 2-byte object address.
    pub fn iec101() -> Self {
        Self {
            cause_size: CauseSize::One,
            address_size: CommonAddressSize::One,
            io_address_size: IoAddressSize::Two,
            inverted_sequence_bit: false,
            max_segment_size: DEFAULT_MAX_SEGMENT_SIZE,
            time_widths: HashMap::new(),
        }
    }

    /// IEC 60870-5-103 defaults. The object address is FUN + INF.
    pub fn iec103() -> Self {
        Self::iec101()
    }

    /// IEC 60870-5-104 defaults: 2-byte cause, 2-byte common address,
    /// 3-byte object address.
    pub fn iec104() -> Self {
        Self {
            cause_size: CauseSize::Two,
            address_size: CommonAddressSize::Two,
            io_address_size: IoAddressSize::Three,
            ..Self::iec101()
        }
    }

    /// Set cause of transmission width.
    pub fn with_cause_size(mut self, size: CauseSize) -> Self {
        self.cause_size = size;
        self
    }

    /// Set common address width.
    pub fn with_address_size(mut self, size: CommonAddressSize) -> Self {
        self.address_size = size;
        self
    }

    /// Set information object address width.
    pub fn with_io_address_size(mut self, size: IoAddressSize) -> Self {
        self.io_address_size = size;
        self
    }

    /// Set SQ bit polarity.
    pub fn with_inverted_sequence_bit(mut self, inverted: bool) -> Self {
        self.inverted_sequence_bit = inverted;
        self
    }

    /// Set maximum payload bytes per segment.
    pub fn with_max_segment_size(mut self, size: usize) -> Self {
        self.max_segment_size = size;
        self
    }

    /// Override the trailing time width of one type id.
    pub fn with_time_width(mut self, type_id: u8, width: TimeWidth) -> Self {
        self.time_widths.insert(type_id, width);
        self
    }

    /// Trailing time width for `type_id`: the configured override if the
    /// type carries a time tag at all, otherwise the type's own default.
    pub fn time_width_for<T: AsduType>(&self, type_id: T) -> Option<TimeWidth> {
        let default = type_id.layout().time?;
        Some(
            self.time_widths
                .get(&type_id.as_u8())
                .copied()
                .unwrap_or(default),
        )
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::iec104()
    }
}
