//! Protocol profiles.
//!
//! A [`Profile`] ties one closed set of type identifiers to the element enum
//! those types carry. The envelope and segmentation layers are generic over it;
//! every per-type decision is an exhaustive `match` inside the profile.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use bytes::BytesMut;

use crate::error::{DecodeError, EncodeError};
use crate::types::TimeWidth;

/// Wire layout of one type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeLayout {
    /// Information objects carry an address
    pub io_address: bool,
    /// Trailing time tag and its default width
    pub time: Option<TimeWidth>,
    /// Qualifier byte carries segment flags instead of a count
    pub segmentable: bool,
}

impl TypeLayout {
    /// Addressed objects without a time tag.
    pub const PLAIN: Self = Self {
        io_address: true,
        time: None,
        segmentable: false,
    };

    /// Addressed objects followed by a time tag of `width`.
    pub const fn timed(width: TimeWidth) -> Self {
        Self {
            time: Some(width),
            ..Self::PLAIN
        }
    }

    /// Unaddressed payload transferred in segments.
    pub const SEGMENTED: Self = Self {
        io_address: false,
        time: None,
        segmentable: true,
    };
}

/// Type identification of one protocol variant.
pub trait AsduType: Copy + Eq + Hash + Debug + Display + Send + Sync + 'static {
    /// Parse a raw type id.
    fn from_u8(value: u8) -> Result<Self, DecodeError>;

    /// Raw type id.
    fn as_u8(self) -> u8;

    /// Layout of ASDUs with this type.
    fn layout(self) -> TypeLayout;
}

/// Closed set of ASDU types and their element codecs.
pub trait Profile: Sized + 'static {
    /// Short protocol name used in log output.
    const NAME: &'static str;

    /// Type identification.
    type TypeId: AsduType;

    /// Information element carried by the types.
    type Element: Clone + PartialEq + Debug;

    /// Elements of an SQ=1 object sit at `address + index`. When false the
    /// whole run shares the one address (IEC 103 FUN/INF).
    const SEQUENTIAL_ADDRESSES: bool = true;

    /// Decode one element of `type_id`.
    fn decode_element(src: &mut &[u8], type_id: Self::TypeId)
        -> Result<Self::Element, DecodeError>;

    /// Encode one element as `type_id`.
    ///
    /// Fails with [`EncodeError::UnsupportedShape`] if the element is not
    /// what `type_id` carries.
    fn encode_element(
        element: &Self::Element,
        type_id: Self::TypeId,
        dst: &mut BytesMut,
    ) -> Result<(), EncodeError>;

    /// Wire type for an element with an optional trailing time tag.
    ///
    /// Total over all inputs: every legal combination has exactly one type,
    /// anything else is [`EncodeError::UnsupportedShape`].
    fn wire_type(element: &Self::Element, time: Option<TimeWidth>)
        -> Result<Self::TypeId, EncodeError>;
}
