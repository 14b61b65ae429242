//! ASDU (Application Service Data Unit) data model.
//!
//! An ASDU carries one type, one cause and one common address for all of its
//! information objects. The wire encoding lives in [`crate::envelope`].

use bytes::{BufMut, BytesMut};

use super::cot::Cause;
use super::primitive::take;
use super::time::Timestamp;
use crate::config::IoAddressSize;
use crate::error::{DecodeError, EncodeError};
use crate::profile::Profile;

/// Information Object Address (IOA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IoAddress(pub u32);

impl IoAddress {
    /// Create a new address.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Create an IEC 60870-5-103 address from function type (FUN) and
    /// information number (INF). FUN is sent first.
    #[inline]
    pub const fn function_info(function: u8, information: u8) -> Self {
        Self(function as u32 | (information as u32) << 8)
    }

    /// Function type (FUN) of an IEC 60870-5-103 address.
    #[inline]
    pub const fn function(&self) -> u8 {
        self.0 as u8
    }

    /// Information number (INF) of an IEC 60870-5-103 address.
    #[inline]
    pub const fn information(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Address of the element `index` positions after this one.
    #[inline]
    pub const fn offset(&self, index: usize) -> Self {
        Self(self.0.wrapping_add(index as u32))
    }

    /// Parse an address of `size` bytes (little-endian).
    pub fn decode(src: &mut &[u8], size: IoAddressSize) -> Result<Self, DecodeError> {
        let value = take(src, size.len(), "information object address")?
            .iter()
            .rev()
            .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));
        Ok(Self(value))
    }

    /// Encode as `size` bytes (little-endian).
    pub fn encode(&self, size: IoAddressSize, dst: &mut BytesMut) -> Result<(), EncodeError> {
        if self.0 > size.max() {
            return Err(EncodeError::out_of_range("information object address", self.0));
        }
        dst.put_slice(&self.0.to_le_bytes()[..size.len()]);
        Ok(())
    }
}

impl From<u32> for IoAddress {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for IoAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Information object: an address, its elements and an optional time tag.
///
/// With more than one element the object is a sequence (SQ=1) and element
/// `i` belongs to `address + i`.
#[derive(Debug, Clone, PartialEq)]
pub struct InformationObject<E> {
    /// Base address, absent for segmented payloads
    pub address: Option<IoAddress>,
    /// Elements
    pub elements: Vec<E>,
    /// Trailing time tag
    pub time: Option<Timestamp>,
}

impl<E> InformationObject<E> {
    /// Create an addressed object with one element.
    pub fn new(address: impl Into<IoAddress>, element: E) -> Self {
        Self {
            address: Some(address.into()),
            elements: vec![element],
            time: None,
        }
    }

    /// Create a sequence of elements at consecutive addresses.
    pub fn sequence(address: impl Into<IoAddress>, elements: Vec<E>) -> Self {
        Self {
            address: Some(address.into()),
            elements,
            time: None,
        }
    }

    /// Create an object without address.
    pub fn unaddressed(element: E) -> Self {
        Self {
            address: None,
            elements: vec![element],
            time: None,
        }
    }

    /// Attach a time tag.
    pub fn with_time(mut self, time: Timestamp) -> Self {
        self.time = Some(time);
        self
    }

    /// Elements paired with their addresses.
    pub fn addressed_elements(&self) -> impl Iterator<Item = (Option<IoAddress>, &E)> + '_ {
        self.elements
            .iter()
            .enumerate()
            .map(|(index, element)| (self.address.map(|base| base.offset(index)), element))
    }
}

/// Complete ASDU.
#[derive(Debug, Clone, PartialEq)]
pub struct Asdu<P: Profile> {
    /// Type identification
    pub type_id: P::TypeId,
    /// Cause of transmission
    pub cause: Cause,
    /// Common address of ASDU (station address)
    pub address: u16,
    /// Information objects
    pub objects: Vec<InformationObject<P::Element>>,
}

impl<P: Profile> Asdu<P> {
    /// Create a new ASDU.
    pub fn new(
        type_id: P::TypeId,
        cause: Cause,
        address: u16,
        objects: Vec<InformationObject<P::Element>>,
    ) -> Self {
        Self {
            type_id,
            cause,
            address,
            objects,
        }
    }

    /// Create an ASDU whose type is derived from its objects.
    ///
    /// Every element must map to the same wire type given the time tag of
    /// its object.
    pub fn with_inferred_type(
        cause: Cause,
        address: u16,
        objects: Vec<InformationObject<P::Element>>,
    ) -> Result<Self, EncodeError> {
        let mut inferred: Option<P::TypeId> = None;
        for object in &objects {
            let width = object.time.map(|time| time.precision);
            for element in &object.elements {
                let type_id = P::wire_type(element, width)?;
                match inferred {
                    Some(existing) if existing != type_id => {
                        return Err(EncodeError::unsupported_shape(format!(
                            "mixed types {existing} and {type_id} in one ASDU"
                        )));
                    }
                    _ => inferred = Some(type_id),
                }
            }
        }
        let type_id = inferred
            .ok_or_else(|| EncodeError::unsupported_shape("no elements to infer a type from"))?;
        Ok(Self::new(type_id, cause, address, objects))
    }

    /// Total number of elements over all objects.
    pub fn element_count(&self) -> usize {
        self.objects.iter().map(|object| object.elements.len()).sum()
    }

    /// Iterate over all elements with their addresses.
    ///
    /// Profiles without sequential addressing give every element of an
    /// object the object's own address.
    pub fn addressed_elements(&self) -> impl Iterator<Item = (Option<IoAddress>, &P::Element)> + '_ {
        self.objects.iter().flat_map(|object| {
            object.elements.iter().enumerate().map(move |(index, element)| {
                let address = if P::SEQUENTIAL_ADDRESSES {
                    object.address.map(|base| base.offset(index))
                } else {
                    object.address
                };
                (address, element)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iec101::{Element, Iec101, TypeId};
    use crate::profile::AsduType;
    use crate::types::{CauseType, Quality, TimeWidth};

    fn single(value: bool) -> Element {
        Element::SinglePoint {
            value,
            quality: Quality::GOOD,
        }
    }

    #[test]
    fn test_io_address_widths() {
        let mut buf = BytesMut::new();
        IoAddress::new(0x123456)
            .encode(IoAddressSize::Three, &mut buf)
            .unwrap();
        assert_eq!(&buf[..], &[0x56, 0x34, 0x12]);

        let mut src = &buf[..];
        let parsed = IoAddress::decode(&mut src, IoAddressSize::Three).unwrap();
        assert_eq!(parsed.value(), 0x123456);
        assert!(src.is_empty());

        let mut buf = BytesMut::new();
        IoAddress::new(0x0102).encode(IoAddressSize::Two, &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x02, 0x01]);
    }

    #[test]
    fn test_function_info_address() {
        let address = IoAddress::function_info(160, 64);
        assert_eq!(address.function(), 160);
        assert_eq!(address.information(), 64);

        let mut buf = BytesMut::new();
        address.encode(IoAddressSize::Two, &mut buf).unwrap();
        assert_eq!(&buf[..], &[160, 64]);
    }

    #[test]
    fn test_io_address_out_of_range() {
        let mut buf = BytesMut::new();
        let err = IoAddress::new(256)
            .encode(IoAddressSize::One, &mut buf)
            .unwrap_err();
        assert!(matches!(err, EncodeError::ValueOutOfRange { .. }));
        assert!(buf.is_empty());

        let err = IoAddress::decode(&mut &[0x01, 0x02][..], IoAddressSize::Three).unwrap_err();
        assert_eq!(err, DecodeError::truncated("information object address", 3, 2));
    }

    #[test]
    fn test_sequence_addresses() {
        let object = InformationObject::sequence(100u32, vec![single(true), single(false), single(true)]);
        let addresses: Vec<_> = object
            .addressed_elements()
            .map(|(address, _)| address.map(|a| a.value()))
            .collect();
        assert_eq!(addresses, vec![Some(100), Some(101), Some(102)]);

        let object = InformationObject::unaddressed(single(true));
        assert_eq!(object.addressed_elements().next().map(|(a, _)| a), Some(None));
    }

    #[test]
    fn test_inferred_type() {
        let cause = Cause::new(CauseType::Spontaneous);
        let asdu = Asdu::<Iec101>::with_inferred_type(
            cause,
            1,
            vec![
                InformationObject::new(1u32, single(true)),
                InformationObject::new(2u32, single(false)),
            ],
        )
        .unwrap();
        assert_eq!(asdu.type_id, TypeId::SinglePoint);
        assert_eq!(asdu.element_count(), 2);

        let timed = InformationObject::new(3u32, single(true))
            .with_time(Timestamp::cp56(0, 0, 0, 1, 1, 24));
        let asdu = Asdu::<Iec101>::with_inferred_type(cause, 1, vec![timed.clone()]).unwrap();
        assert_eq!(asdu.type_id, TypeId::SinglePointTime56);
        assert_eq!(asdu.type_id.layout().time, Some(TimeWidth::Cp56));

        let err = Asdu::<Iec101>::with_inferred_type(
            cause,
            1,
            vec![InformationObject::new(1u32, single(true)), timed],
        )
        .unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedShape(_)));

        let err = Asdu::<Iec101>::with_inferred_type(cause, 1, Vec::new()).unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedShape(_)));
    }
}
