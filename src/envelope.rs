//! ASDU envelope codec.
//!
//! ```text
//! +---------+-----------+-------------+----------------+-------------------+
//! | type id | qualifier | cause (1|2) | address (1|2)  | information objs  |
//! +---------+-----------+-------------+----------------+-------------------+
//! ```
//!
//! Each information object is `address (1|2|3)? element+ time?`. With the
//! SQ bit set one address is followed by a run of elements at consecutive
//! addresses.

use bytes::{BufMut, BytesMut};

use crate::config::{CodecConfig, CommonAddressSize};
use crate::error::{DecodeError, EncodeError};
use crate::profile::{AsduType, Profile};
use crate::segment::SegmentFlags;
use crate::types::primitive::{ensure, read_u8};
use crate::types::{Asdu, Cause, InformationObject, IoAddress, TimeWidth, Timestamp};

/// Largest object (or sequence element) count.
pub const MAX_OBJECTS: usize = 127;

/// Qualifier byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    /// Variable structure qualifier of non-segmentable types
    Objects {
        /// Number of objects, or of elements when `sequence` is set
        count: u8,
        /// One address followed by sequential elements (SQ=1)
        sequence: bool,
    },
    /// Segment flags of segmentable types
    Segment(SegmentFlags),
}

impl Qualifier {
    /// Parse a qualifier byte.
    #[inline]
    pub const fn from_u8(byte: u8, segmentable: bool, inverted_sequence_bit: bool) -> Self {
        if segmentable {
            return Self::Segment(SegmentFlags::from_u8(byte));
        }
        Self::Objects {
            count: byte & 0x7F,
            sequence: ((byte & 0x80) != 0) != inverted_sequence_bit,
        }
    }

    /// Encode to a qualifier byte.
    #[inline]
    pub const fn as_u8(&self, inverted_sequence_bit: bool) -> u8 {
        match self {
            Self::Objects { count, sequence } => {
                (*count & 0x7F) | if *sequence != inverted_sequence_bit { 0x80 } else { 0 }
            }
            Self::Segment(flags) => flags.as_u8(),
        }
    }
}

/// ASDU header (fixed part).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<T> {
    /// Type identification
    pub type_id: T,
    /// Qualifier byte
    pub qualifier: Qualifier,
    /// Cause of transmission
    pub cause: Cause,
    /// Common address of ASDU
    pub address: u16,
}

impl<T: AsduType> Header<T> {
    /// Encoded header length for `config`.
    #[inline]
    pub fn encoded_len(config: &CodecConfig) -> usize {
        2 + config.cause_size.len() + config.address_size.len()
    }

    /// Encode the header.
    pub fn encode(&self, config: &CodecConfig, dst: &mut BytesMut) -> Result<(), EncodeError> {
        if self.address > config.address_size.max() {
            return Err(EncodeError::out_of_range("common address", self.address));
        }
        dst.put_u8(self.type_id.as_u8());
        dst.put_u8(self.qualifier.as_u8(config.inverted_sequence_bit));
        self.cause.encode(config.cause_size, dst)?;
        match config.address_size {
            CommonAddressSize::One => dst.put_u8(self.address as u8),
            CommonAddressSize::Two => dst.put_u16_le(self.address),
        }
        Ok(())
    }

    /// Decode the header.
    pub fn decode(src: &mut &[u8], config: &CodecConfig) -> Result<Self, DecodeError> {
        ensure(src, Self::encoded_len(config), "ASDU header")?;
        let type_id = T::from_u8(read_u8(src, "type id")?)?;
        let qualifier = Qualifier::from_u8(
            read_u8(src, "qualifier")?,
            type_id.layout().segmentable,
            config.inverted_sequence_bit,
        );
        let cause = Cause::decode(src, config.cause_size)?;
        let address = match config.address_size {
            CommonAddressSize::One => u16::from(read_u8(src, "common address")?),
            CommonAddressSize::Two => crate::types::primitive::read_u16(src, "common address")?,
        };
        Ok(Self {
            type_id,
            qualifier,
            cause,
            address,
        })
    }
}

/// Result of decoding one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<'a, P: Profile> {
    /// Complete ASDU
    Asdu(Asdu<P>),
    /// One segment of a segmented transfer
    Segment {
        /// Header of the segment frame
        header: Header<P::TypeId>,
        /// Segment flags from the qualifier
        flags: SegmentFlags,
        /// Payload part of the frame
        chunk: &'a [u8],
    },
}

/// Encode a non-segmentable ASDU.
pub fn encode_asdu<P: Profile>(
    asdu: &Asdu<P>,
    config: &CodecConfig,
    dst: &mut BytesMut,
) -> Result<(), EncodeError> {
    let layout = asdu.type_id.layout();
    if layout.segmentable {
        return Err(EncodeError::unsupported_shape(format!(
            "{} is transferred in segments",
            asdu.type_id
        )));
    }
    let width = config.time_width_for(asdu.type_id);
    let qualifier = objects_qualifier(asdu)?;

    let header = Header {
        type_id: asdu.type_id,
        qualifier,
        cause: asdu.cause,
        address: asdu.address,
    };
    // Staged so a failing object leaves `dst` untouched
    let mut frame = BytesMut::new();
    header.encode(config, &mut frame)?;

    for object in &asdu.objects {
        match (layout.io_address, object.address) {
            (true, Some(address)) => {
                if P::SEQUENTIAL_ADDRESSES {
                    let last = address.offset(object.elements.len().saturating_sub(1));
                    if last.value() > config.io_address_size.max() {
                        return Err(EncodeError::out_of_range("information object address", last));
                    }
                }
                address.encode(config.io_address_size, &mut frame)?;
            }
            (false, None) => {}
            (true, None) => {
                return Err(EncodeError::unsupported_shape(format!(
                    "{} requires an information object address",
                    asdu.type_id
                )));
            }
            (false, Some(_)) => {
                return Err(EncodeError::unsupported_shape(format!(
                    "{} carries no information object address",
                    asdu.type_id
                )));
            }
        }
        for element in &object.elements {
            P::encode_element(element, asdu.type_id, &mut frame)?;
        }
        encode_time(asdu.type_id, object.time.as_ref(), width, &mut frame)?;
    }
    dst.extend_from_slice(&frame);
    Ok(())
}

/// Serialize the payload of a segmentable ASDU: element plus optional time.
pub fn encode_segment_payload<P: Profile>(
    asdu: &Asdu<P>,
    config: &CodecConfig,
) -> Result<BytesMut, EncodeError> {
    let object = match asdu.objects.as_slice() {
        [object] if object.elements.len() == 1 && object.address.is_none() => object,
        _ => {
            return Err(EncodeError::unsupported_shape(format!(
                "{} carries exactly one unaddressed element",
                asdu.type_id
            )));
        }
    };
    let mut payload = BytesMut::new();
    for element in &object.elements {
        P::encode_element(element, asdu.type_id, &mut payload)?;
    }
    encode_time(
        asdu.type_id,
        object.time.as_ref(),
        config.time_width_for(asdu.type_id),
        &mut payload,
    )?;
    Ok(payload)
}

/// Decode one frame.
///
/// Segment frames are returned undecoded for the reassembler.
pub fn decode<'a, P: Profile>(
    frame: &'a [u8],
    config: &CodecConfig,
) -> Result<Decoded<'a, P>, DecodeError> {
    let mut src = frame;
    let header = Header::<P::TypeId>::decode(&mut src, config)?;
    let (count, sequence) = match header.qualifier {
        Qualifier::Segment(flags) => {
            return Ok(Decoded::Segment {
                header,
                flags,
                chunk: src,
            })
        }
        Qualifier::Objects { count, sequence } => (count as usize, sequence),
    };

    let type_id = header.type_id;
    let layout = type_id.layout();
    let width = config.time_width_for(type_id);
    let mut objects = Vec::with_capacity(if sequence { 1 } else { count });

    let (object_count, element_count) = match (sequence, count) {
        (_, 0) => (0, 0),
        (true, _) => (1, count),
        (false, _) => (count, 1),
    };
    for _ in 0..object_count {
        let address = if layout.io_address {
            Some(IoAddress::decode(&mut src, config.io_address_size)?)
        } else {
            None
        };
        let mut elements = Vec::with_capacity(element_count);
        for _ in 0..element_count {
            elements.push(P::decode_element(&mut src, type_id)?);
        }
        let time = match width {
            Some(width) => Some(Timestamp::decode(&mut src, width)?),
            None => None,
        };
        objects.push(InformationObject {
            address,
            elements,
            time,
        });
    }

    if !src.is_empty() {
        return Err(DecodeError::TrailingData(src.len()));
    }
    Ok(Decoded::Asdu(Asdu::new(
        type_id,
        header.cause,
        header.address,
        objects,
    )))
}

/// Decode a reassembled segment payload.
pub fn decode_segment_payload<P: Profile>(
    header: &Header<P::TypeId>,
    payload: &[u8],
    config: &CodecConfig,
) -> Result<Asdu<P>, DecodeError> {
    let mut src = payload;
    let element = P::decode_element(&mut src, header.type_id)?;
    let time = match config.time_width_for(header.type_id) {
        Some(width) => Some(Timestamp::decode(&mut src, width)?),
        None => None,
    };
    if !src.is_empty() {
        return Err(DecodeError::TrailingData(src.len()));
    }
    let object = InformationObject {
        address: None,
        elements: vec![element],
        time,
    };
    Ok(Asdu::new(
        header.type_id,
        header.cause,
        header.address,
        vec![object],
    ))
}

fn objects_qualifier<P: Profile>(asdu: &Asdu<P>) -> Result<Qualifier, EncodeError> {
    match asdu.objects.as_slice() {
        [object] if object.elements.len() > 1 => {
            if object.time.is_some() || asdu.type_id.layout().time.is_some() {
                return Err(EncodeError::unsupported_shape(format!(
                    "{} cannot be sent as a time-tagged sequence",
                    asdu.type_id
                )));
            }
            if object.elements.len() > MAX_OBJECTS {
                return Err(EncodeError::TooManyObjects(object.elements.len()));
            }
            Ok(Qualifier::Objects {
                count: object.elements.len() as u8,
                sequence: true,
            })
        }
        objects => {
            if objects.len() > MAX_OBJECTS {
                return Err(EncodeError::TooManyObjects(objects.len()));
            }
            if let Some(object) = objects.iter().find(|object| object.elements.len() != 1) {
                return Err(EncodeError::unsupported_shape(format!(
                    "object with {} elements among {} objects",
                    object.elements.len(),
                    objects.len()
                )));
            }
            Ok(Qualifier::Objects {
                count: objects.len() as u8,
                sequence: false,
            })
        }
    }
}

fn encode_time<T: AsduType>(
    type_id: T,
    time: Option<&Timestamp>,
    width: Option<TimeWidth>,
    dst: &mut BytesMut,
) -> Result<(), EncodeError> {
    match (time, width) {
        (Some(time), Some(width)) if time.precision > width => {
            Err(EncodeError::unsupported_shape(format!(
                "{type_id} carries a {width} time tag, {} timestamp must be truncated first",
                time.precision
            )))
        }
        (Some(time), Some(width)) => time.encode(width, dst),
        (None, None) => Ok(()),
        (None, Some(width)) => Err(EncodeError::unsupported_shape(format!(
            "{type_id} requires a {width} time tag"
        ))),
        (Some(_), None) => Err(EncodeError::unsupported_shape(format!(
            "{type_id} carries no time tag"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CauseSize, IoAddressSize};
    use crate::iec101::{Element, Iec101, TypeId};
    use crate::types::{CauseType, Quality};

    fn scenario_config() -> CodecConfig {
        CodecConfig::iec101()
            .with_cause_size(CauseSize::One)
            .with_address_size(CommonAddressSize::Two)
            .with_io_address_size(IoAddressSize::Two)
    }

    fn single(value: bool) -> Element {
        Element::SinglePoint {
            value,
            quality: Quality::GOOD,
        }
    }

    fn encode(asdu: &Asdu<Iec101>, config: &CodecConfig) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_asdu(asdu, config, &mut buf).unwrap();
        buf
    }

    fn decode_asdu(frame: &[u8], config: &CodecConfig) -> Asdu<Iec101> {
        match decode::<Iec101>(frame, config).unwrap() {
            Decoded::Asdu(asdu) => asdu,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_single_point_scenario() {
        let config = scenario_config();
        let asdu = Asdu::<Iec101>::new(
            TypeId::SinglePoint,
            Cause::new(CauseType::Spontaneous),
            1000,
            vec![InformationObject::new(5u32, single(true))],
        );

        let buf = encode(&asdu, &config);
        assert_eq!(&buf[..], &[0x01, 0x01, 0x03, 0xE8, 0x03, 0x05, 0x00, 0x01]);
        assert_eq!(decode_asdu(&buf, &config), asdu);
    }

    #[test]
    fn test_sequence_qualifier() {
        let config = scenario_config();
        let asdu = Asdu::<Iec101>::new(
            TypeId::SinglePoint,
            Cause::new(CauseType::InterrogatedByStation),
            1,
            vec![InformationObject::sequence(
                10u32,
                vec![single(true), single(false), single(true)],
            )],
        );
        let buf = encode(&asdu, &config);
        assert_eq!(buf[1], 0x83);
        assert_eq!(&buf[5..], &[0x0A, 0x00, 0x01, 0x00, 0x01]);
        assert_eq!(decode_asdu(&buf, &config), asdu);

        // Inverted polarity flips bit 7 both ways
        let inverted = scenario_config().with_inverted_sequence_bit(true);
        let buf = encode(&asdu, &inverted);
        assert_eq!(buf[1], 0x03);
        assert_eq!(decode_asdu(&buf, &inverted), asdu);
    }

    #[test]
    fn test_multiple_objects() {
        let config = CodecConfig::iec104();
        let asdu = Asdu::<Iec101>::new(
            TypeId::SinglePoint,
            Cause::new(CauseType::Spontaneous).with_originator(3),
            1,
            vec![
                InformationObject::new(1u32, single(true)),
                InformationObject::new(70_000u32, single(false)),
            ],
        );
        let buf = encode(&asdu, &config);
        assert_eq!(buf[1], 0x02);
        assert_eq!(buf.len(), 6 + 2 * 4);
        assert_eq!(decode_asdu(&buf, &config), asdu);
    }

    #[test]
    fn test_time_tag_at_configured_width() {
        let config = CodecConfig::iec101().with_time_width(TypeId::SinglePointTime24.as_u8(), TimeWidth::Cp56);
        let time = Timestamp::cp56(1_500, 10, 8, 2, 3, 24);
        let asdu = Asdu::<Iec101>::new(
            TypeId::SinglePointTime24,
            Cause::new(CauseType::Spontaneous),
            1,
            vec![InformationObject::new(7u32, single(true)).with_time(time)],
        );
        let buf = encode(&asdu, &config);
        assert_eq!(buf.len(), 4 + 2 + 1 + 7);
        assert_eq!(decode_asdu(&buf, &config), asdu);

        // The default CP24 width refuses to drop fields silently
        let config = CodecConfig::iec101();
        let mut buf = BytesMut::from(&[0xAA][..]);
        assert!(matches!(
            encode_asdu(&asdu, &config, &mut buf),
            Err(EncodeError::UnsupportedShape(_))
        ));
        assert_eq!(&buf[..], &[0xAA]);

        let mut short = asdu.clone();
        short.objects[0].time = Some(time.truncate(TimeWidth::Cp24));
        let buf = encode(&short, &config);
        assert_eq!(buf.len(), 4 + 2 + 1 + 3);
        let decoded = decode_asdu(&buf, &config);
        assert_eq!(decoded, short);
        assert_eq!(decoded.objects[0].time.and_then(|t| t.hours), None);
    }

    #[test]
    fn test_inferred_cp32_type_needs_cp32_width() {
        let time = Timestamp::cp32(1_000, 15, 5).with_summer_time(true);
        let asdu = Asdu::<Iec101>::with_inferred_type(
            Cause::new(CauseType::Spontaneous),
            1,
            vec![InformationObject::new(7u32, single(true)).with_time(time)],
        )
        .unwrap();
        assert_eq!(asdu.type_id, TypeId::SinglePointTime24);

        let mut buf = BytesMut::new();
        assert!(matches!(
            encode_asdu(&asdu, &CodecConfig::iec101(), &mut buf),
            Err(EncodeError::UnsupportedShape(_))
        ));
        assert!(buf.is_empty());

        let config = CodecConfig::iec101().with_time_width(TypeId::SinglePointTime24.as_u8(), TimeWidth::Cp32);
        let decoded = decode_asdu(&encode(&asdu, &config), &config);
        assert_eq!(decoded.objects[0].time.and_then(|t| t.hours), Some(5));
        assert_eq!(decoded, asdu);
    }

    #[test]
    fn test_shape_errors() {
        let config = scenario_config();
        let cause = Cause::new(CauseType::Spontaneous);
        let mut buf = BytesMut::new();

        let missing_time = Asdu::<Iec101>::new(
            TypeId::SinglePointTime24,
            cause,
            1,
            vec![InformationObject::new(1u32, single(true))],
        );
        assert!(matches!(
            encode_asdu(&missing_time, &config, &mut buf),
            Err(EncodeError::UnsupportedShape(_))
        ));

        let unexpected_time = Asdu::<Iec101>::new(
            TypeId::SinglePoint,
            cause,
            1,
            vec![InformationObject::new(1u32, single(true)).with_time(Timestamp::cp24(0, 0))],
        );
        assert!(matches!(
            encode_asdu(&unexpected_time, &config, &mut buf),
            Err(EncodeError::UnsupportedShape(_))
        ));

        let missing_address = Asdu::<Iec101>::new(
            TypeId::SinglePoint,
            cause,
            1,
            vec![InformationObject::unaddressed(single(true))],
        );
        assert!(matches!(
            encode_asdu(&missing_address, &config, &mut buf),
            Err(EncodeError::UnsupportedShape(_))
        ));

        let wrong_element = Asdu::<Iec101>::new(
            TypeId::MeasuredFloat,
            cause,
            1,
            vec![InformationObject::new(1u32, single(true))],
        );
        assert!(matches!(
            encode_asdu(&wrong_element, &config, &mut buf),
            Err(EncodeError::UnsupportedShape(_))
        ));
        // Failed encodes leave no partial frame behind
        assert!(buf.is_empty());
    }

    #[test]
    fn test_roundtrip_all_field_widths() {
        let cause = Cause::new(CauseType::Spontaneous)
            .negative()
            .test()
            .with_originator(9);
        for cause_size in [CauseSize::One, CauseSize::Two] {
            for address_size in [CommonAddressSize::One, CommonAddressSize::Two] {
                for io_size in [IoAddressSize::One, IoAddressSize::Two, IoAddressSize::Three] {
                    let config = CodecConfig::iec104()
                        .with_cause_size(cause_size)
                        .with_address_size(address_size)
                        .with_io_address_size(io_size);
                    let address = address_size.max();
                    let far = io_size.max();
                    let asdu = Asdu::<Iec101>::new(
                        TypeId::SinglePoint,
                        cause,
                        address,
                        vec![
                            InformationObject::new(far, single(true)),
                            InformationObject::new(1u32, single(false)),
                        ],
                    );

                    let mut expected = vec![0x01, 0x02, 0xC3];
                    if cause_size == CauseSize::Two {
                        expected.push(9);
                    }
                    expected.extend_from_slice(&address.to_le_bytes()[..address_size.len()]);
                    expected.extend_from_slice(&far.to_le_bytes()[..io_size.len()]);
                    expected.push(0x01);
                    expected.extend_from_slice(&1u32.to_le_bytes()[..io_size.len()]);
                    expected.push(0x00);

                    let label = format!("{:?}/{:?}/{:?}", cause_size, address_size, io_size);
                    let buf = encode(&asdu, &config);
                    assert_eq!(&buf[..], &expected[..], "{}", label);

                    // A 1-byte cause field has no room for the originator
                    let originator = match cause_size {
                        CauseSize::One => 0,
                        CauseSize::Two => 9,
                    };
                    let mut sent = asdu.clone();
                    sent.cause = cause.with_originator(originator);
                    assert_eq!(decode_asdu(&buf, &config), sent, "{}", label);
                }
            }
        }
    }

    #[test]
    fn test_count_and_range_errors() {
        let config = scenario_config();
        let cause = Cause::new(CauseType::Spontaneous);
        let mut buf = BytesMut::new();

        let objects = (0..128u32)
            .map(|address| InformationObject::new(address, single(true)))
            .collect();
        let asdu = Asdu::<Iec101>::new(TypeId::SinglePoint, cause, 1, objects);
        assert_eq!(
            encode_asdu(&asdu, &config, &mut buf),
            Err(EncodeError::TooManyObjects(128))
        );

        let asdu = Asdu::<Iec101>::new(
            TypeId::SinglePoint,
            cause,
            1,
            vec![InformationObject::new(0x1_0000u32, single(true))],
        );
        assert!(matches!(
            encode_asdu(&asdu, &config, &mut buf),
            Err(EncodeError::ValueOutOfRange { .. })
        ));

        let small = CodecConfig::iec101();
        let asdu = Asdu::<Iec101>::new(
            TypeId::SinglePoint,
            cause,
            300,
            vec![InformationObject::new(1u32, single(true))],
        );
        assert!(matches!(
            encode_asdu(&asdu, &small, &mut BytesMut::new()),
            Err(EncodeError::ValueOutOfRange { field: "common address", .. })
        ));
    }

    #[test]
    fn test_decode_errors() {
        let config = scenario_config();

        let err = decode::<Iec101>(&[0xFF, 0x01, 0x03, 0x01, 0x00], &config).unwrap_err();
        assert_eq!(err, DecodeError::UnsupportedType(0xFF));

        let err = decode::<Iec101>(&[0x01, 0x01, 0x03], &config).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { field: "ASDU header", .. }));

        let err = decode::<Iec101>(&[0x01, 0x02, 0x03, 0x01, 0x00, 0x05, 0x00, 0x01], &config)
            .unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));

        let err = decode::<Iec101>(
            &[0x01, 0x01, 0x03, 0x01, 0x00, 0x05, 0x00, 0x01, 0xAA],
            &config,
        )
        .unwrap_err();
        assert_eq!(err, DecodeError::TrailingData(1));
    }

    #[test]
    fn test_empty_asdu_decodes() {
        let config = scenario_config();
        let asdu = decode_asdu(&[0x64, 0x00, 0x06, 0x01, 0x00], &config);
        assert!(asdu.objects.is_empty());
        assert_eq!(asdu.type_id, TypeId::InterrogationCommand);
    }

    #[test]
    fn test_header_roundtrip() {
        let config = CodecConfig::iec104();
        let header = Header {
            type_id: TypeId::MeasuredFloat,
            qualifier: Qualifier::Objects {
                count: 5,
                sequence: false,
            },
            cause: Cause::new(CauseType::Spontaneous).test(),
            address: 0x1234,
        };
        let mut buf = BytesMut::new();
        header.encode(&config, &mut buf).unwrap();
        assert_eq!(&buf[..], &[13, 5, 0x83, 0, 0x34, 0x12]);
        assert_eq!(Header::<TypeId>::encoded_len(&config), 6);

        let mut src = &buf[..];
        assert_eq!(Header::<TypeId>::decode(&mut src, &config).unwrap(), header);
        assert!(src.is_empty());
    }
}
