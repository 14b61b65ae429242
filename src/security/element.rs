//! Secure authentication messages of IEC 60870-5-7.
//!
//! Variable-length fields (challenge data, MAC values, wrapped keys, texts)
//! are preceded by a two-octet little-endian length on the wire.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{DecodeError, EncodeError};
use crate::types::primitive::{read_u16, read_u32, read_u8, take};
use crate::types::{TimeWidth, Timestamp};

/// Session key status (KST).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyStatus {
    /// Session keys are valid
    Ok = 1,
    /// Session keys are not initialized
    NotInit = 2,
    /// Communication failure detected
    CommFail = 3,
    /// Authentication failure
    AuthFail = 4,
}

impl KeyStatus {
    fn from_u8(value: u8) -> Result<Self, DecodeError> {
        match value {
            1 => Ok(Self::Ok),
            2 => Ok(Self::NotInit),
            3 => Ok(Self::CommFail),
            4 => Ok(Self::AuthFail),
            _ => Err(DecodeError::InvalidValue {
                field: "key status",
                value,
            }),
        }
    }
}

/// Security message.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Authentication challenge (CSQ + USR + MAL + RSC + challenge data)
    Challenge {
        sequence: u32,
        user: u16,
        mac_algorithm: u8,
        reason: u8,
        data: Bytes,
    },

    /// Authentication reply (CSQ + USR + MAC value)
    Reply { sequence: u32, user: u16, mac: Bytes },

    /// Aggressive mode request (CSQ + USR + authenticated ASDU + MAC value)
    AggressiveRequest {
        sequence: u32,
        user: u16,
        asdu: Bytes,
        mac: Bytes,
    },

    /// Session key status request (USR)
    KeyStatusRequest { user: u16 },

    /// Session key status (KSQ + USR + KWA + KST + MAL + challenge data + MAC)
    KeyStatus {
        sequence: u32,
        user: u16,
        key_wrap_algorithm: u8,
        status: KeyStatus,
        mac_algorithm: u8,
        data: Bytes,
        mac: Bytes,
    },

    /// Session key change (KSQ + USR + wrapped key data)
    KeyChange {
        sequence: u32,
        user: u16,
        wrapped_key: Bytes,
    },

    /// Authentication error (CSQ + USR + AID + ERR + CP56 time + text)
    Error {
        sequence: u32,
        user: u16,
        association: u16,
        code: u8,
        time: Timestamp,
        text: Bytes,
    },

    /// User status change (KCM + OPR + SCS + URL + UEP + name + key + certificate)
    UserStatusChange {
        method: u8,
        operation: u8,
        sequence: u32,
        role: u16,
        expiry_days: u16,
        name: Bytes,
        public_key: Bytes,
        certificate: Bytes,
    },
}

fn read_block(src: &mut &[u8], field: &'static str) -> Result<Bytes, DecodeError> {
    let len = read_u16(src, field)? as usize;
    Ok(Bytes::copy_from_slice(take(src, len, field)?))
}

fn put_block(block: &[u8], field: &'static str, dst: &mut BytesMut) -> Result<(), EncodeError> {
    let len = u16::try_from(block.len()).map_err(|_| EncodeError::out_of_range(field, block.len()))?;
    dst.put_u16_le(len);
    dst.put_slice(block);
    Ok(())
}

/// Decode one message for `type_id`.
pub(crate) fn decode(src: &mut &[u8], type_id: super::TypeId) -> Result<Element, DecodeError> {
    use super::TypeId;

    Ok(match type_id {
        TypeId::Challenge => Element::Challenge {
            sequence: read_u32(src, "challenge sequence number")?,
            user: read_u16(src, "user number")?,
            mac_algorithm: read_u8(src, "MAC algorithm")?,
            reason: read_u8(src, "reason for challenge")?,
            data: read_block(src, "challenge data")?,
        },
        TypeId::Reply => Element::Reply {
            sequence: read_u32(src, "challenge sequence number")?,
            user: read_u16(src, "user number")?,
            mac: read_block(src, "MAC value")?,
        },
        TypeId::AggressiveRequest => Element::AggressiveRequest {
            sequence: read_u32(src, "challenge sequence number")?,
            user: read_u16(src, "user number")?,
            asdu: read_block(src, "authenticated ASDU")?,
            mac: read_block(src, "MAC value")?,
        },
        TypeId::KeyStatusRequest => Element::KeyStatusRequest {
            user: read_u16(src, "user number")?,
        },
        TypeId::KeyStatus => Element::KeyStatus {
            sequence: read_u32(src, "key change sequence number")?,
            user: read_u16(src, "user number")?,
            key_wrap_algorithm: read_u8(src, "key wrap algorithm")?,
            status: KeyStatus::from_u8(read_u8(src, "key status")?)?,
            mac_algorithm: read_u8(src, "MAC algorithm")?,
            data: read_block(src, "challenge data")?,
            mac: read_block(src, "MAC value")?,
        },
        TypeId::KeyChange => Element::KeyChange {
            sequence: read_u32(src, "key change sequence number")?,
            user: read_u16(src, "user number")?,
            wrapped_key: read_block(src, "wrapped key data")?,
        },
        TypeId::Error => Element::Error {
            sequence: read_u32(src, "challenge sequence number")?,
            user: read_u16(src, "user number")?,
            association: read_u16(src, "association id")?,
            code: read_u8(src, "error code")?,
            time: Timestamp::decode(src, TimeWidth::Cp56)?,
            text: read_block(src, "error text")?,
        },
        TypeId::UserStatusChange => Element::UserStatusChange {
            method: read_u8(src, "key change method")?,
            operation: read_u8(src, "operation")?,
            sequence: read_u32(src, "status change sequence number")?,
            role: read_u16(src, "user role")?,
            expiry_days: read_u16(src, "user role expiry")?,
            name: read_block(src, "user name")?,
            public_key: read_block(src, "user public key")?,
            certificate: read_block(src, "certification data")?,
        },
    })
}

/// Encode `element`. The caller has checked that it matches the type.
pub(crate) fn encode(element: &Element, dst: &mut BytesMut) -> Result<(), EncodeError> {
    let mut buf = BytesMut::new();
    match element {
        Element::Challenge {
            sequence,
            user,
            mac_algorithm,
            reason,
            data,
        } => {
            buf.put_u32_le(*sequence);
            buf.put_u16_le(*user);
            buf.put_u8(*mac_algorithm);
            buf.put_u8(*reason);
            put_block(data, "challenge data", &mut buf)?;
        }
        Element::Reply { sequence, user, mac } => {
            buf.put_u32_le(*sequence);
            buf.put_u16_le(*user);
            put_block(mac, "MAC value", &mut buf)?;
        }
        Element::AggressiveRequest {
            sequence,
            user,
            asdu,
            mac,
        } => {
            buf.put_u32_le(*sequence);
            buf.put_u16_le(*user);
            put_block(asdu, "authenticated ASDU", &mut buf)?;
            put_block(mac, "MAC value", &mut buf)?;
        }
        Element::KeyStatusRequest { user } => buf.put_u16_le(*user),
        Element::KeyStatus {
            sequence,
            user,
            key_wrap_algorithm,
            status,
            mac_algorithm,
            data,
            mac,
        } => {
            buf.put_u32_le(*sequence);
            buf.put_u16_le(*user);
            buf.put_u8(*key_wrap_algorithm);
            buf.put_u8(*status as u8);
            buf.put_u8(*mac_algorithm);
            put_block(data, "challenge data", &mut buf)?;
            put_block(mac, "MAC value", &mut buf)?;
        }
        Element::KeyChange {
            sequence,
            user,
            wrapped_key,
        } => {
            buf.put_u32_le(*sequence);
            buf.put_u16_le(*user);
            put_block(wrapped_key, "wrapped key data", &mut buf)?;
        }
        Element::Error {
            sequence,
            user,
            association,
            code,
            time,
            text,
        } => {
            buf.put_u32_le(*sequence);
            buf.put_u16_le(*user);
            buf.put_u16_le(*association);
            buf.put_u8(*code);
            time.encode(TimeWidth::Cp56, &mut buf)?;
            put_block(text, "error text", &mut buf)?;
        }
        Element::UserStatusChange {
            method,
            operation,
            sequence,
            role,
            expiry_days,
            name,
            public_key,
            certificate,
        } => {
            buf.put_u8(*method);
            buf.put_u8(*operation);
            buf.put_u32_le(*sequence);
            buf.put_u16_le(*role);
            buf.put_u16_le(*expiry_days);
            put_block(name, "user name", &mut buf)?;
            put_block(public_key, "user public key", &mut buf)?;
            put_block(certificate, "certification data", &mut buf)?;
        }
    }
    dst.put_slice(&buf);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::TypeId;
    use super::*;

    fn roundtrip(element: &Element, type_id: TypeId) -> BytesMut {
        let mut buf = BytesMut::new();
        encode(element, &mut buf).unwrap();
        let mut src = &buf[..];
        assert_eq!(&decode(&mut src, type_id).unwrap(), element);
        assert!(src.is_empty());
        buf
    }

    #[test]
    fn test_challenge_layout() {
        let element = Element::Challenge {
            sequence: 1,
            user: 2,
            mac_algorithm: 4,
            reason: 1,
            data: Bytes::from_static(&[0xAA, 0xBB, 0xCC]),
        };
        let buf = roundtrip(&element, TypeId::Challenge);
        assert_eq!(
            &buf[..],
            &[0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x04, 0x01, 0x03, 0x00, 0xAA, 0xBB, 0xCC]
        );
    }

    #[test]
    fn test_messages_roundtrip() {
        roundtrip(
            &Element::AggressiveRequest {
                sequence: 9,
                user: 1,
                asdu: Bytes::from_static(&[45, 1, 6, 0, 1, 0, 1, 0, 0, 1]),
                mac: Bytes::from(vec![0x5A; 16]),
            },
            TypeId::AggressiveRequest,
        );
        roundtrip(&Element::KeyStatusRequest { user: 7 }, TypeId::KeyStatusRequest);
        roundtrip(
            &Element::KeyStatus {
                sequence: 3,
                user: 1,
                key_wrap_algorithm: 1,
                status: KeyStatus::NotInit,
                mac_algorithm: 0,
                data: Bytes::from(vec![1; 300]),
                mac: Bytes::new(),
            },
            TypeId::KeyStatus,
        );
        roundtrip(
            &Element::Error {
                sequence: 3,
                user: 1,
                association: 0,
                code: 1,
                time: Timestamp::cp56(0, 10, 10, 14, 10, 26),
                text: Bytes::from_static(b"bad MAC"),
            },
            TypeId::Error,
        );
        roundtrip(
            &Element::UserStatusChange {
                method: 3,
                operation: 1,
                sequence: 42,
                role: 0,
                expiry_days: 30,
                name: Bytes::from_static(b"operator"),
                public_key: Bytes::new(),
                certificate: Bytes::from_static(&[0x30, 0x82]),
            },
            TypeId::UserStatusChange,
        );
    }

    #[test]
    fn test_invalid_key_status() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(1);
        buf.put_u16_le(1);
        buf.put_slice(&[1, 9, 0, 0, 0, 0, 0]);
        let err = decode(&mut &buf[..], TypeId::KeyStatus).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidValue {
                field: "key status",
                value: 9
            }
        );
    }

    #[test]
    fn test_block_length_checks() {
        // Declared length beyond the available bytes
        let err = decode(&mut &[0, 0, 0, 0, 1, 0, 5, 0, 1, 2][..], TypeId::Reply).unwrap_err();
        assert_eq!(err, DecodeError::truncated("MAC value", 5, 2));

        let mut buf = BytesMut::new();
        let err = encode(
            &Element::KeyChange {
                sequence: 0,
                user: 1,
                wrapped_key: Bytes::from(vec![0; 70_000]),
            },
            &mut buf,
        )
        .unwrap_err();
        assert!(matches!(err, EncodeError::ValueOutOfRange { .. }));
        assert!(buf.is_empty());
    }
}
