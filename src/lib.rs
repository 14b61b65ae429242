//! # voltage_iec60870
//!
//! IEC 60870-5 ASDU codec for Rust.
//!
//! This crate encodes and decodes the Application Service Data Unit shared
//! by the IEC 60870-5-101, -103 and -104 companion standards and the
//! IEC 60870-5-7 security extension, including segmentation and reassembly
//! of ASDUs larger than one frame.
//!
//! ## Features
//!
//! - **Configurable link widths**: cause, common address, object address
//!   and time tag widths are set per link
//! - **Closed type sets**: one `TypeId` and `Element` enum per protocol
//! - **Segmentation**: split on encode, reassemble with duplicate and
//!   mismatch handling on decode
//! - **No I/O**: frames come from and go to a [`Transport`] collaborator
//!
//! ## Quick Start
//!
//! ```rust
//! use voltage_iec60870::iec101::{Element, Iec101, TypeId};
//! use voltage_iec60870::{Asdu, AsduCodec, Cause, CauseType, CodecConfig, InformationObject};
//!
//! let mut codec = AsduCodec::<Iec101>::new(CodecConfig::iec101());
//! let asdu = Asdu::<Iec101>::new(
//!     TypeId::SinglePoint,
//!     Cause::new(CauseType::Spontaneous),
//!     1,
//!     vec![InformationObject::new(5u32, Element::single_point(true))],
//! );
//!
//! let frames = codec.encode(&[asdu.clone()])?;
//! assert_eq!(&frames[0][..], &[0x01, 0x01, 0x03, 0x01, 0x05, 0x00, 0x01]);
//! assert_eq!(codec.decode(&frames[0])?, Some(asdu));
//! # Ok::<(), voltage_iec60870::Error>(())
//! ```
//!
//! ## ASDU Structure
//!
//! ```text
//! +---------+-----------+-------------+---------------+----------------------+
//! | Type ID | Qualifier | COT (1|2)   | Address (1|2) | Information objects  |
//! +---------+-----------+-------------+---------------+----------------------+
//! ```
//!
//! The qualifier holds the object count and SQ bit, or for segmentable
//! types the first/last flags and a 6-bit segment number.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod iec101;
pub mod iec103;
pub mod iec104;
pub mod profile;
pub mod security;
pub mod segment;
pub mod transport;
pub mod types;

// Re-export main types
pub use codec::AsduCodec;
pub use config::CodecConfig;
pub use error::{DecodeError, EncodeError, Error, Result, TransportError};
pub use profile::{AsduType, Profile, TypeLayout};
pub use transport::{Link, Transport};
pub use types::*;
