//! Link-level ASDU codec.
//!
//! [`AsduCodec`] owns the link configuration and the reassembly buffer of
//! one link direction. Frames handed to it are complete ASDUs, already
//! delimited by the transport layer.
//!
//! # Example
//!
//! ```rust
//! use voltage_iec60870::codec::AsduCodec;
//! use voltage_iec60870::config::CodecConfig;
//! use voltage_iec60870::iec104::{Element, Iec104};
//! use voltage_iec60870::types::{Asdu, Cause, CauseType, InformationObject};
//!
//! let mut codec = AsduCodec::<Iec104>::new(CodecConfig::iec104());
//! let asdu = Asdu::<Iec104>::with_inferred_type(
//!     Cause::new(CauseType::Spontaneous),
//!     1,
//!     vec![InformationObject::new(100u32, Element::float(23.5))],
//! )?;
//!
//! let frames = codec.encode(&[asdu.clone()])?;
//! assert_eq!(codec.decode(&frames[0])?, Some(asdu));
//! # Ok::<(), voltage_iec60870::Error>(())
//! ```

use std::marker::PhantomData;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{trace, warn};

use crate::config::CodecConfig;
use crate::envelope::{self, Decoded, Header, Qualifier};
use crate::error::{DecodeError, EncodeError};
use crate::profile::{AsduType, Profile};
use crate::segment::{self, Progress, Reassembler, SegmentKey};
use crate::types::Asdu;

/// ASDU codec for one link direction.
#[derive(Debug, Clone)]
pub struct AsduCodec<P: Profile> {
    config: CodecConfig,
    reassembler: Reassembler,
    _profile: PhantomData<P>,
}

impl<P: Profile> AsduCodec<P> {
    /// Create a codec with an idle reassembly buffer.
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            reassembler: Reassembler::new(),
            _profile: PhantomData,
        }
    }

    /// Get the link configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode ASDUs into frames, in order.
    ///
    /// Segmentable types may produce several frames per ASDU.
    pub fn encode(&self, asdus: &[Asdu<P>]) -> Result<Vec<Bytes>, EncodeError> {
        let mut frames = Vec::with_capacity(asdus.len());
        for asdu in asdus {
            self.encode_asdu(asdu, &mut frames)?;
        }
        Ok(frames)
    }

    /// Encode one ASDU, appending its frames to `frames`.
    ///
    /// Nothing is appended if encoding fails.
    pub fn encode_asdu(&self, asdu: &Asdu<P>, frames: &mut Vec<Bytes>) -> Result<(), EncodeError> {
        if !asdu.type_id.layout().segmentable {
            let mut buf = BytesMut::new();
            envelope::encode_asdu(asdu, &self.config, &mut buf)?;
            trace!(
                profile = P::NAME,
                type_id = %asdu.type_id,
                cause = %asdu.cause,
                address = asdu.address,
                elements = asdu.element_count(),
                len = buf.len(),
                "Encoded ASDU"
            );
            frames.push(buf.freeze());
            return Ok(());
        }

        let payload = envelope::encode_segment_payload(asdu, &self.config)?;
        let header_len = Header::<P::TypeId>::encoded_len(&self.config);
        let mut segments = Vec::new();
        for (flags, chunk) in segment::split(&payload, self.config.max_segment_size)? {
            let header = Header {
                type_id: asdu.type_id,
                qualifier: Qualifier::Segment(flags),
                cause: asdu.cause,
                address: asdu.address,
            };
            let mut buf = BytesMut::with_capacity(header_len + chunk.len());
            header.encode(&self.config, &mut buf)?;
            buf.put_slice(chunk);
            segments.push(buf.freeze());
        }
        trace!(
            profile = P::NAME,
            type_id = %asdu.type_id,
            payload = payload.len(),
            segments = segments.len(),
            "Encoded segmented ASDU"
        );
        frames.extend(segments);
        Ok(())
    }

    /// Decode one frame.
    ///
    /// Returns `Ok(None)` when the frame yields no ASDU: a segment that does
    /// not complete a transfer, a dropped segment, or an ASDU without
    /// information objects.
    pub fn decode(&mut self, frame: &[u8]) -> Result<Option<Asdu<P>>, DecodeError> {
        let (header, flags, chunk) = match envelope::decode::<P>(frame, &self.config)? {
            Decoded::Asdu(asdu) => {
                if asdu.objects.is_empty() {
                    trace!(profile = P::NAME, type_id = %asdu.type_id, "ASDU without objects");
                    return Ok(None);
                }
                trace!(
                    profile = P::NAME,
                    type_id = %asdu.type_id,
                    cause = %asdu.cause,
                    address = asdu.address,
                    objects = asdu.objects.len(),
                    "Decoded ASDU"
                );
                return Ok(Some(asdu));
            }
            Decoded::Segment { header, flags, chunk } => (header, flags, chunk),
        };

        let key = SegmentKey {
            type_id: header.type_id.as_u8(),
            cause: header.cause,
            address: header.address,
        };
        let payload = match self.reassembler.accept(key, flags, chunk, frame) {
            Progress::Complete(payload) => payload,
            Progress::Pending | Progress::Duplicate | Progress::Discarded(_) => return Ok(None),
        };

        match envelope::decode_segment_payload::<P>(&header, &payload, &self.config) {
            Ok(asdu) => {
                trace!(
                    profile = P::NAME,
                    type_id = %asdu.type_id,
                    payload = payload.len(),
                    "Reassembled ASDU"
                );
                Ok(Some(asdu))
            }
            Err(e) => {
                warn!(
                    profile = P::NAME,
                    type_id = %header.type_id,
                    payload = payload.len(),
                    "Reassembled payload dropped: {}",
                    e
                );
                Ok(None)
            }
        }
    }

    /// Decode a batch of frames.
    ///
    /// A frame that fails to decode yields its error and does not stop the
    /// frames after it.
    pub fn decode_all<'a, I>(
        &'a mut self,
        frames: I,
    ) -> impl Iterator<Item = Result<Asdu<P>, DecodeError>> + 'a
    where
        I: IntoIterator,
        I::IntoIter: 'a,
        I::Item: AsRef<[u8]>,
    {
        frames
            .into_iter()
            .filter_map(move |frame| self.decode(frame.as_ref()).transpose())
    }

    /// Drop any partially reassembled transfer.
    pub fn reset(&mut self) {
        self.reassembler.reset();
    }

    /// Check if a segmented transfer is open.
    pub fn is_reassembling(&self) -> bool {
        !self.reassembler.is_idle()
    }
}
