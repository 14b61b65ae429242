//! Transport collaborator seam.
//!
//! The codec never touches I/O. A [`Transport`] takes complete frames for
//! sending; received frames are handed to [`Link::receive`] already
//! delimited by the lower layer (APCI, FT1.2, ...).

use std::fmt;

use bytes::Bytes;
use tracing::debug;

use crate::codec::AsduCodec;
use crate::error::{Result, TransportError};
use crate::profile::Profile;
use crate::types::Asdu;

/// Lower layer that frames and sends ASDUs.
pub trait Transport: fmt::Debug {
    /// Send one complete ASDU frame.
    fn send(&mut self, frame: Bytes) -> std::result::Result<(), TransportError>;
}

/// Collects frames in memory.
impl Transport for Vec<Bytes> {
    fn send(&mut self, frame: Bytes) -> std::result::Result<(), TransportError> {
        self.push(frame);
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, frame: Bytes) -> std::result::Result<(), TransportError> {
        (**self).send(frame)
    }
}

/// One link: a codec paired with the transport it sends through.
#[derive(Debug)]
pub struct Link<P: Profile, T: Transport> {
    codec: AsduCodec<P>,
    transport: T,
}

impl<P: Profile, T: Transport> Link<P, T> {
    /// Create a link.
    pub fn new(codec: AsduCodec<P>, transport: T) -> Self {
        Self { codec, transport }
    }

    /// Encode and send ASDUs. Returns the number of frames sent.
    ///
    /// All ASDUs are encoded before the first frame goes out, so an encode
    /// error sends nothing.
    pub fn send(&mut self, asdus: &[Asdu<P>]) -> Result<usize> {
        let frames = self.codec.encode(asdus)?;
        let count = frames.len();
        for frame in frames {
            self.transport.send(frame)?;
        }
        debug!(profile = P::NAME, asdus = asdus.len(), frames = count, "Sent ASDUs");
        Ok(count)
    }

    /// Decode one received frame.
    pub fn receive(&mut self, frame: &[u8]) -> Result<Option<Asdu<P>>> {
        Ok(self.codec.decode(frame)?)
    }

    /// Get the codec.
    pub fn codec(&self) -> &AsduCodec<P> {
        &self.codec
    }

    /// Get the codec mutably, e.g. to reset reassembly after a reconnect.
    pub fn codec_mut(&mut self) -> &mut AsduCodec<P> {
        &mut self.codec
    }

    /// Get the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the transport mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Split into codec and transport.
    pub fn into_parts(self) -> (AsduCodec<P>, T) {
        (self.codec, self.transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::error::{DecodeError, Error};
    use crate::iec104::{Element, Iec104, TypeId};
    use crate::security::{self, Security};
    use crate::types::{Cause, CauseType, InformationObject};

    #[derive(Debug, Default)]
    struct ClosedTransport;

    impl Transport for ClosedTransport {
        fn send(&mut self, _frame: Bytes) -> std::result::Result<(), TransportError> {
            Err(TransportError::Closed)
        }
    }

    fn measurement(value: f32) -> Asdu<Iec104> {
        Asdu::new(
            TypeId::MeasuredFloat,
            Cause::new(CauseType::Spontaneous),
            1,
            vec![InformationObject::new(100u32, Element::float(value))],
        )
    }

    #[test]
    fn test_link_send_and_receive() {
        let mut link = Link::new(AsduCodec::<Iec104>::new(CodecConfig::iec104()), Vec::<Bytes>::new());
        let sent = link.send(&[measurement(1.0), measurement(2.0)]).unwrap();
        assert_eq!(sent, 2);

        let (codec, frames) = link.into_parts();
        let mut peer = Link::new(codec, Vec::<Bytes>::new());
        assert_eq!(peer.receive(&frames[1]).unwrap(), Some(measurement(2.0)));
        assert!(peer.transport().is_empty());
    }

    #[test]
    fn test_link_sends_all_segments() {
        let mut link = Link::new(
            AsduCodec::<Security>::new(CodecConfig::iec104().with_max_segment_size(16)),
            Vec::<Bytes>::new(),
        );
        let asdu = Asdu::<Security>::new(
            security::TypeId::Reply,
            Cause::new(CauseType::Authentication),
            1,
            vec![InformationObject::unaddressed(security::Element::Reply {
                sequence: 5,
                user: 1,
                mac: Bytes::from(vec![0x11; 32]),
            })],
        );
        assert_eq!(link.send(&[asdu.clone()]).unwrap(), 3);

        let frames = std::mem::take(link.transport_mut());
        let mut received = Vec::new();
        for frame in &frames {
            if let Some(asdu) = link.receive(frame).unwrap() {
                received.push(asdu);
            }
        }
        assert_eq!(received, vec![asdu]);
    }

    #[test]
    fn test_link_errors() {
        let mut link = Link::new(AsduCodec::<Iec104>::new(CodecConfig::iec104()), ClosedTransport);
        let err = link.send(&[measurement(0.5)]).unwrap_err();
        assert!(err.is_transport_error());

        let mut bad = measurement(0.5);
        bad.type_id = TypeId::MeasuredScaled;
        let err = link.send(&[bad]).unwrap_err();
        assert!(err.is_caller_bug());

        let err = link.receive(&[0x01]).unwrap_err();
        assert!(matches!(err, Error::Decode(DecodeError::Truncated { .. })));
    }
}
