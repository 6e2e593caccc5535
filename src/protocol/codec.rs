use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::core::Error;
use super::decode::parse;
use super::message::{Message, Response};

/// Datagram codec for use with `tokio_util::udp::UdpFramed`
///
/// Each call to `decode` treats the whole buffer as one datagram and consumes it,
/// also when decoding fails, so a bad datagram never blocks the next one.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsjtxCodec;

impl WsjtxCodec {
    /// Creates a new message codec
    pub fn new() -> Self {
        WsjtxCodec
    }
}

impl Decoder for WsjtxCodec {
    type Item = Response;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let datagram = src.split();
        parse(&datagram).map(Some)
    }
}

impl Encoder<Message> for WsjtxCodec {
    type Error = Error;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item.encode());
        Ok(())
    }
}
