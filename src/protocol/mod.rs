//! WSJT-X UDP message protocol
//!
//! Every datagram starts with a 12-byte envelope (magic, schema, message type)
//! followed by the fields of one message, all big-endian. Strings are a 32-bit
//! length followed by UTF-8 bytes, with `0xffffffff` standing for the empty string.
//!
//! Decoding goes through [`parse`], encoding through [`Message::encode`] or the
//! [`Encode`] trait implemented by each outbound record.

pub mod codec;
pub mod decode;
pub mod encode;
pub mod message;
pub mod reader;
pub mod time;
pub mod writer;

pub use self::codec::WsjtxCodec;
pub use self::decode::{parse, parse_at};
pub use self::encode::Encode;
pub use self::message::{
    Clear, Close, Configure, Decode, FreeText, HaltTx, Heartbeat, HighlightCallsign, Location,
    LoggedAdif, Message, QsoLogged, Replay, Reply, Response, Status, SwitchConfiguration,
    WsprDecode,
};
pub use self::reader::Reader;
pub use self::writer::Writer;

use crate::core::Error;

/// Magic number opening every datagram
pub const MAGIC: u32 = 0xadbc_cbda;

/// Schema number written by the encoder
pub const SCHEMA_NUMBER: u32 = 2;

/// Envelope length: magic, schema and message type
pub const HEADER_LEN: usize = 12;

/// String length meaning "null/empty string"
pub const NULL_STRING: u32 = 0xffff_ffff;

/// Message type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageType {
    Heartbeat = 0,
    Status = 1,
    Decode = 2,
    Clear = 3,
    Reply = 4,
    QsoLogged = 5,
    Close = 6,
    Replay = 7,
    HaltTx = 8,
    FreeText = 9,
    WsprDecode = 10,
    Location = 11,
    LoggedAdif = 12,
    HighlightCallsign = 13,
    SwitchConfiguration = 14,
    Configure = 15,
}

impl From<MessageType> for u32 {
    fn from(message_type: MessageType) -> u32 {
        message_type as u32
    }
}

impl TryFrom<u32> for MessageType {
    type Error = Error;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        let message_type = match tag {
            0 => MessageType::Heartbeat,
            1 => MessageType::Status,
            2 => MessageType::Decode,
            3 => MessageType::Clear,
            4 => MessageType::Reply,
            5 => MessageType::QsoLogged,
            6 => MessageType::Close,
            7 => MessageType::Replay,
            8 => MessageType::HaltTx,
            9 => MessageType::FreeText,
            10 => MessageType::WsprDecode,
            11 => MessageType::Location,
            12 => MessageType::LoggedAdif,
            13 => MessageType::HighlightCallsign,
            14 => MessageType::SwitchConfiguration,
            15 => MessageType::Configure,
            other => return Err(Error::UnknownMessageType(other)),
        };
        Ok(message_type)
    }
}
