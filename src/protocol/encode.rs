use bytes::Bytes;

use super::message::*;
use super::writer::Writer;
use super::{MessageType, SCHEMA_NUMBER};

/// Outbound message serialization
///
/// Values are written as given, nothing is validated, so encoding cannot fail.
pub trait Encode {
    /// Wire tag written into the envelope
    const MESSAGE_TYPE: MessageType;

    /// Writes the fields following the envelope
    fn write_fields(&self, w: &mut Writer);

    /// Encodes a complete datagram
    fn encode(&self) -> Bytes {
        let mut w = Writer::with_envelope(SCHEMA_NUMBER, Self::MESSAGE_TYPE);
        self.write_fields(&mut w);
        w.finish()
    }
}

impl Message {
    /// Encodes a complete datagram
    pub fn encode(&self) -> Bytes {
        match self {
            Message::Heartbeat(m) => m.encode(),
            Message::Clear(m) => m.encode(),
            Message::Reply(m) => m.encode(),
            Message::Close(m) => m.encode(),
            Message::Replay(m) => m.encode(),
            Message::HaltTx(m) => m.encode(),
            Message::FreeText(m) => m.encode(),
            Message::Location(m) => m.encode(),
            Message::HighlightCallsign(m) => m.encode(),
            Message::SwitchConfiguration(m) => m.encode(),
            Message::Configure(m) => m.encode(),
        }
    }
}

impl Encode for Heartbeat {
    const MESSAGE_TYPE: MessageType = MessageType::Heartbeat;

    fn write_fields(&self, w: &mut Writer) {
        w.utf8(&self.id);
        w.u32(self.max_schema_number);
        w.utf8(&self.version);
        w.utf8(&self.revision);
    }
}

impl Encode for Clear {
    const MESSAGE_TYPE: MessageType = MessageType::Clear;

    fn write_fields(&self, w: &mut Writer) {
        w.utf8(&self.id);
        w.u8(self.window);
    }
}

impl Encode for Reply {
    const MESSAGE_TYPE: MessageType = MessageType::Reply;

    fn write_fields(&self, w: &mut Writer) {
        w.utf8(&self.id);
        w.u32(self.time);
        w.i32(self.snr);
        w.f64(self.delta_time);
        w.u32(self.delta_frequency_hz);
        w.utf8(&self.mode);
        w.utf8(&self.message);
        w.boolean(self.low_confidence);
        w.u8(self.modifiers);
    }
}

impl Encode for Close {
    const MESSAGE_TYPE: MessageType = MessageType::Close;

    fn write_fields(&self, w: &mut Writer) {
        w.utf8(&self.id);
    }
}

impl Encode for Replay {
    const MESSAGE_TYPE: MessageType = MessageType::Replay;

    fn write_fields(&self, w: &mut Writer) {
        w.utf8(&self.id);
    }
}

impl Encode for HaltTx {
    const MESSAGE_TYPE: MessageType = MessageType::HaltTx;

    fn write_fields(&self, w: &mut Writer) {
        w.utf8(&self.id);
        w.boolean(self.auto_tx_only);
    }
}

impl Encode for FreeText {
    const MESSAGE_TYPE: MessageType = MessageType::FreeText;

    fn write_fields(&self, w: &mut Writer) {
        w.utf8(&self.id);
        w.utf8(&self.text);
        w.boolean(self.send);
    }
}

impl Encode for Location {
    const MESSAGE_TYPE: MessageType = MessageType::Location;

    fn write_fields(&self, w: &mut Writer) {
        w.utf8(&self.id);
        w.utf8(&self.location);
    }
}

impl Encode for HighlightCallsign {
    const MESSAGE_TYPE: MessageType = MessageType::HighlightCallsign;

    fn write_fields(&self, w: &mut Writer) {
        w.utf8(&self.id);
        w.utf8(&self.callsign);
        w.color(&self.background_color);
        w.color(&self.foreground_color);
        w.boolean(self.highlight_last);
    }
}

impl Encode for SwitchConfiguration {
    const MESSAGE_TYPE: MessageType = MessageType::SwitchConfiguration;

    fn write_fields(&self, w: &mut Writer) {
        w.utf8(&self.id);
        w.utf8(&self.configuration_name);
    }
}

impl Encode for Configure {
    const MESSAGE_TYPE: MessageType = MessageType::Configure;

    fn write_fields(&self, w: &mut Writer) {
        w.utf8(&self.id);
        w.utf8(&self.mode);
        w.u32(self.frequency_tolerance);
        w.utf8(&self.submode);
        w.boolean(self.fast_mode);
        w.u32(self.tr_period);
        w.u32(self.rx_df);
        w.utf8(&self.dx_call);
        w.utf8(&self.dx_grid);
        w.boolean(self.generate_messages);
    }
}
