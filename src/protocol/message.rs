use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{QColor, SpecialOperationMode};
use super::MessageType;

/// Announces a client and the highest schema it understands
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heartbeat {
    pub id: String,
    pub max_schema_number: u32,
    pub version: String,
    pub revision: String,
}

/// Radio and application state, sent by WSJT-X on every change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub id: String,
    /// Dial frequency in Hz
    pub dial: u64,
    pub mode: String,
    pub dx_call: String,
    pub report: String,
    pub tx_mode: String,
    pub tx_enabled: bool,
    pub transmitting: bool,
    pub decoding: bool,
    pub rx_df: u32,
    pub tx_df: u32,
    pub de_call: String,
    pub de_grid: String,
    pub dx_grid: String,
    pub tx_watchdog: bool,
    pub sub_mode: String,
    pub fast_mode: bool,
    pub special_operation_mode: SpecialOperationMode,
    pub frequency_tolerance: u32,
    pub tr_period: u32,
    pub configuration_name: String,
    pub tx_message: String,
}

/// A decoded message from the band activity window
///
/// `full_time` places `time` on the day the datagram was decoded, the wire
/// carries no date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decode {
    pub id: String,
    pub new: bool,
    /// Milliseconds since midnight
    pub time: u32,
    pub full_time: DateTime<Utc>,
    pub snr: i32,
    pub delta_time: f64,
    pub delta_frequency_hz: u32,
    pub mode: String,
    pub message: String,
    pub low_confidence: bool,
    pub off_air: bool,
}

/// Clears band activity and/or the RX frequency window
///
/// WSJT-X sends it without `window`; when decoded without one it is `0`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clear {
    pub id: String,
    /// See [`crate::core::ClearWindow`]
    pub window: u8,
}

/// Behaves as if the operator double-clicked a decode
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub time: u32,
    pub snr: i32,
    pub delta_time: f64,
    pub delta_frequency_hz: u32,
    pub mode: String,
    pub message: String,
    pub low_confidence: bool,
    /// See [`crate::core::modifiers`]
    pub modifiers: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QsoLogged {
    pub id: String,
    pub date_time_off: DateTime<Utc>,
    pub dx_call: String,
    pub dx_grid: String,
    pub tx_frequency_hz: u64,
    pub mode: String,
    pub report_sent: String,
    pub report_received: String,
    pub tx_power: String,
    pub comments: String,
    pub name: String,
    pub date_time_on: DateTime<Utc>,
    pub operator_call: String,
    pub my_call: String,
    pub my_grid: String,
    pub exchange_sent: String,
    pub exchange_received: String,
    pub adif_propagation_mode: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Close {
    pub id: String,
}

/// Asks WSJT-X to resend all decodes in its band activity window
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replay {
    pub id: String,
}

/// Stops transmission, now or at the end of the current period when `auto_tx_only`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HaltTx {
    pub id: String,
    pub auto_tx_only: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeText {
    pub id: String,
    pub text: String,
    pub send: bool,
}

/// A WSPR spot; `power_watts` is derived from `power_dbm`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsprDecode {
    pub id: String,
    pub new: bool,
    /// Milliseconds since midnight
    pub time: u32,
    pub full_time: DateTime<Utc>,
    pub snr: i32,
    pub delta_time: f64,
    pub frequency_hz: u64,
    pub drift_hz: i32,
    pub callsign: String,
    pub grid: String,
    pub power_dbm: i32,
    pub power_watts: f64,
    pub off_air: bool,
}

/// Sets the station grid locator for the session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedAdif {
    pub id: String,
    pub adif: String,
}

/// Highlights a callsign in the band activity window
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightCallsign {
    pub id: String,
    pub callsign: String,
    pub background_color: QColor,
    pub foreground_color: QColor,
    pub highlight_last: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchConfiguration {
    pub id: String,
    pub configuration_name: String,
}

/// Changes mode and related settings of the current configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configure {
    pub id: String,
    pub mode: String,
    pub frequency_tolerance: u32,
    pub submode: String,
    pub fast_mode: bool,
    pub tr_period: u32,
    pub rx_df: u32,
    pub dx_call: String,
    pub dx_grid: String,
    pub generate_messages: bool,
}

/// Messages a companion tool can send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    Heartbeat(Heartbeat),
    Clear(Clear),
    Reply(Reply),
    Close(Close),
    Replay(Replay),
    HaltTx(HaltTx),
    FreeText(FreeText),
    Location(Location),
    HighlightCallsign(HighlightCallsign),
    SwitchConfiguration(SwitchConfiguration),
    Configure(Configure),
}

impl Message {
    /// Wire tag of this message
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Heartbeat(_) => MessageType::Heartbeat,
            Message::Clear(_) => MessageType::Clear,
            Message::Reply(_) => MessageType::Reply,
            Message::Close(_) => MessageType::Close,
            Message::Replay(_) => MessageType::Replay,
            Message::HaltTx(_) => MessageType::HaltTx,
            Message::FreeText(_) => MessageType::FreeText,
            Message::Location(_) => MessageType::Location,
            Message::HighlightCallsign(_) => MessageType::HighlightCallsign,
            Message::SwitchConfiguration(_) => MessageType::SwitchConfiguration,
            Message::Configure(_) => MessageType::Configure,
        }
    }
}

macro_rules! impl_from_record {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Message {
                fn from(message: $variant) -> Self {
                    Message::$variant(message)
                }
            }
        )*
    };
}

impl_from_record!(
    Heartbeat,
    Clear,
    Reply,
    Close,
    Replay,
    HaltTx,
    FreeText,
    Location,
    HighlightCallsign,
    SwitchConfiguration,
    Configure,
);

/// A decoded datagram, tagged by its message type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "responseType", content = "message")]
pub enum Response {
    #[serde(rename = "HEARTBEAT")]
    Heartbeat(Heartbeat),
    #[serde(rename = "STATUS")]
    Status(Status),
    #[serde(rename = "DECODE")]
    Decode(Decode),
    #[serde(rename = "CLEAR")]
    Clear(Clear),
    #[serde(rename = "REPLY")]
    Reply(Reply),
    #[serde(rename = "QSOLogged")]
    QsoLogged(QsoLogged),
    #[serde(rename = "CLOSE")]
    Close(Close),
    #[serde(rename = "REPLAY")]
    Replay(Replay),
    #[serde(rename = "HALTTX")]
    HaltTx(HaltTx),
    #[serde(rename = "FREETEXT")]
    FreeText(FreeText),
    #[serde(rename = "WSPRDecode")]
    WsprDecode(WsprDecode),
    #[serde(rename = "LOCATION")]
    Location(Location),
    #[serde(rename = "LoggedADIF")]
    LoggedAdif(LoggedAdif),
    #[serde(rename = "HIGHLIGHTCALLSIGN")]
    HighlightCallsign(HighlightCallsign),
    #[serde(rename = "SWITCHCONFIGURATION")]
    SwitchConfiguration(SwitchConfiguration),
    #[serde(rename = "CONFIGURE")]
    Configure(Configure),
}

impl Response {
    /// Response type name, as used in the serialized form
    pub fn response_type(&self) -> &'static str {
        match self {
            Response::Heartbeat(_) => "HEARTBEAT",
            Response::Status(_) => "STATUS",
            Response::Decode(_) => "DECODE",
            Response::Clear(_) => "CLEAR",
            Response::Reply(_) => "REPLY",
            Response::QsoLogged(_) => "QSOLogged",
            Response::Close(_) => "CLOSE",
            Response::Replay(_) => "REPLAY",
            Response::HaltTx(_) => "HALTTX",
            Response::FreeText(_) => "FREETEXT",
            Response::WsprDecode(_) => "WSPRDecode",
            Response::Location(_) => "LOCATION",
            Response::LoggedAdif(_) => "LoggedADIF",
            Response::HighlightCallsign(_) => "HIGHLIGHTCALLSIGN",
            Response::SwitchConfiguration(_) => "SWITCHCONFIGURATION",
            Response::Configure(_) => "CONFIGURE",
        }
    }

    /// Client id carried by every message
    pub fn id(&self) -> &str {
        match self {
            Response::Heartbeat(m) => &m.id,
            Response::Status(m) => &m.id,
            Response::Decode(m) => &m.id,
            Response::Clear(m) => &m.id,
            Response::Reply(m) => &m.id,
            Response::QsoLogged(m) => &m.id,
            Response::Close(m) => &m.id,
            Response::Replay(m) => &m.id,
            Response::HaltTx(m) => &m.id,
            Response::FreeText(m) => &m.id,
            Response::WsprDecode(m) => &m.id,
            Response::Location(m) => &m.id,
            Response::LoggedAdif(m) => &m.id,
            Response::HighlightCallsign(m) => &m.id,
            Response::SwitchConfiguration(m) => &m.id,
            Response::Configure(m) => &m.id,
        }
    }
}

impl From<Message> for Response {
    fn from(message: Message) -> Self {
        match message {
            Message::Heartbeat(m) => Response::Heartbeat(m),
            Message::Clear(m) => Response::Clear(m),
            Message::Reply(m) => Response::Reply(m),
            Message::Close(m) => Response::Close(m),
            Message::Replay(m) => Response::Replay(m),
            Message::HaltTx(m) => Response::HaltTx(m),
            Message::FreeText(m) => Response::FreeText(m),
            Message::Location(m) => Response::Location(m),
            Message::HighlightCallsign(m) => Response::HighlightCallsign(m),
            Message::SwitchConfiguration(m) => Response::SwitchConfiguration(m),
            Message::Configure(m) => Response::Configure(m),
        }
    }
}
