//! WSJT-X UDP: codec and transport for the WSJT-X companion protocol
//!
//! WSJT-X reports decodes, status changes and logged contacts as binary UDP
//! datagrams, and accepts a set of commands back over the same socket. This
//! library decodes the inbound datagrams into typed records, encodes the
//! outbound commands, and provides a small UDP server to exchange them.
pub mod core;
pub mod network;
pub mod protocol;
pub mod util;

// Re-export commonly used items
pub use crate::core::{Error, Result, ServerConfig};
pub use crate::network::UdpServer;
pub use crate::protocol::{parse, Encode, Message, Response, WsjtxCodec};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
