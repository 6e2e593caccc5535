//! Core types shared by the codec and the transport
//!
//! This module contains the error type, protocol constants and the small value
//! types used by several message variants.

pub mod error;
pub mod types;
pub mod serde;

use std::net::Ipv4Addr;

pub use self::error::{Error, Result};
pub use self::types::{
    modifiers,
    ClearWindow,
    QColor,
    ServerConfig,
    SpecialOperationMode,
};

/// Default WSJT-X UDP server port
pub const DEFAULT_PORT: u16 = 2237;

/// Loopback address WSJT-X sends to out of the box
pub const LOCALHOST: Ipv4Addr = Ipv4Addr::new(127, 0, 0, 1);

/// Multicast group commonly configured in WSJT-X
pub const MULTICAST: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 101);

/// Default receive buffer size in bytes
pub const MAX_DATAGRAM_SIZE: usize = 1024;
