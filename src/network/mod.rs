//! UDP transport module
//!
//! This module binds the socket WSJT-X talks to and moves raw datagrams between
//! the socket and the owning task. Decoding is left to [`crate::protocol`].

mod server;

pub use self::server::{Status, UdpServer};
