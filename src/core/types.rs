use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use super::{Error, Result};

/// A Qt `QColor` as carried by the highlight message
///
/// Only the RGB spec is ever written; on the wire each channel is a 16-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QColor {
    pub alpha: u16,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl QColor {
    /// Fully transparent alpha, clears a previous highlight
    pub const ALPHA_TRANSPARENT: u16 = 0;
    /// Fully opaque alpha
    pub const ALPHA_OPAQUE: u16 = 0xffff;

    /// Creates an opaque color from 16-bit channels
    pub fn rgb(red: u16, green: u16, blue: u16) -> Self {
        QColor {
            alpha: Self::ALPHA_OPAQUE,
            red,
            green,
            blue,
        }
    }

    /// Creates an opaque color from 8-bit channels, scaled to 16 bits the way Qt does
    pub fn rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(red as u16 * 0x101, green as u16 * 0x101, blue as u16 * 0x101)
    }

    /// The invalid (transparent) color used to remove a highlight
    pub fn transparent() -> Self {
        QColor::default()
    }
}

/// Special operating activity reported in the status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialOperationMode {
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "NA VHF")]
    NaVhf,
    #[serde(rename = "EU VHF")]
    EuVhf,
    #[serde(rename = "FIELD DAY")]
    FieldDay,
    #[serde(rename = "RTTY RU")]
    RttyRu,
    #[serde(rename = "WW DIGI")]
    WwDigi,
    #[serde(rename = "FOX")]
    Fox,
    #[serde(rename = "HOUND")]
    Hound,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl SpecialOperationMode {
    /// Maps the wire byte to a mode; unassigned values become `Unknown`
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => SpecialOperationMode::None,
            1 => SpecialOperationMode::NaVhf,
            2 => SpecialOperationMode::EuVhf,
            3 => SpecialOperationMode::FieldDay,
            4 => SpecialOperationMode::RttyRu,
            5 => SpecialOperationMode::WwDigi,
            6 => SpecialOperationMode::Fox,
            7 => SpecialOperationMode::Hound,
            _ => SpecialOperationMode::Unknown,
        }
    }

    /// Display name as WSJT-X shows it
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialOperationMode::None => "NONE",
            SpecialOperationMode::NaVhf => "NA VHF",
            SpecialOperationMode::EuVhf => "EU VHF",
            SpecialOperationMode::FieldDay => "FIELD DAY",
            SpecialOperationMode::RttyRu => "RTTY RU",
            SpecialOperationMode::WwDigi => "WW DIGI",
            SpecialOperationMode::Fox => "FOX",
            SpecialOperationMode::Hound => "HOUND",
            SpecialOperationMode::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for SpecialOperationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which window a clear request applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ClearWindow {
    BandActivity = 0,
    RxFrequency = 1,
    BandActivityAndRxFrequency = 2,
}

impl From<ClearWindow> for u8 {
    fn from(window: ClearWindow) -> u8 {
        window as u8
    }
}

/// Keyboard modifier bits for the reply message
pub mod modifiers {
    pub const NONE: u8 = 0x00;
    pub const SHIFT: u8 = 0x02;
    pub const CONTROL: u8 = 0x04;
    pub const ALT: u8 = 0x08;
    pub const META: u8 = 0x10;
    pub const KEYPAD: u8 = 0x20;
    pub const GROUP_SWITCH: u8 = 0x40;
}

/// Configuration for the UDP transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on; a multicast address joins that group
    pub ip: IpAddr,
    /// UDP port
    pub port: u16,
    /// Interface used to join a multicast group
    pub interface: Ipv4Addr,
    /// Receive buffer size, longer datagrams are truncated
    pub max_datagram_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            ip: IpAddr::V4(super::LOCALHOST),
            port: super::DEFAULT_PORT,
            interface: Ipv4Addr::UNSPECIFIED,
            max_datagram_size: super::MAX_DATAGRAM_SIZE,
        }
    }
}

impl ServerConfig {
    /// Default configuration on the WSJT-X multicast group
    pub fn multicast() -> Self {
        ServerConfig {
            ip: IpAddr::V4(super::MULTICAST),
            ..Default::default()
        }
    }

    /// Sets the listen address
    pub fn with_ip(mut self, ip: IpAddr) -> Self {
        self.ip = ip;
        self
    }

    /// Sets the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Whether the listen address is a multicast group
    pub fn is_multicast(&self) -> bool {
        self.ip.is_multicast()
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> SocketAddr {
        if self.is_multicast() {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port)
        } else {
            SocketAddr::new(self.ip, self.port)
        }
    }

    /// Checks the configuration before binding
    pub fn validate(&self) -> Result<()> {
        if self.max_datagram_size == 0 {
            return Err(Error::config("max_datagram_size must be greater than zero"));
        }
        if let IpAddr::V6(group) = self.ip {
            if group.is_multicast() {
                return Err(Error::config("IPv6 multicast groups are not supported"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_operation_mode_names() {
        assert_eq!(SpecialOperationMode::from_u8(0).as_str(), "NONE");
        assert_eq!(SpecialOperationMode::from_u8(3).as_str(), "FIELD DAY");
        assert_eq!(SpecialOperationMode::from_u8(7), SpecialOperationMode::Hound);
        assert_eq!(SpecialOperationMode::from_u8(8), SpecialOperationMode::Unknown);
        assert_eq!(
            serde_json::to_string(&SpecialOperationMode::WwDigi).unwrap(),
            "\"WW DIGI\""
        );
    }

    #[test]
    fn test_qcolor_rgb8_scaling() {
        let red = QColor::rgb8(255, 0, 0);
        assert_eq!(red, QColor { alpha: 0xffff, red: 0xffff, green: 0, blue: 0 });
        assert_eq!(QColor::transparent().alpha, QColor::ALPHA_TRANSPARENT);
    }

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:2237".parse().unwrap());
        assert!(config.validate().is_ok());

        let multicast = ServerConfig::multicast().with_port(2238);
        assert!(multicast.is_multicast());
        assert_eq!(multicast.bind_addr(), "0.0.0.0:2238".parse().unwrap());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ServerConfig::default();
        config.max_datagram_size = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = ServerConfig::default().with_ip("ff02::1".parse().unwrap());
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: ServerConfig = serde_json::from_str(r#"{"port": 2333}"#).unwrap();
        assert_eq!(config.port, 2333);
        assert_eq!(config.max_datagram_size, 1024);
    }
}
