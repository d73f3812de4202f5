use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tuio_osc::MAX_PACKET_SIZE;

use crate::error::{NetError, NetResult};

/// Default TUIO port.
pub const DEFAULT_PORT: u16 = 3333;

/// Receive buffer size; large enough for any UDP payload.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 65_536;

/// Where and how a UDP connection listens.
///
/// Every field is optional in a TOML file; missing fields take their
/// defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub recv_buffer_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }
}

impl ListenerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    pub fn from_toml_str(text: &str) -> NetResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| NetError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> NetResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> NetResult<String> {
        toml::to_string(self).map_err(|e| NetError::Config(e.to_string()))
    }

    /// A buffer smaller than the largest UDP payload would truncate
    /// datagrams, and a truncated bundle never decodes.
    pub fn validate(&self) -> NetResult<()> {
        if self.recv_buffer_size < MAX_PACKET_SIZE {
            return Err(NetError::Config(format!(
                "recv_buffer_size must be at least {MAX_PACKET_SIZE}, got {}",
                self.recv_buffer_size
            )));
        }
        Ok(())
    }
}
