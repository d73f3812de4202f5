use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{info, trace};
use tuio_osc::MAX_PACKET_SIZE;

use crate::config::ListenerConfig;
use crate::error::{NetError, NetResult};

/// Anything that yields whole datagrams.
///
/// `recv` blocks until the next datagram and returns `Ok(None)` once the
/// source is closed. There is no timeout: silence on the wire is not an
/// error.
#[async_trait]
pub trait DatagramSource: Send {
    async fn recv(&mut self) -> NetResult<Option<Vec<u8>>>;
}

/// Datagrams from a bound UDP socket.
pub struct UdpSource {
    socket: UdpSocket,
    buffer: Vec<u8>,
}

impl UdpSource {
    pub async fn bind(config: &ListenerConfig) -> NetResult<Self> {
        config.validate()?;
        let addr = config.socket_addr();
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| NetError::Bind { addr, source })?;
        let source = Self::from_socket(socket, config.recv_buffer_size);
        info!(addr = %source.local_addr()?, "TUIO listener bound");
        Ok(source)
    }

    /// Wrap an already bound socket. `buffer_size` is raised to
    /// [`MAX_PACKET_SIZE`] if smaller so datagrams are never truncated.
    pub fn from_socket(socket: UdpSocket, buffer_size: usize) -> Self {
        Self {
            socket,
            buffer: vec![0u8; buffer_size.max(MAX_PACKET_SIZE)],
        }
    }

    /// The bound address; useful when binding port 0.
    pub fn local_addr(&self) -> NetResult<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

#[async_trait]
impl DatagramSource for UdpSource {
    async fn recv(&mut self) -> NetResult<Option<Vec<u8>>> {
        let (len, peer) = self.socket.recv_from(&mut self.buffer).await?;
        trace!(%peer, len, "datagram received");
        Ok(Some(self.buffer[..len].to_vec()))
    }
}

impl std::fmt::Debug for UdpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpSource")
            .field("local_addr", &self.socket.local_addr().ok())
            .field("buffer_size", &self.buffer.len())
            .finish()
    }
}

/// Datagrams handed over in-process. Closed when every sender is dropped.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl ChannelSource {
    /// Create a source and the sender that feeds it.
    pub fn new(capacity: usize) -> (mpsc::Sender<Vec<u8>>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }
}

impl From<mpsc::Receiver<Vec<u8>>> for ChannelSource {
    fn from(rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl DatagramSource for ChannelSource {
    async fn recv(&mut self) -> NetResult<Option<Vec<u8>>> {
        Ok(self.rx.recv().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_source_yields_then_closes() {
        let (tx, mut source) = ChannelSource::new(4);
        tx.send(vec![1, 2, 3]).await.unwrap();
        drop(tx);
        assert_eq!(source.recv().await.unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(source.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn udp_source_receives_datagram() {
        let config = ListenerConfig {
            bind_addr: "127.0.0.1".parse().unwrap(),
            port: 0,
            ..ListenerConfig::default()
        };
        let mut source = UdpSource::bind(&config).await.unwrap();
        let target = source.local_addr().unwrap();

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.send_to(b"#bundle\0", target).await.unwrap();

        assert_eq!(source.recv().await.unwrap(), Some(b"#bundle\0".to_vec()));
    }

    #[tokio::test]
    async fn small_buffer_never_truncates_a_frame() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let mut source = UdpSource::from_socket(socket, 64);
        let target = source.local_addr().unwrap();

        let payload = vec![0xabu8; 1024];
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.send_to(&payload, target).await.unwrap();

        assert_eq!(source.recv().await.unwrap(), Some(payload));
    }

    #[tokio::test]
    async fn bind_rejects_small_buffer() {
        let config = ListenerConfig {
            bind_addr: "127.0.0.1".parse().unwrap(),
            port: 0,
            recv_buffer_size: 64,
        };
        assert!(matches!(UdpSource::bind(&config).await, Err(NetError::Config(_))));
    }

    #[tokio::test]
    async fn bind_conflict_reports_address() {
        let taken = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();
        let config = ListenerConfig {
            bind_addr: addr.ip(),
            port: addr.port(),
            ..ListenerConfig::default()
        };
        match UdpSource::bind(&config).await {
            Err(NetError::Bind { addr: reported, .. }) => assert_eq!(reported, addr),
            other => panic!("expected bind error, got {other:?}"),
        }
    }
}
