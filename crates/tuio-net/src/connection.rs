use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};
use tuio_client::TuioClient;
use tuio_osc::OscCodec;
use tuio_types::Snapshot;

use crate::config::ListenerConfig;
use crate::error::NetResult;
use crate::source::{DatagramSource, UdpSource};

/// Bytes of an undecodable datagram shown in the debug log.
const LOG_PREFIX_LEN: usize = 32;

/// Requests that a [`Connection`] stop listening.
///
/// Cloneable; closing through any clone wakes a `listen` call that is
/// waiting for the next datagram.
#[derive(Clone, Debug)]
pub struct CloseHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CloseHandle {
    pub fn close(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Counters of the receive loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    pub datagrams_received: u64,
    /// Empty or undecodable datagrams.
    pub datagrams_skipped: u64,
}

/// One decoder fed by one datagram source.
///
/// Each call to [`listen`](Self::listen) consumes one datagram, dispatches
/// its messages in transport order and returns the resulting snapshot.
pub struct Connection<S: DatagramSource = UdpSource> {
    source: S,
    client: Arc<TuioClient>,
    close: CloseHandle,
    closed: watch::Receiver<bool>,
    stats: ConnectionStats,
}

impl Connection<UdpSource> {
    /// Bind a UDP source per `config` with a fresh decoder.
    pub async fn bind(config: &ListenerConfig) -> NetResult<Self> {
        let source = UdpSource::bind(config).await?;
        Ok(Self::new(source, Arc::new(TuioClient::new())))
    }
}

impl<S: DatagramSource> Connection<S> {
    pub fn new(source: S, client: Arc<TuioClient>) -> Self {
        let (tx, closed) = watch::channel(false);
        Self {
            source,
            client,
            close: CloseHandle { tx: Arc::new(tx) },
            closed,
            stats: ConnectionStats::default(),
        }
    }

    pub fn client(&self) -> &Arc<TuioClient> {
        &self.client
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn stats(&self) -> ConnectionStats {
        self.stats
    }

    pub fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }

    pub fn close(&self) {
        self.close.close();
    }

    /// Wait for the next datagram and decode it into a snapshot.
    ///
    /// Empty and undecodable datagrams are skipped and the wait continues.
    /// Returns `Ok(None)` once the source is closed or the connection is
    /// closed through a [`CloseHandle`]. On close and on a receive error the
    /// in-flight frame is discarded and the store is left as last committed.
    pub async fn listen(&mut self) -> NetResult<Option<Snapshot>> {
        loop {
            let received = tokio::select! {
                biased;
                _ = closed(&mut self.closed) => None,
                received = self.source.recv() => match received {
                    Ok(received) => received,
                    Err(err) => {
                        self.client.discard_pending();
                        return Err(err);
                    }
                },
            };
            let Some(datagram) = received else {
                let pending = self.client.pending_mutations();
                self.client.discard_pending();
                info!(pending, "TUIO connection closed");
                return Ok(None);
            };
            self.stats.datagrams_received += 1;

            if datagram.is_empty() {
                self.stats.datagrams_skipped += 1;
                debug!("empty datagram skipped");
                continue;
            }
            match OscCodec::decode(&datagram) {
                Ok(packet) => return Ok(Some(self.client.process_packet(&packet))),
                Err(err) => {
                    self.stats.datagrams_skipped += 1;
                    let prefix = &datagram[..datagram.len().min(LOG_PREFIX_LEN)];
                    debug!(
                        error = %err,
                        len = datagram.len(),
                        bytes = %hex::encode(prefix),
                        "undecodable datagram skipped"
                    );
                }
            }
        }
    }
}

/// Resolves once the close flag is set.
async fn closed(rx: &mut watch::Receiver<bool>) {
    loop {
        let is_closed = *rx.borrow_and_update();
        if is_closed {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender gone without closing: the connection can no longer be closed.
            std::future::pending::<()>().await;
        }
    }
}

impl<S: DatagramSource> std::fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("client", &self.client)
            .field("closed", &self.close.is_closed())
            .field("stats", &self.stats)
            .finish()
    }
}
