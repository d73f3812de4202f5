use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tuio_client::TuioClient;
use tuio_types::{Snapshot, SymbolId, VisibleObject};

use crate::connection::{CloseHandle, Connection};
use crate::error::{NetError, NetResult};
use crate::source::DatagramSource;

/// A connection driven by a background task.
///
/// The task runs the listen loop and publishes each snapshot that differs
/// from the previous one. Readers either poll [`latest`](Self::latest) or
/// await changes on a [`subscribe`](Self::subscribe) receiver.
pub struct TuioListener {
    client: Arc<TuioClient>,
    snapshots: watch::Receiver<Snapshot>,
    close: CloseHandle,
    task: JoinHandle<NetResult<()>>,
}

impl TuioListener {
    /// Start listening on `connection`. Must be called inside a tokio runtime.
    pub fn spawn<S>(mut connection: Connection<S>) -> Self
    where
        S: DatagramSource + 'static,
    {
        let (tx, snapshots) = watch::channel(Snapshot::new());
        let client = Arc::clone(connection.client());
        let close = connection.close_handle();

        let task = tokio::spawn(async move {
            loop {
                match connection.listen().await {
                    Ok(Some(snapshot)) => {
                        tx.send_if_modified(|current| {
                            if *current == snapshot {
                                return false;
                            }
                            *current = snapshot;
                            true
                        });
                    }
                    Ok(None) => {
                        info!(stats = ?connection.stats(), "listener stopped");
                        return Ok(());
                    }
                    Err(err) => {
                        warn!(error = %err, "listener receive loop failed");
                        return Err(err);
                    }
                }
            }
        });

        Self {
            client,
            snapshots,
            close,
            task,
        }
    }

    /// The decoder behind this listener.
    pub fn client(&self) -> &Arc<TuioClient> {
        &self.client
    }

    /// Symbols visible in the latest snapshot, ascending.
    pub fn visible_symbols(&self) -> Vec<SymbolId> {
        self.snapshots.borrow().symbols().collect()
    }

    pub fn visible_objects(&self) -> Vec<VisibleObject> {
        self.snapshots.borrow().objects().copied().collect()
    }

    pub fn latest(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified whenever the visible set changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Close the connection and wait for the task to end.
    ///
    /// Returns the error that ended the loop, if it ended on its own.
    pub async fn shutdown(self) -> NetResult<()> {
        self.close.close();
        self.task.await.map_err(|e| NetError::Task(e.to_string()))?
    }
}

impl std::fmt::Debug for TuioListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TuioListener")
            .field("visible_count", &self.snapshots.borrow().len())
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tuio_client::{SetMessage, TuioMessage};
    use tuio_osc::{OscBundle, OscCodec, OscPacket};
    use tuio_types::{Motion, Position, SessionId};

    use crate::source::ChannelSource;

    fn frame(objects: &[(i64, i32)], fseq: i32) -> Vec<u8> {
        let mut messages = vec![TuioMessage::Alive(objects.iter().map(|&(s, _)| SessionId::new(s)).collect()).to_osc()];
        for &(session, symbol) in objects {
            let set = TuioMessage::Set(SetMessage {
                session_id: SessionId::new(session),
                symbol_id: SymbolId::new(symbol),
                position: Position::new(0.25, 0.75),
                angle: 0.0,
                motion: Motion::ZERO,
            });
            messages.push(set.to_osc());
        }
        messages.push(TuioMessage::Fseq(fseq).to_osc());
        OscCodec::encode(&OscPacket::from(OscBundle::immediate(messages))).unwrap()
    }

    async fn next_change(rx: &mut watch::Receiver<Snapshot>) -> Snapshot {
        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("snapshot change in time")
            .expect("listener alive");
        rx.borrow_and_update().clone()
    }

    #[tokio::test]
    async fn publishes_snapshots() {
        let (tx, source) = ChannelSource::new(8);
        let listener = TuioListener::spawn(Connection::new(source, Arc::new(TuioClient::new())));
        let mut rx = listener.subscribe();
        assert!(listener.latest().is_empty());

        tx.send(frame(&[(1, 100), (2, 7)], 1)).await.unwrap();
        let snapshot = next_change(&mut rx).await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(listener.visible_symbols(), vec![SymbolId::new(7), SymbolId::new(100)]);
        assert_eq!(listener.visible_objects()[0].position, Position::new(0.25, 0.75));

        tx.send(frame(&[(2, 7)], 2)).await.unwrap();
        let snapshot = next_change(&mut rx).await;
        assert_eq!(snapshot.symbols().collect::<Vec<_>>(), vec![SymbolId::new(7)]);

        listener.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn unchanged_snapshot_is_not_republished() {
        let (tx, source) = ChannelSource::new(8);
        let listener = TuioListener::spawn(Connection::new(source, Arc::new(TuioClient::new())));
        let mut rx = listener.subscribe();

        tx.send(frame(&[(1, 100)], 1)).await.unwrap();
        next_change(&mut rx).await;
        tx.send(frame(&[(1, 100)], 2)).await.unwrap();
        tx.send(frame(&[(1, 100), (3, 5)], 3)).await.unwrap();

        // The repeated frame produced no notification.
        let snapshot = next_change(&mut rx).await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(listener.client().current_frame(), 3);

        listener.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_stops_an_idle_listener() {
        let (_tx, source) = ChannelSource::new(1);
        let listener = TuioListener::spawn(Connection::new(source, Arc::new(TuioClient::new())));
        tokio::time::timeout(Duration::from_secs(5), listener.shutdown())
            .await
            .expect("shutdown in time")
            .unwrap();
    }

    #[tokio::test]
    async fn source_closure_ends_task() {
        let (tx, source) = ChannelSource::new(1);
        let listener = TuioListener::spawn(Connection::new(source, Arc::new(TuioClient::new())));
        drop(tx);
        let mut rx = listener.subscribe();
        // The sender side of the watch channel is dropped when the task ends.
        let ended = tokio::time::timeout(Duration::from_secs(5), rx.changed()).await;
        assert!(matches!(ended, Ok(Err(_))));
        listener.shutdown().await.unwrap();
    }
}
