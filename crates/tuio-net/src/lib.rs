//! Decode cycle over datagram transports.
//!
//! A [`Connection`] pairs a [`DatagramSource`] with a
//! [`TuioClient`](tuio_client::TuioClient): every datagram is decoded as one
//! OSC packet, its messages are dispatched in transport order, and one
//! [`Snapshot`](tuio_types::Snapshot) comes out. [`TuioListener`] runs that
//! loop on a background task and publishes the latest snapshot.
//!
//! # Key Types
//!
//! - [`ListenerConfig`] -- bind address, port (default 3333) and buffer size
//! - [`DatagramSource`] -- async datagram input; [`UdpSource`], [`ChannelSource`]
//! - [`Connection`] -- one listen cycle per call, closable via [`CloseHandle`]
//! - [`TuioListener`] -- background task with a watch channel of snapshots

pub mod config;
pub mod connection;
pub mod error;
pub mod listener;
pub mod source;

pub use config::{ListenerConfig, DEFAULT_PORT, DEFAULT_RECV_BUFFER_SIZE};
pub use connection::{CloseHandle, Connection, ConnectionStats};
pub use error::{NetError, NetResult};
pub use listener::TuioListener;
pub use source::{ChannelSource, DatagramSource, UdpSource};
