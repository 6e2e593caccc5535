use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::{Error, Result, ServerConfig};
use crate::protocol::{parse, Message, Response};

/// Snapshot of transport counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub rx_messages: u64,
    pub tx_messages: u64,
    pub started: DateTime<Utc>,
    #[serde(serialize_with = "crate::core::serde::serialize_duration")]
    #[serde(deserialize_with = "crate::core::serde::deserialize_duration")]
    pub uptime: Duration,
}

/// Counters owned by the server, updated by its loops
struct Stats {
    rx_messages: AtomicU64,
    tx_messages: AtomicU64,
    started: DateTime<Utc>,
    started_at: Instant,
}

impl Stats {
    fn new() -> Self {
        Stats {
            rx_messages: AtomicU64::new(0),
            tx_messages: AtomicU64::new(0),
            started: Utc::now(),
            started_at: Instant::now(),
        }
    }

    fn snapshot(&self) -> Status {
        Status {
            rx_messages: self.rx_messages.load(Ordering::Relaxed),
            tx_messages: self.tx_messages.load(Ordering::Relaxed),
            started: self.started,
            uptime: self.started_at.elapsed(),
        }
    }
}

/// Bidirectional datagram channel over one UDP socket
///
/// A receive loop and a send loop run as separate tasks and hand raw datagrams
/// to and from the owner through capacity-1 channels. Replies go to the address
/// of the last datagram received, or to the address set with [`UdpServer::set_peer`].
/// Any socket error stops both loops; there is no reconnect.
pub struct UdpServer {
    local_addr: SocketAddr,
    inbound_rx: mpsc::Receiver<Bytes>,
    outbound_tx: mpsc::Sender<Bytes>,
    peer: Arc<watch::Sender<Option<SocketAddr>>>,
    cancel: CancellationToken,
    stats: Arc<Stats>,
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

impl UdpServer {
    /// Binds the socket and starts both loops
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let socket = Arc::new(bind_socket(&config)?);
        let local_addr = socket.local_addr()?;

        let (inbound_tx, inbound_rx) = mpsc::channel(1);
        let (outbound_tx, outbound_rx) = mpsc::channel(1);
        let peer = Arc::new(watch::channel(None).0);
        let cancel = CancellationToken::new();
        let stats = Arc::new(Stats::new());

        let reader = tokio::spawn(receive_loop(
            Arc::clone(&socket),
            inbound_tx,
            Arc::clone(&peer),
            cancel.clone(),
            Arc::clone(&stats),
            config.max_datagram_size,
        ));
        let writer = tokio::spawn(send_loop(
            socket,
            outbound_rx,
            peer.subscribe(),
            cancel.clone(),
            Arc::clone(&stats),
        ));

        info!(%local_addr, multicast = config.is_multicast(), "UDP server listening");

        Ok(UdpServer {
            local_addr,
            inbound_rx,
            outbound_tx,
            peer,
            cancel,
            stats,
            reader: Some(reader),
            writer: Some(writer),
        })
    }

    /// Returns the local socket address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Address outbound datagrams go to, if one is known
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        *self.peer.borrow()
    }

    /// Directs outbound datagrams to `addr` until another datagram arrives
    pub fn set_peer(&self, addr: SocketAddr) {
        self.peer.send_replace(Some(addr));
    }

    /// Waits for the next raw datagram; `None` once the server has stopped
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.inbound_rx.recv().await
    }

    /// Waits for the next datagram and decodes it
    pub async fn recv_response(&mut self) -> Option<Result<Response>> {
        self.recv().await.map(|datagram| parse(&datagram))
    }

    /// Hands a datagram to the send loop, waiting until it is accepted
    pub async fn send(&self, datagram: impl Into<Bytes>) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::network("UDP server is closed"));
        }
        tokio::select! {
            _ = self.cancel.cancelled() => Err(Error::network("UDP server is closed")),
            sent = self.outbound_tx.send(datagram.into()) => {
                sent.map_err(|_| Error::network("UDP server is closed"))
            }
        }
    }

    /// Encodes and sends an outbound message
    pub async fn send_message(&self, message: &Message) -> Result<()> {
        self.send(message.encode()).await
    }

    /// Current counters and uptime
    pub fn status(&self) -> Status {
        self.stats.snapshot()
    }

    /// Whether the loops have been told to stop
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stops both loops and waits for them to finish
    pub async fn close(mut self) -> Result<()> {
        self.cancel.cancel();
        for handle in [self.reader.take(), self.writer.take()].into_iter().flatten() {
            handle
                .await
                .map_err(|e| Error::network(format!("Transport task failed: {}", e)))?;
        }
        info!(local_addr = %self.local_addr, "UDP server closed");
        Ok(())
    }
}

impl Drop for UdpServer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn bind_socket(config: &ServerConfig) -> Result<UdpSocket> {
    let addr = config.bind_addr();
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket
        .bind(&addr.into())
        .map_err(|e| Error::network(format!("Failed to bind {}: {}", addr, e)))?;

    if let IpAddr::V4(group) = config.ip {
        if group.is_multicast() {
            socket
                .join_multicast_v4(&group, &config.interface)
                .map_err(|e| Error::network(format!("Failed to join {}: {}", group, e)))?;
        }
    }

    socket.set_nonblocking(true)?;
    let socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(socket)?)
}

async fn receive_loop(
    socket: Arc<UdpSocket>,
    inbound: mpsc::Sender<Bytes>,
    peer: Arc<watch::Sender<Option<SocketAddr>>>,
    cancel: CancellationToken,
    stats: Arc<Stats>,
    max_datagram_size: usize,
) {
    let mut buf = vec![0u8; max_datagram_size];

    loop {
        let (len, from) = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("receive loop: closing");
                return;
            }
            received = socket.recv_from(&mut buf) => match received {
                Ok(received) => received,
                Err(e) => {
                    error!(error = %e, "receive loop: socket error");
                    cancel.cancel();
                    return;
                }
            }
        };

        stats.rx_messages.fetch_add(1, Ordering::Relaxed);
        peer.send_replace(Some(from));
        debug!(%from, len, "datagram received");

        let datagram = Bytes::copy_from_slice(&buf[..len]);
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("receive loop: closing");
                return;
            }
            sent = inbound.send(datagram) => {
                if sent.is_err() {
                    cancel.cancel();
                    return;
                }
            }
        }
    }
}

async fn send_loop(
    socket: Arc<UdpSocket>,
    mut outbound: mpsc::Receiver<Bytes>,
    peer: watch::Receiver<Option<SocketAddr>>,
    cancel: CancellationToken,
    stats: Arc<Stats>,
) {
    loop {
        let datagram = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("send loop: closing");
                return;
            }
            next = outbound.recv() => match next {
                Some(datagram) => datagram,
                None => {
                    cancel.cancel();
                    return;
                }
            }
        };

        let to = match *peer.borrow() {
            Some(to) => to,
            None => {
                warn!(len = datagram.len(), "no peer known yet, dropping datagram");
                continue;
            }
        };

        if let Err(e) = socket.send_to(&datagram, to).await {
            error!(%to, error = %e, "send loop: socket error");
            cancel.cancel();
            return;
        }
        stats.tx_messages.fetch_add(1, Ordering::Relaxed);
        debug!(%to, len = datagram.len(), "datagram sent");
    }
}
