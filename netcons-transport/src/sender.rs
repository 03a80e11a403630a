//! ## netcons-transport::sender
//! **Lazily created UDP sender with a fixed destination**
//!
//! `ensure_socket` is idempotent: once a socket exists later calls are no-ops.
//! Until then `send` silently skips payloads, which is how the pipeline
//! degrades when the destination is unreachable or misconfigured.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use tracing::{debug, info};

use crate::error::TransportError;

/// Largest UDP payload over IPv4.
pub const MAX_DATAGRAM_LEN: usize = 65507;

/// Unparsed destination as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub address: String,
    pub port: u16,
}

impl Destination {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    pub fn resolve(&self) -> Result<SocketAddr, TransportError> {
        let ip: IpAddr =
            self.address
                .trim()
                .parse()
                .map_err(|source| TransportError::AddressParseFailed {
                    address: self.address.clone(),
                    source,
                })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The datagram was handed to the network stack.
    Sent(usize),
    /// No socket exists yet; the payload was dropped.
    Skipped,
}

struct Connection {
    socket: UdpSocket,
    target: SocketAddr,
}

pub struct NetworkSender {
    destination: Destination,
    connection: Option<Connection>,
}

impl NetworkSender {
    pub fn new(destination: Destination) -> Self {
        Self {
            destination,
            connection: None,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn is_ready(&self) -> bool {
        self.connection.is_some()
    }

    /// Local address of the socket, once created.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.connection
            .as_ref()
            .and_then(|conn| conn.socket.local_addr().ok())
    }

    /// Creates the socket if it does not exist yet.
    ///
    /// On failure the sender stays without a socket; nothing is retried
    /// automatically.
    pub fn ensure_socket(&mut self) -> Result<(), TransportError> {
        if self.connection.is_some() {
            return Ok(());
        }

        let target = self.destination.resolve()?;
        let bind_addr = match target {
            SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket = UdpSocket::bind(bind_addr).map_err(TransportError::SocketCreateFailed)?;

        info!(
            destination = %target,
            local = ?socket.local_addr().ok(),
            "UDP socket initialized"
        );
        self.connection = Some(Connection { socket, target });
        Ok(())
    }

    /// Sends `payload` as a single datagram.
    pub fn send(&self, payload: &[u8]) -> Result<SendOutcome, TransportError> {
        let Some(conn) = &self.connection else {
            debug!(len = payload.len(), "No socket, dropping payload");
            return Ok(SendOutcome::Skipped);
        };

        if payload.len() > MAX_DATAGRAM_LEN {
            return Err(TransportError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_DATAGRAM_LEN,
            });
        }

        let sent = conn
            .socket
            .send_to(payload, conn.target)
            .map_err(TransportError::SendFailed)?;
        Ok(SendOutcome::Sent(sent))
    }

    /// Closes the socket. Returns whether one was open.
    pub fn shutdown(&mut self) -> bool {
        match self.connection.take() {
            Some(conn) => {
                debug!(destination = %conn.target, "Closing UDP socket");
                true
            }
            None => false,
        }
    }
}

impl Drop for NetworkSender {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tracing_test::traced_test;

    fn local_receiver() -> (UdpSocket, Destination) {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let port = receiver.local_addr().unwrap().port();
        (receiver, Destination::new("127.0.0.1", port))
    }

    #[test]
    fn send_without_socket_is_skipped() {
        let sender = NetworkSender::new(Destination::new("127.0.0.1", 6666));
        assert!(!sender.is_ready());
        assert_eq!(sender.send(b"dropped").unwrap(), SendOutcome::Skipped);
    }

    #[test]
    fn bad_address_leaves_socket_absent() {
        let mut sender = NetworkSender::new(Destination::new("10.100.1", 6666));
        let err = sender.ensure_socket().unwrap_err();
        assert!(matches!(err, TransportError::AddressParseFailed { .. }));
        assert!(!sender.is_ready());
        assert_eq!(sender.send(b"x").unwrap(), SendOutcome::Skipped);
    }

    #[traced_test]
    #[test]
    fn delivers_single_datagram() {
        let (receiver, destination) = local_receiver();
        let mut sender = NetworkSender::new(destination);
        sender.ensure_socket().unwrap();
        assert!(logs_contain("UDP socket initialized"));

        let payload = b"console\0bytes";
        assert_eq!(
            sender.send(payload).unwrap(),
            SendOutcome::Sent(payload.len())
        );

        let mut buf = [0u8; 64];
        let (len, from) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], payload);
        assert_eq!(from.port(), sender.local_addr().unwrap().port());
    }

    #[test]
    fn ensure_socket_is_idempotent() {
        let (_receiver, destination) = local_receiver();
        let mut sender = NetworkSender::new(destination);
        sender.ensure_socket().unwrap();
        let first = sender.local_addr();
        sender.ensure_socket().unwrap();
        assert_eq!(sender.local_addr(), first);
    }

    #[test]
    fn rejects_oversized_payload() {
        let (_receiver, destination) = local_receiver();
        let mut sender = NetworkSender::new(destination);
        sender.ensure_socket().unwrap();
        let payload = vec![0u8; MAX_DATAGRAM_LEN + 1];
        assert!(matches!(
            sender.send(&payload),
            Err(TransportError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn shutdown_is_idempotent() {
        let (_receiver, destination) = local_receiver();
        let mut sender = NetworkSender::new(destination);
        assert!(!sender.shutdown());
        sender.ensure_socket().unwrap();
        assert!(sender.shutdown());
        assert!(!sender.shutdown());
        assert_eq!(sender.send(b"late").unwrap(), SendOutcome::Skipped);
    }
}
