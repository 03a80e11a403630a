//! netcons‑transport
//!
//! Outbound datagram transport for the network console.
//! The socket is created lazily on the first `ensure_socket` call and every
//! payload is sent as one UDP datagram to a fixed destination. No framing,
//! no acknowledgement, no retransmission.

pub mod error;
pub mod sender;

pub use error::TransportError;
pub use sender::{Destination, NetworkSender, SendOutcome, MAX_DATAGRAM_LEN};
