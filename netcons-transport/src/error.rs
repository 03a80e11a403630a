use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Cannot parse destination address '{address}': {source}")]
    AddressParseFailed {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("Cannot create socket: {0}")]
    SocketCreateFailed(#[source] io::Error),

    #[error("Datagram send failed: {0}")]
    SendFailed(#[source] io::Error),

    #[error("Payload of {len} bytes exceeds the datagram limit of {max}")]
    PayloadTooLarge { len: usize, max: usize },
}
