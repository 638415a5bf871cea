/// Errors returned by [`WifiUdp`](crate::WifiUdp).
#[derive(Debug, thiserror::Error)]
pub enum UdpError {
    /// The operation needs an open socket; call `begin` first.
    #[error("UDP socket is not open")]
    NotStarted,

    /// No destination has been set with `begin_packet` or learned from a
    /// received packet.
    #[error("no destination set for outgoing packet")]
    NoDestination,

    /// An address string or multicast group was not usable.
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Socket-level failure.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, UdpError>;
