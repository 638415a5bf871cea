//! Arduino `WiFiUDP`-compatible datagram socket.
//!
//! Outgoing data is staged with `begin_packet` / `write_*` and sent as one
//! datagram by `end_packet`. Incoming datagrams are pulled one at a time by
//! `parse_packet` and consumed with `read_*` / `peek`.
//!
//! Sockets are non-blocking unless a receive timeout is set with
//! [`WifiUdp::set_timeout`].

use std::io::{self, ErrorKind};
use std::net::{AddrParseError, Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};

use crate::error::{Result, UdpError};

/// Initial capacity of the outgoing buffer and size of the receive buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Target used to find the outbound interface address. Connecting a UDP
/// socket sends nothing, so a TEST-NET-1 address is enough to consult the
/// routing table.
const ROUTE_PROBE: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(192, 0, 2, 1), 9);

/// UDP endpoint with the `WiFiUDP` packet API.
#[derive(Debug, Default)]
pub struct WifiUdp {
    socket: Option<UdpSocket>,
    /// Destination of the next packet; updated by each received packet.
    remote: Option<SocketAddrV4>,
    listening: bool,
    timeout: Option<Duration>,
    tx: Vec<u8>,
    rx: Vec<u8>,
    read_pos: usize,
}

impl WifiUdp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `port` on all interfaces. Port 0 picks an ephemeral port.
    pub fn begin(&mut self, port: u16) -> Result<()> {
        let socket = self.open(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))?;
        tracing::debug!(port = local_port_of(&socket), "UDP socket listening");
        self.socket = Some(socket);
        self.listening = true;
        Ok(())
    }

    /// Bind to `port` and join the multicast `group` on `interface`.
    pub fn begin_multicast(&mut self, port: u16, group: Ipv4Addr, interface: Ipv4Addr) -> Result<()> {
        if !group.is_multicast() {
            return Err(UdpError::InvalidAddress {
                address: group.to_string(),
                reason: "not a multicast group".to_string(),
            });
        }

        let socket = self.open(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))?;
        if let Err(e) = socket.join_multicast_v4(&group, &interface) {
            tracing::warn!(%group, %interface, error = %e, "failed to join multicast group");
            return Err(e.into());
        }

        tracing::debug!(port = local_port_of(&socket), %group, "UDP multicast socket listening");
        self.socket = Some(socket);
        self.listening = true;
        Ok(())
    }

    /// Close the socket and drop all buffered data.
    pub fn stop(&mut self) {
        if self.socket.take().is_some() {
            tracing::debug!("UDP socket closed");
        }
        self.listening = false;
        self.tx = Vec::new();
        self.rx = Vec::new();
        self.read_pos = 0;
    }

    /// Start a packet to `ip:port`, where `ip` is dotted-quad text.
    pub fn begin_packet(&mut self, ip: &str, port: u16) -> Result<()> {
        let addr: Ipv4Addr = ip.parse().map_err(|e: AddrParseError| UdpError::InvalidAddress {
            address: ip.to_string(),
            reason: e.to_string(),
        })?;
        self.begin_packet_to(SocketAddrV4::new(addr, port))
    }

    /// Start a packet to an address given as a host-order `u32`.
    pub fn begin_packet_u32(&mut self, ip: u32, port: u16) -> Result<()> {
        self.begin_packet_to(SocketAddrV4::new(Ipv4Addr::from(ip), port))
    }

    /// Start a packet to `dest`.
    ///
    /// Opens an ephemeral socket if none is open; that socket can send and
    /// receive replies but [`connected`](Self::connected) stays false.
    pub fn begin_packet_to(&mut self, dest: SocketAddrV4) -> Result<()> {
        if self.socket.is_none() {
            let socket = self.open(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))?;
            self.socket = Some(socket);
        }
        self.remote = Some(dest);
        self.tx.clear();
        Ok(())
    }

    /// Send the staged packet. Returns the number of bytes sent.
    ///
    /// The outgoing buffer is cleared on success and kept on failure.
    pub fn end_packet(&mut self) -> Result<usize> {
        let socket = self.socket.as_ref().ok_or(UdpError::NotStarted)?;
        let dest = self.remote.ok_or(UdpError::NoDestination)?;

        match socket.send_to(&self.tx, dest) {
            Ok(sent) => {
                tracing::trace!(%dest, bytes = sent, "sent UDP packet");
                self.tx.clear();
                Ok(sent)
            }
            Err(e) => {
                tracing::warn!(%dest, error = %e, "failed to send UDP packet");
                Err(e.into())
            }
        }
    }

    /// Append one byte to the outgoing packet.
    pub fn write_byte(&mut self, byte: u8) -> usize {
        self.reserve_tx(1);
        self.tx.push(byte);
        1
    }

    /// Append `data` to the outgoing packet.
    pub fn write_bytes(&mut self, data: &[u8]) -> usize {
        self.reserve_tx(data.len());
        self.tx.extend_from_slice(data);
        data.len()
    }

    /// Append the UTF-8 bytes of `s` to the outgoing packet.
    pub fn write_str(&mut self, s: &str) -> usize {
        self.write_bytes(s.as_bytes())
    }

    /// Bytes staged for the next `end_packet`.
    pub fn pending(&self) -> &[u8] {
        &self.tx
    }

    /// Receive the next datagram, if any.
    ///
    /// Returns its size, or 0 when no socket is open or nothing arrived
    /// (immediately when non-blocking, after the timeout otherwise).
    /// Datagrams longer than [`DEFAULT_BUFFER_SIZE`] are truncated. The
    /// sender becomes the destination of the next packet.
    pub fn parse_packet(&mut self) -> Result<usize> {
        let Some(socket) = self.socket.as_ref() else {
            return Ok(0);
        };

        self.rx.clear();
        self.rx.resize(DEFAULT_BUFFER_SIZE, 0);
        self.read_pos = 0;

        match socket.recv_from(&mut self.rx) {
            Ok((len, SocketAddr::V4(from))) => {
                self.rx.truncate(len);
                self.remote = Some(from);
                tracing::trace!(%from, bytes = len, "received UDP packet");
                Ok(len)
            }
            Ok((_, SocketAddr::V6(from))) => {
                tracing::debug!(%from, "ignoring IPv6 datagram");
                self.rx.clear();
                Ok(0)
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                self.rx.clear();
                Ok(0)
            }
            Err(e) => {
                self.rx.clear();
                tracing::warn!(error = %e, "failed to receive UDP packet");
                Err(e.into())
            }
        }
    }

    /// Unread bytes left in the current packet.
    pub fn available(&self) -> usize {
        self.rx.len().saturating_sub(self.read_pos)
    }

    /// Read one byte of the current packet.
    pub fn read_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.read_pos += 1;
        Some(byte)
    }

    /// Copy up to `buf.len()` unread bytes into `buf`, returning the count.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        let unread = &self.rx[self.read_pos.min(self.rx.len())..];
        let n = unread.len().min(buf.len());
        buf[..n].copy_from_slice(&unread[..n]);
        self.read_pos += n;
        n
    }

    /// Next unread byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.rx.get(self.read_pos).copied()
    }

    /// Discard the unread remainder of the current packet.
    ///
    /// This is the `WiFiUDP::flush` receive-side semantics; the
    /// [`io::Write`] implementation's `flush` is a no-op.
    pub fn flush(&mut self) {
        self.read_pos = self.rx.len();
    }

    /// Address of the last sender, or of the destination set by
    /// `begin_packet`. Unspecified if neither happened.
    pub fn remote_ip(&self) -> Ipv4Addr {
        self.remote.map_or(Ipv4Addr::UNSPECIFIED, |a| *a.ip())
    }

    /// Port of the last sender or destination, 0 if none.
    pub fn remote_port(&self) -> u16 {
        self.remote.map_or(0, |a| a.port())
    }

    /// Whether `begin` or `begin_multicast` succeeded and `stop` has not
    /// been called since.
    pub fn connected(&self) -> bool {
        self.listening && self.socket.is_some()
    }

    /// Set the receive timeout in milliseconds.
    ///
    /// A non-zero timeout makes `parse_packet` wait up to that long; 0
    /// restores non-blocking receive. Applies to the open socket and to
    /// sockets opened later.
    pub fn set_timeout(&mut self, timeout_ms: u64) -> Result<()> {
        self.timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));
        if let Some(ref socket) = self.socket {
            apply_timeout(socket, self.timeout)?;
        }
        Ok(())
    }

    /// Bound local port, 0 when closed.
    pub fn local_port(&self) -> u16 {
        self.socket.as_ref().map_or(0, local_port_of)
    }

    /// Local IPv4 address used for outbound traffic.
    ///
    /// Unspecified when the socket is closed or no non-loopback route
    /// exists.
    pub fn local_ip(&self) -> Ipv4Addr {
        let Some(ref socket) = self.socket else {
            return Ipv4Addr::UNSPECIFIED;
        };
        if let Ok(SocketAddr::V4(addr)) = socket.local_addr() {
            if !addr.ip().is_unspecified() {
                return *addr.ip();
            }
        }
        outbound_ip().unwrap_or(Ipv4Addr::UNSPECIFIED)
    }

    fn open(&mut self, local: SocketAddrV4) -> Result<UdpSocket> {
        // Replacing the socket closes the previous one
        self.socket = None;
        self.listening = false;

        let raw = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        raw.set_reuse_address(true)?;
        if let Err(e) = raw.bind(&SocketAddr::V4(local).into()) {
            tracing::warn!(%local, error = %e, "failed to bind UDP socket");
            return Err(e.into());
        }

        let socket: UdpSocket = raw.into();
        apply_timeout(&socket, self.timeout)?;
        Ok(socket)
    }

    fn reserve_tx(&mut self, additional: usize) {
        if self.tx.capacity() == 0 {
            self.tx.reserve(DEFAULT_BUFFER_SIZE.max(additional));
        }
    }
}

impl io::Read for WifiUdp {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_bytes(buf))
    }
}

impl io::Write for WifiUdp {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_bytes(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn apply_timeout(socket: &UdpSocket, timeout: Option<Duration>) -> io::Result<()> {
    match timeout {
        Some(t) => {
            socket.set_nonblocking(false)?;
            socket.set_read_timeout(Some(t))
        }
        None => {
            socket.set_read_timeout(None)?;
            socket.set_nonblocking(true)
        }
    }
}

fn local_port_of(socket: &UdpSocket) -> u16 {
    socket.local_addr().map_or(0, |a| a.port())
}

fn outbound_ip() -> io::Result<Ipv4Addr> {
    let probe = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))?;
    probe.connect(ROUTE_PROBE)?;
    match probe.local_addr()? {
        SocketAddr::V4(addr) if !addr.ip().is_loopback() => Ok(*addr.ip()),
        _ => Ok(Ipv4Addr::UNSPECIFIED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Read, Write};

    fn with_rx(data: &[u8]) -> WifiUdp {
        WifiUdp {
            rx: data.to_vec(),
            ..WifiUdp::default()
        }
    }

    #[test]
    fn test_new_is_closed() {
        let udp = WifiUdp::new();
        assert!(!udp.connected());
        assert_eq!(udp.local_port(), 0);
        assert_eq!(udp.local_ip(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(udp.remote_ip(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(udp.remote_port(), 0);
        assert_eq!(udp.available(), 0);
    }

    #[test]
    fn test_parse_packet_without_socket_returns_zero() {
        let mut udp = WifiUdp::new();
        assert_eq!(udp.parse_packet().unwrap(), 0);
    }

    #[test]
    fn test_end_packet_without_socket() {
        let mut udp = WifiUdp::new();
        udp.write_str("hello");
        assert!(matches!(udp.end_packet(), Err(UdpError::NotStarted)));
    }

    #[test]
    fn test_write_staging() {
        let mut udp = WifiUdp::new();
        assert_eq!(udp.write_byte(b'a'), 1);
        assert_eq!(udp.write_bytes(b"bc"), 2);
        assert_eq!(udp.write_str("de"), 2);
        write!(udp, "{}", 7).unwrap();
        assert_eq!(udp.pending(), b"abcde7");
        assert!(udp.tx.capacity() >= DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_write_grows_past_default() {
        let mut udp = WifiUdp::new();
        let big = vec![0x55; DEFAULT_BUFFER_SIZE * 3];
        assert_eq!(udp.write_bytes(&big), big.len());
        assert_eq!(udp.pending().len(), big.len());
    }

    #[test]
    fn test_read_peek_available() {
        let mut udp = with_rx(b"xyz");
        assert_eq!(udp.available(), 3);
        assert_eq!(udp.peek(), Some(b'x'));
        assert_eq!(udp.read_byte(), Some(b'x'));
        assert_eq!(udp.available(), 2);

        let mut buf = [0u8; 8];
        assert_eq!(udp.read_bytes(&mut buf), 2);
        assert_eq!(&buf[..2], b"yz");
        assert_eq!(udp.read_byte(), None);
        assert_eq!(udp.peek(), None);
        assert_eq!(udp.read_bytes(&mut buf), 0);
    }

    #[test]
    fn test_read_bytes_partial() {
        let mut udp = with_rx(b"abcdef");
        let mut buf = [0u8; 4];
        assert_eq!(udp.read_bytes(&mut buf), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(udp.available(), 2);
    }

    #[test]
    fn test_flush_discards_unread() {
        let mut udp = with_rx(b"abc");
        udp.read_byte();
        udp.flush();
        assert_eq!(udp.available(), 0);
        assert_eq!(udp.read_byte(), None);
    }

    #[test]
    fn test_io_read() {
        let mut udp = with_rx(b"stream");
        let mut out = String::new();
        udp.read_to_string(&mut out).unwrap();
        assert_eq!(out, "stream");
    }

    #[test]
    fn test_begin_packet_rejects_bad_address() {
        let mut udp = WifiUdp::new();
        let err = udp.begin_packet("300.1.1.1", 9).unwrap_err();
        assert!(matches!(err, UdpError::InvalidAddress { ref address, .. } if address == "300.1.1.1"));
    }

    #[test]
    fn test_begin_packet_u32_is_host_order() {
        let mut udp = WifiUdp::new();
        udp.begin_packet_u32(0x7F00_0001, 4210).unwrap();
        assert_eq!(udp.remote_ip(), Ipv4Addr::LOCALHOST);
        assert_eq!(udp.remote_port(), 4210);
        // ephemeral sender socket, not a listener
        assert!(!udp.connected());
        assert_ne!(udp.local_port(), 0);
    }

    #[test]
    fn test_begin_multicast_rejects_unicast_group() {
        let mut udp = WifiUdp::new();
        let err = udp
            .begin_multicast(0, Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::UNSPECIFIED)
            .unwrap_err();
        assert!(matches!(err, UdpError::InvalidAddress { .. }));
        assert!(!udp.connected());
    }

    #[test]
    fn test_stop_clears_everything() {
        let mut udp = WifiUdp::new();
        udp.begin(0).unwrap();
        assert!(udp.connected());
        udp.write_str("staged");

        udp.stop();
        assert!(!udp.connected());
        assert_eq!(udp.local_port(), 0);
        assert!(udp.pending().is_empty());
        assert_eq!(udp.available(), 0);
    }
}
