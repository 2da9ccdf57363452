use std::{
    io,
    net::{Ipv4Addr, SocketAddr, ToSocketAddrs as _, UdpSocket},
    time::Duration,
};

#[cfg(target_os = "linux")]
use std::{os::unix::net::UnixDatagram, path::PathBuf};

use tracing::debug;

/// A parsed remote agent address.
#[derive(Clone)]
pub(crate) enum RemoteAddr {
    Udp(Vec<SocketAddr>),

    #[cfg(target_os = "linux")]
    Unixgram(PathBuf),
}

impl RemoteAddr {
    /// Returns the transport ID for the remote address.
    ///
    /// This is a simple acronym related to the transport that will be used for the remote
    /// address, such as `udp` for UDP, and so on.
    pub const fn transport_id(&self) -> &'static str {
        match self {
            RemoteAddr::Udp(_) => "udp",
            #[cfg(target_os = "linux")]
            RemoteAddr::Unixgram(_) => "uds",
        }
    }
}

impl<'a> TryFrom<&'a str> for RemoteAddr {
    type Error = String;

    fn try_from(addr: &'a str) -> Result<Self, Self::Error> {
        #[cfg(target_os = "linux")]
        if let Some((scheme, path)) = addr.split_once("://") {
            return match scheme {
                "unixgram" => Ok(RemoteAddr::Unixgram(PathBuf::from(path))),
                _ => Err(format!("invalid scheme '{scheme}' (expected 'unixgram')")),
            };
        }

        match addr.to_socket_addrs() {
            Ok(addrs) => Ok(RemoteAddr::Udp(addrs.collect())),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// A connected datagram socket to the remote agent.
pub(crate) enum Transport {
    Udp(UdpSocket),

    #[cfg(target_os = "linux")]
    Unixgram(UnixDatagram),
}

impl Transport {
    /// Opens a datagram socket and associates it with the remote peer.
    ///
    /// No handshake takes place and nothing is retried; the only I/O performed here is binding
    /// the local socket. The write timeout, if any, is applied to the socket itself.
    pub fn connect(
        remote_addr: &RemoteAddr,
        write_timeout: Option<Duration>,
    ) -> io::Result<Self> {
        let transport = match remote_addr {
            RemoteAddr::Udp(addrs) => {
                let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
                socket.connect(&addrs[..])?;
                socket.set_write_timeout(write_timeout)?;
                Transport::Udp(socket)
            }

            #[cfg(target_os = "linux")]
            RemoteAddr::Unixgram(path) => {
                let socket = UnixDatagram::unbound()?;
                socket.connect(path)?;
                socket.set_write_timeout(write_timeout)?;
                Transport::Unixgram(socket)
            }
        };

        debug!(transport = remote_addr.transport_id(), "Connected to remote agent.");

        Ok(transport)
    }

    /// Sends one payload as a single datagram.
    ///
    /// Errors are returned verbatim; there is no retry and no partial-write repair.
    pub fn send(&self, buf: &[u8]) -> io::Result<()> {
        match self {
            Transport::Udp(socket) => socket.send(buf).map(|_| ()),

            #[cfg(target_os = "linux")]
            Transport::Unixgram(socket) => socket.send(buf).map(|_| ()),
        }
    }
}
