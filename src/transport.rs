use std::time::Duration;

use log::trace;
use tokio::net::{ToSocketAddrs, UdpSocket};
use tokio::time::timeout;

use crate::error::SourceQueryError;

/// Datagram transport underneath a [crate::client::Client].
///
/// `receive` yields exactly one whole datagram. An empty datagram is a valid
/// result and must not be turned into an error here.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&mut self, data: &[u8]) -> Result<(), SourceQueryError>;

    async fn receive(&mut self) -> Result<Vec<u8>, SourceQueryError>;
}

/// A connected UDP socket with a timeout on every operation.
#[derive(Debug)]
pub struct UdpTransport {
    sock: UdpSocket,
    timeout_dur: Duration,
    max_packet_size: usize,
}

impl UdpTransport {
    pub async fn connect<A: ToSocketAddrs>(
        host: A,
        timeout_dur: Duration,
        max_packet_size: usize,
    ) -> Result<Self, SourceQueryError> {
        // just arbitrarily bind any port, doesn't matter really
        let sock: UdpSocket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(SourceQueryError::FailedPortBind)?;

        timeout(timeout_dur, sock.connect(host))
            .await?
            .map_err(SourceQueryError::UnreachableHost)?;

        Ok(UdpTransport { sock, timeout_dur, max_packet_size })
    }
}

impl Transport for UdpTransport {
    async fn send(&mut self, data: &[u8]) -> Result<(), SourceQueryError> {
        timeout(self.timeout_dur, self.sock.send(data))
            .await?
            .map_err(SourceQueryError::SendError)?;
        trace!("sent {} bytes", data.len());
        Ok(())
    }

    async fn receive(&mut self) -> Result<Vec<u8>, SourceQueryError> {
        let mut buf = vec![0u8; self.max_packet_size];
        let len = timeout(self.timeout_dur, self.sock.recv(&mut buf))
            .await?
            .map_err(SourceQueryError::ReceiveError)?;
        if len == buf.len() {
            trace!("datagram filled the {len} byte buffer and may have been truncated");
        }
        buf.truncate(len);
        trace!("received {len} bytes");
        Ok(buf)
    }
}
