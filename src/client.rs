use tokio::net::ToSocketAddrs;

use crate::config::ClientConfig;
use crate::error::SourceQueryError;
use crate::transport::{Transport, UdpTransport};

/// A query client bound to one server.
///
/// Negotiation takes `&mut self`, so a client runs one handshake at a time.
/// Query several servers (or one server concurrently) with several clients.
#[derive(Debug)]
pub struct Client<T> {
    pub(crate) transport: T,
    pub(crate) config: ClientConfig,
}

impl Client<UdpTransport> {
    /// Bind a local UDP port and connect it to `host`.
    pub async fn connect<A: ToSocketAddrs>(
        host: A,
        config: ClientConfig,
    ) -> Result<Self, SourceQueryError> {
        let transport = UdpTransport::connect(host, config.timeout, config.max_packet_size).await?;
        Ok(Client::new(transport, config))
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Client { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}
