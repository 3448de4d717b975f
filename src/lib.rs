//! Pure Rust async implementation of the Source Query Protocol, including challenge
//! negotiation and split, bzip2 compressed responses.
//!
//! <https://developer.valvesoftware.com/wiki/Server_queries>
pub mod challenge;
pub mod client;
pub mod config;
pub mod error;
pub mod info;
pub mod multi;
pub mod packet;
pub mod reader;
pub mod transport;

pub use challenge::Negotiated;
pub use client::Client;
pub use config::ClientConfig;
pub use error::SourceQueryError;
pub use info::{query, ServerInfo};
pub use transport::{Transport, UdpTransport};
