use std::io;

use thiserror::Error;

/// Everything that can go wrong while querying a server.
///
/// None of these are retried internally; a failed negotiation is over.
#[derive(Debug, Error)]
pub enum SourceQueryError {
    #[error("failed to bind local port: {0}")]
    FailedPortBind(#[source] io::Error),

    #[error("host is unreachable: {0}")]
    UnreachableHost(#[source] io::Error),

    #[error("failed to send request: {0}")]
    SendError(#[source] io::Error),

    #[error("failed to receive data: {0}")]
    ReceiveError(#[source] io::Error),

    #[error("operation timed out")]
    Timeout(#[from] tokio::time::error::Elapsed),

    /// The peer answered with a zero-length datagram.
    #[error("no data received from server, possibly offline or unresponsive")]
    EmptyResponse,

    #[error("buffer too short: needed {needed} bytes, {remaining} remaining")]
    ShortBuffer { needed: usize, remaining: usize },

    #[error("unknown packet header: {0}")]
    UnknownPacketHeader(i32),

    #[error("fragment {number} out of bounds for a response of {total} fragments")]
    FragmentOutOfBounds { number: u8, total: u8 },

    /// A fragment disagrees with the first one on a response-wide field.
    #[error("fragment {number} disagrees with the response on {field}")]
    InconsistentFragment { number: u8, field: &'static str },

    #[error("received fragment {0} twice")]
    DuplicateFragment(u8),

    #[error("bad bz2 decompression size: expected {expected}, got {actual}")]
    DecompressionSizeMismatch { expected: u32, actual: usize },

    #[error("failed to decompress payload: {0}")]
    Decompress(#[source] io::Error),

    #[error("bz2 decompressed checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("bad challenge response: unexpected tag {0:#04x}")]
    BadChallengeResponse(u8),

    #[error("server issued {0} challenges without answering")]
    ChallengeLoop(u8),

    #[error("invalid string in response: {0}")]
    InvalidString(#[from] std::str::Utf8Error),
}
