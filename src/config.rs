use std::time::Duration;

use crate::packet::MAX_PACKET_SIZE;

/// Settings for a [crate::client::Client].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Applied to connecting and to every single send and receive. Default 5 seconds.
    pub timeout: Duration,
    /// Servers on engines older than the Orange Box omit the split size
    /// from split packet headers. Known offenders are AppIDs 215, 17550, 17700,
    /// and 240 on protocol 7.
    pub pre_orange_box: bool,
    /// Receive buffer size for one datagram. Longer datagrams are truncated to this size.
    pub max_packet_size: usize,
    /// Challenges [crate::client::Client::info] will answer before giving up.
    pub max_challenge_rounds: u8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            timeout: Duration::from_secs(5),
            pre_orange_box: false,
            max_packet_size: MAX_PACKET_SIZE,
            max_challenge_rounds: 2,
        }
    }
}

impl ClientConfig {
    /// `None` keeps the default.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        if let Some(timeout) = timeout {
            self.timeout = timeout;
        }
        self
    }

    pub fn with_pre_orange_box(mut self, pre_orange_box: bool) -> Self {
        self.pre_orange_box = pre_orange_box;
        self
    }

    pub fn with_max_packet_size(mut self, max_packet_size: usize) -> Self {
        self.max_packet_size = max_packet_size;
        self
    }

    pub fn with_max_challenge_rounds(mut self, rounds: u8) -> Self {
        self.max_challenge_rounds = rounds;
        self
    }
}
