use crate::error::SourceQueryError;

/// S2C_CHALLENGE -- https://developer.valvesoftware.com/wiki/Server_queries#Request_Format
///
/// The server may reply to any request with a challenge ('A' or 0x41).
/// In that case, the client should repeat the request by appending the challenge number.
pub const S2C_CHALLENGE: u8 = 0x41;

/// A2S_INFO Request -- https://developer.valvesoftware.com/wiki/Server_queries#A2S_INFO
pub const A2S_INFO_REQUEST: u8 = 0x54;

/// A2S_INFO Response, parsed by [crate::info::ServerInfo::parse].
pub const A2S_INFO_RESPONSE: u8 = 0x49;

/// Set on the id of every fragment of a bzip2 compressed split response.
pub const COMPRESSED_FLAG: u32 = 0x8000_0000;

/// According to the Valve wiki, Source query responses use 1400 bytes + IP/UDP headers.
pub const MAX_PACKET_SIZE: usize = 1400;

/// The leading `i32` of every packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketHeader {
    Single,
    Split,
}

impl TryFrom<i32> for PacketHeader {
    type Error = SourceQueryError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(PacketHeader::Single),
            -2 => Ok(PacketHeader::Split),
            n => Err(SourceQueryError::UnknownPacketHeader(n)),
        }
    }
}

impl PacketHeader {
    pub fn to_le_bytes(self) -> [u8; 4] {
        let value: i32 = match self {
            PacketHeader::Single => -1,
            PacketHeader::Split => -2,
        };
        value.to_le_bytes()
    }
}

/// A request to send to a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPacket {
    tag: u8,
    body: Option<&'static str>,
    challenge: Option<[u8; 4]>,
}

impl RequestPacket {
    pub fn new(tag: u8, body: Option<&'static str>, challenge: Option<[u8; 4]>) -> Self {
        RequestPacket { tag, body, challenge }
    }

    /// A2S_INFO, optionally answering a challenge.
    pub fn info(challenge: Option<[u8; 4]>) -> Self {
        Self::new(A2S_INFO_REQUEST, Some("Source Engine Query"), challenge)
    }

    /// The same request carrying `challenge`.
    pub fn with_challenge(&self, challenge: [u8; 4]) -> Self {
        RequestPacket { challenge: Some(challenge), ..self.clone() }
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// Serializes a request packet into an array of bytes.
    pub fn pack(&self) -> Vec<u8> {
        // header, tag, body, terminator (and challenge)
        let mut payload: Vec<u8> = Vec::with_capacity(32);
        payload.extend_from_slice(&PacketHeader::Single.to_le_bytes());
        payload.push(self.tag);
        if let Some(body) = self.body {
            payload.extend_from_slice(body.as_bytes());
            payload.push(0);
        }
        if let Some(c) = &self.challenge {
            payload.extend_from_slice(c);
        }

        payload
    }
}
