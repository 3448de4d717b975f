use std::time::Duration;

use log::debug;
use tokio::net::ToSocketAddrs;

use crate::challenge::Negotiated;
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::SourceQueryError;
use crate::packet::{RequestPacket, A2S_INFO_RESPONSE};
use crate::reader::PacketReader;
use crate::transport::Transport;

/// Server information as obtained by [query].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    /// A2S_INFO protocol version
    pub protocol: u8,
    /// Server hostname
    pub hostname: String,
    /// Current map
    pub map: String,
    /// Location of server files
    pub folder: String,
    /// Name of game
    pub game: String,
    /// Steam ID of game
    pub game_id: u16,
    /// Current players
    pub players: u8,
    /// Max players
    pub maxplayers: u8,
    /// Current bots
    pub bots: u8,
    /// Server type:
    /// - `d`: Dedicated
    /// - `l`: Listen (non-dedicated)
    /// - `p`: SourceTV relay (proxy)
    pub server_type: char,
    /// Server environment:
    /// - `l`: Linux
    /// - `w`: Windows
    /// - `m` or `o`: Mac
    pub server_env: char,
    /// Is the server password protected?
    pub password_protected: bool,
    /// Is the server VAC enabled?
    pub vac_enabled: bool,
    /// Game version
    pub version: String,
    // TODO: parse the extra data flag fields (port, SteamID, SourceTV, keywords, GameID)
}

impl ServerInfo {
    /// Parse a final A2S_INFO payload, header included, into its [ServerInfo].
    pub fn parse(payload: &[u8]) -> Result<ServerInfo, SourceQueryError> {
        let mut reader = PacketReader::new(payload);
        // packet header and response tag were checked during negotiation
        reader.read_bytes(5)?;

        Ok(ServerInfo {
            protocol: reader.read_u8()?,
            hostname: reader.read_string()?,
            map: reader.read_string()?,
            folder: reader.read_string()?,
            game: reader.read_string()?,
            game_id: reader.read_u16()?,
            players: reader.read_u8()?,
            maxplayers: reader.read_u8()?,
            bots: reader.read_u8()?,
            server_type: char::from(reader.read_u8()?),
            server_env: char::from(reader.read_u8()?),
            password_protected: reader.read_u8()? == 1,
            vac_enabled: reader.read_u8()? == 1,
            version: reader.read_string()?,
        })
    }
}

impl<T: Transport> Client<T> {
    /// Run A2S_INFO to completion, answering up to
    /// [ClientConfig::max_challenge_rounds] challenges on the way.
    pub async fn info(&mut self) -> Result<ServerInfo, SourceQueryError> {
        let mut request = RequestPacket::info(None);
        let mut rounds: u8 = 0;

        loop {
            match self.negotiate(&request, A2S_INFO_RESPONSE).await? {
                Negotiated::Final(payload) => return ServerInfo::parse(&payload),
                Negotiated::Challenge(token) => {
                    if rounds >= self.config.max_challenge_rounds {
                        return Err(SourceQueryError::ChallengeLoop(rounds.saturating_add(1)));
                    }
                    rounds += 1;
                    debug!("answering challenge {rounds}");
                    request = request.with_challenge(token);
                }
            }
        }
    }
}

/// Query `host` with the Source Query Protocol A2S_INFO query.
///
/// If `timeout_dur` is `Some(Duration)`, each `timeout()` will use `timeout_dur`.
/// The default is 5 seconds if `timeout_dur` is `None`.
///
/// Note that this timeout duration can occur 3 times (5 if challenged):
/// - On socket connect
/// - On packet send
/// - On packet receive
/// - Twice more on another send and receive, if challenged
///
/// Example usage:
/// ```no_run
/// # async fn run() -> Result<(), rsourcequery::error::SourceQueryError> {
/// use rsourcequery::info::{query, ServerInfo};
///
/// let host: &str = "nyc-1.us.uncletopia.com:27015"; // Uncletopia New York City 4
/// let info: ServerInfo = query(host, None).await?;
/// # Ok(())
/// # }
/// ```
pub async fn query<A: ToSocketAddrs>(
    host: A,
    timeout_dur: Option<Duration>,
) -> Result<ServerInfo, SourceQueryError> {
    let config = ClientConfig::default().with_timeout(timeout_dur);
    let mut client = Client::connect(host, config).await?;
    client.info().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info_payload() -> Vec<u8> {
        let mut data = vec![0xFF, 0xFF, 0xFF, 0xFF, A2S_INFO_RESPONSE, 17];
        data.extend_from_slice(b"Uncletopia | New York City 4\0ctf_2fort\0tf\0Team Fortress\0");
        data.extend_from_slice(&440u16.to_le_bytes());
        data.extend_from_slice(&[23, 24, 0, b'd', b'l', 0, 1]);
        data.extend_from_slice(b"8622567\0");
        data
    }

    #[test]
    fn parses_info_response() {
        let info = ServerInfo::parse(&info_payload()).unwrap();

        assert_eq!(info.protocol, 17);
        assert_eq!(info.hostname, "Uncletopia | New York City 4");
        assert_eq!(info.map, "ctf_2fort");
        assert_eq!(info.folder, "tf");
        assert_eq!(info.game, "Team Fortress");
        assert_eq!(info.game_id, 440);
        assert_eq!(info.players, 23);
        assert_eq!(info.maxplayers, 24);
        assert_eq!(info.bots, 0);
        assert_eq!(info.server_type, 'd');
        assert_eq!(info.server_env, 'l');
        assert!(!info.password_protected);
        assert!(info.vac_enabled);
        assert_eq!(info.version, "8622567");
    }

    #[test]
    fn truncated_info_is_short() {
        let payload = info_payload();
        let truncated = &payload[..payload.len() - 12];

        assert!(matches!(ServerInfo::parse(truncated), Err(SourceQueryError::ShortBuffer { .. })));
    }

    #[test]
    fn invalid_utf8_hostname() {
        let mut payload = info_payload();
        payload[6] = 0xC3;
        payload[7] = 0x28;

        assert!(matches!(ServerInfo::parse(&payload), Err(SourceQueryError::InvalidString(_))));
    }
}
