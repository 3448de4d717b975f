use log::debug;

use crate::client::Client;
use crate::error::SourceQueryError;
use crate::packet::{PacketHeader, RequestPacket, S2C_CHALLENGE};
use crate::reader::PacketReader;
use crate::transport::Transport;

/// Outcome of one request/response round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Negotiated {
    /// The server wants the request repeated with this token appended.
    Challenge([u8; 4]),
    /// The answer. For a single packet this is the whole datagram, header included.
    Final(Vec<u8>),
}

impl Negotiated {
    pub fn is_final(&self) -> bool {
        matches!(self, Negotiated::Final(_))
    }
}

impl<T: Transport> Client<T> {
    /// Send `request` once and classify the reply.
    ///
    /// `final_tag` is the response tag of the request kind, e.g.
    /// [crate::packet::A2S_INFO_RESPONSE]. A split reply is always final.
    ///
    /// Nothing is retried here; answering a challenge is up to the caller.
    pub async fn negotiate(
        &mut self,
        request: &RequestPacket,
        final_tag: u8,
    ) -> Result<Negotiated, SourceQueryError> {
        self.transport.send(&request.pack()).await?;
        debug!("sent request {:#04x}", request.tag());

        let data = self.transport.receive().await?;
        if data.is_empty() {
            return Err(SourceQueryError::EmptyResponse);
        }
        if data.len() < 4 {
            return Err(SourceQueryError::ShortBuffer { needed: 4, remaining: data.len() });
        }

        let mut reader = PacketReader::new(&data);
        match PacketHeader::try_from(reader.read_i32()?)? {
            PacketHeader::Split => {
                debug!("split response to {:#04x}", request.tag());
                return self.assemble(data).await.map(Negotiated::Final);
            }
            PacketHeader::Single => {}
        }

        let tag = reader.read_u8()?;
        if tag == S2C_CHALLENGE {
            let token = reader.read_array::<4>()?;
            debug!("challenged with {token:02x?}");
            Ok(Negotiated::Challenge(token))
        } else if tag == final_tag {
            debug!("final response of {} bytes", data.len());
            Ok(Negotiated::Final(data))
        } else {
            Err(SourceQueryError::BadChallengeResponse(tag))
        }
    }
}
