use std::io::{ErrorKind, Read};

use bzip2::read::BzDecoder;
use log::{debug, trace, warn};

use crate::client::Client;
use crate::error::SourceQueryError;
use crate::packet::{PacketHeader, COMPRESSED_FLAG};
use crate::reader::PacketReader;
use crate::transport::Transport;

/// Header of one fragment of a split response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Response id. The most significant bit is the compression flag.
    pub id: u32,
    /// Fragments in the whole response.
    pub total: u8,
    /// Index of this fragment, starting at 0.
    pub number: u8,
    /// Maximum packet size before the server splits. Absent before the Orange Box.
    pub split_size: Option<u16>,
    /// Offset of the payload within the datagram.
    pub header_len: usize,
}

impl Fragment {
    /// Parse the header at the start of `data`.
    pub fn parse(data: &[u8], pre_orange_box: bool) -> Result<Self, SourceQueryError> {
        let mut reader = PacketReader::new(data);

        match PacketHeader::try_from(reader.read_i32()?)? {
            PacketHeader::Split => {}
            PacketHeader::Single => return Err(SourceQueryError::UnknownPacketHeader(-1)),
        }

        let id = reader.read_u32()?;
        let total = reader.read_u8()?;
        let number = reader.read_u8()?;
        let split_size = if pre_orange_box {
            None
        } else {
            Some(reader.read_u16()?)
        };

        if number >= total {
            return Err(SourceQueryError::FragmentOutOfBounds { number, total });
        }

        Ok(Fragment {
            id,
            total,
            number,
            split_size,
            header_len: reader.position(),
        })
    }

    pub fn is_compressed(&self) -> bool {
        self.id & COMPRESSED_FLAG != 0
    }
}

/// A received fragment, kept whole until the response is complete.
struct Slot {
    datagram: Vec<u8>,
    header_len: usize,
}

impl Slot {
    fn payload(&self) -> &[u8] {
        &self.datagram[self.header_len..]
    }
}

impl<T: Transport> Client<T> {
    /// Collect the rest of the split response that `first` belongs to.
    ///
    /// Fragments may arrive in any order; they are joined by index. A second
    /// fragment with an index already seen fails the whole response.
    pub async fn assemble(&mut self, first: Vec<u8>) -> Result<Vec<u8>, SourceQueryError> {
        let pre_orange_box = self.config.pre_orange_box;
        let head = Fragment::parse(&first, pre_orange_box)?;
        let compressed = head.is_compressed();
        debug!(
            "collecting {} fragments of response {:#010x} (compressed: {compressed})",
            head.total, head.id
        );

        let mut slots: Vec<Option<Slot>> = (0..head.total).map(|_| None).collect();
        slots[head.number as usize] = Some(Slot { datagram: first, header_len: head.header_len });

        for _ in 1..head.total {
            let datagram = self.transport.receive().await?;
            let fragment = Fragment::parse(&datagram, pre_orange_box)?;
            trace!("fragment {}/{} of {:#010x}", fragment.number, fragment.total, fragment.id);

            check_consistent(&head, &fragment)?;

            let slot = &mut slots[fragment.number as usize];
            if slot.is_some() {
                warn!("duplicate fragment {} of {:#010x}", fragment.number, fragment.id);
                return Err(SourceQueryError::DuplicateFragment(fragment.number));
            }
            *slot = Some(Slot { datagram, header_len: fragment.header_len });
        }

        // every index in 0..total is filled: total - 1 receives, none duplicated
        let filled: Vec<&Slot> = slots.iter().flatten().collect();
        let size: usize = filled.iter().map(|slot| slot.payload().len()).sum();
        let mut payload = Vec::with_capacity(size);
        for slot in filled {
            payload.extend_from_slice(slot.payload());
        }

        if compressed {
            return decompress(&payload);
        }
        Ok(payload)
    }
}

fn check_consistent(head: &Fragment, fragment: &Fragment) -> Result<(), SourceQueryError> {
    let field = if fragment.is_compressed() != head.is_compressed() {
        "compression"
    } else if fragment.id != head.id {
        "id"
    } else if fragment.total != head.total {
        "total"
    } else {
        return Ok(());
    };
    warn!("fragment {} of {:#010x} disagrees on {field}", fragment.number, head.id);
    Err(SourceQueryError::InconsistentFragment { number: fragment.number, field })
}

/// Unpack a bzip2 compressed response: decompressed size, CRC32, then the stream.
pub fn decompress(payload: &[u8]) -> Result<Vec<u8>, SourceQueryError> {
    let mut reader = PacketReader::new(payload);
    let expected_size = reader.read_u32()?;
    let expected_crc = reader.read_u32()?;

    // the claimed size is untrusted, so don't preallocate all of it
    let mut decompressed = Vec::with_capacity((expected_size as usize).min(1 << 20));
    let decoded = BzDecoder::new(reader.rest())
        .take(u64::from(expected_size))
        .read_to_end(&mut decompressed);
    match decoded {
        // a stream cut short decodes fine up to where it ends
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {}
        Err(e) => return Err(SourceQueryError::Decompress(e)),
        Ok(_) => {}
    }

    if decompressed.len() != expected_size as usize {
        return Err(SourceQueryError::DecompressionSizeMismatch {
            expected: expected_size,
            actual: decompressed.len(),
        });
    }

    let actual_crc = crc32fast::hash(&decompressed);
    if actual_crc != expected_crc {
        warn!("checksum mismatch: expected {expected_crc:#010x}, got {actual_crc:#010x}");
        return Err(SourceQueryError::ChecksumMismatch {
            expected: expected_crc,
            actual: actual_crc,
        });
    }

    Ok(decompressed)
}
