#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use bzip2::write::BzEncoder;
use bzip2::Compression;
use rsourcequery::packet::COMPRESSED_FLAG;
use rsourcequery::{Client, ClientConfig, SourceQueryError, Transport};

/// Plays back canned datagrams and records what was sent.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pub sent: Vec<Vec<u8>>,
    pub replies: VecDeque<Vec<u8>>,
    pub fail_send: bool,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Vec<u8>>) -> Self {
        ScriptedTransport { replies: replies.into(), ..Default::default() }
    }
}

impl Transport for ScriptedTransport {
    async fn send(&mut self, data: &[u8]) -> Result<(), SourceQueryError> {
        if self.fail_send {
            return Err(SourceQueryError::SendError(io::ErrorKind::ConnectionRefused.into()));
        }
        self.sent.push(data.to_vec());
        Ok(())
    }

    async fn receive(&mut self) -> Result<Vec<u8>, SourceQueryError> {
        self.replies
            .pop_front()
            .ok_or_else(|| SourceQueryError::ReceiveError(io::ErrorKind::TimedOut.into()))
    }
}

pub fn client(replies: Vec<Vec<u8>>) -> Client<ScriptedTransport> {
    Client::new(ScriptedTransport::new(replies), ClientConfig::default())
}

pub fn legacy_client(replies: Vec<Vec<u8>>) -> Client<ScriptedTransport> {
    let config = ClientConfig::default().with_pre_orange_box(true);
    Client::new(ScriptedTransport::new(replies), config)
}

/// A single packet reply: header, tag, body.
pub fn single(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_i32::<LittleEndian>(-1).unwrap();
    out.write_u8(tag).unwrap();
    out.extend_from_slice(body);
    out
}

pub fn fragment(
    id: u32,
    total: u8,
    number: u8,
    split_size: Option<u16>,
    payload: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_i32::<LittleEndian>(-2).unwrap();
    out.write_u32::<LittleEndian>(id).unwrap();
    out.write_u8(total).unwrap();
    out.write_u8(number).unwrap();
    if let Some(size) = split_size {
        out.write_u16::<LittleEndian>(size).unwrap();
    }
    out.extend_from_slice(payload);
    out
}

/// Cut `payload` into `total` fragments in index order.
pub fn split(payload: &[u8], total: u8, id: u32, split_size: Option<u16>) -> Vec<Vec<u8>> {
    let chunk = payload.len().div_ceil(total as usize).max(1);
    (0..total)
        .map(|number| {
            let start = (number as usize * chunk).min(payload.len());
            let end = (start + chunk).min(payload.len());
            fragment(id, total, number, split_size, &payload[start..end])
        })
        .collect()
}

/// Size, CRC32, then the bzip2 stream of `data`.
pub fn compressed(data: &[u8]) -> Vec<u8> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    let stream = encoder.finish().unwrap();

    let mut out = Vec::new();
    out.write_u32::<LittleEndian>(data.len() as u32).unwrap();
    out.write_u32::<LittleEndian>(crc32fast::hash(data)).unwrap();
    out.extend_from_slice(&stream);
    out
}

pub fn compressed_id(id: u32) -> u32 {
    id | COMPRESSED_FLAG
}
