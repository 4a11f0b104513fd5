use super::network::CRLF;
use crate::cache::cache::ValueRecord;
use crate::cache::error::{CacheError, ErrorKind};
use crate::memcache::response::Response;
use bytes::{BufMut, Bytes, BytesMut};

pub struct ResponseMessage {
    pub(crate) data: Bytes,
}

pub struct MemcacheTextEncoder {}

impl Default for MemcacheTextEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MemcacheTextEncoder {
    const VALUE_HEADER_RESERVE: usize = 32;

    pub fn new() -> MemcacheTextEncoder {
        MemcacheTextEncoder {}
    }

    pub fn get_length(&self, msg: &Response) -> usize {
        match msg {
            Response::Get(Ok(values)) => {
                values
                    .iter()
                    .map(|value| {
                        MemcacheTextEncoder::VALUE_HEADER_RESERVE + value.key.len() + value.data.len()
                    })
                    .sum::<usize>()
                    + b"END\r\n".len()
            }
            Response::Get(Err(err))
            | Response::Set(Err(err))
            | Response::Delete(Err(err))
            | Response::Invalid(err) => err.message().len() + 16,
            Response::Set(Ok(())) | Response::Delete(Ok(())) => 16,
        }
    }

    /// Encodes a complete reply, a GET reply always ends with END
    pub fn encode_message(&self, msg: &Response) -> ResponseMessage {
        let mut dst = BytesMut::with_capacity(self.get_length(msg));
        match msg {
            Response::Get(Ok(values)) => {
                for value in values {
                    self.encode_value(value, &mut dst);
                }
                dst.put_slice(b"END\r\n");
            }
            Response::Set(Ok(())) => dst.put_slice(b"STORED\r\n"),
            Response::Delete(Ok(())) => dst.put_slice(b"DELETED\r\n"),
            Response::Get(Err(err))
            | Response::Set(Err(err))
            | Response::Delete(Err(err))
            | Response::Invalid(err) => self.encode_error(err, &mut dst),
        }
        ResponseMessage { data: dst.freeze() }
    }

    fn encode_value(&self, value: &ValueRecord, dst: &mut BytesMut) {
        dst.put_slice(b"VALUE ");
        dst.put_slice(&value.key);
        dst.put_slice(format!(" {} {}", value.flags, value.bytes).as_bytes());
        dst.put_slice(CRLF);
        dst.put_slice(&value.data);
        dst.put_slice(CRLF);
    }

    fn encode_error(&self, err: &CacheError, dst: &mut BytesMut) {
        match err.kind() {
            ErrorKind::InvalidKey | ErrorKind::MissingParameter | ErrorKind::MalformedCommand => {
                dst.put_slice(b"CLIENT_ERROR ");
                dst.put_slice(err.message().as_bytes());
                dst.put_slice(CRLF);
            }
            ErrorKind::NotFound => dst.put_slice(b"NOT_FOUND\r\n"),
            ErrorKind::NotStored => dst.put_slice(b"NOT_STORED\r\n"),
            ErrorKind::UnknownCommand => dst.put_slice(b"ERROR\r\n"),
            ErrorKind::ValueTooLarge => {
                dst.put_slice(b"SERVER_ERROR object too large for cache\r\n")
            }
            ErrorKind::InternalError => {
                dst.put_slice(b"SERVER_ERROR ");
                dst.put_slice(err.message().as_bytes());
                dst.put_slice(CRLF);
            }
        }
    }
}
