use crate::cache::key_validator::DEFAULT_MAX_KEY_SIZE;
use crate::memcache::response::Response;
use crate::memcache::store::MemcStore;
use crate::memcache_server::handler::TextHandler;
use crate::mock::mock_server::{create_cache_store, MockSystemTimer};
use crate::protocol::text::decoder::{MemcacheTextDecoder, TextRequest};
use crate::protocol::text::encoder::MemcacheTextEncoder;
use crate::protocol::text::network;
use bytes::{BufMut, Bytes, BytesMut};
use std::sync::Arc;
use tokio_util::codec::Decoder;

pub const ITEM_SIZE_LIMIT: u64 = 1024;

pub struct TextHandlerWithTimer {
    pub handler: TextHandler,
    pub timer: Arc<MockSystemTimer>,
}

impl TextHandlerWithTimer {
    pub fn handle_request(&self, req: TextRequest) -> Response {
        self.handler.handle_request(req)
    }

    /// Feeds raw wire bytes through decoder, handler and encoder,
    /// returning everything the server would write back.
    pub fn handle_bytes(&self, src: &[u8]) -> Bytes {
        let mut decoder = MemcacheTextDecoder::new(ITEM_SIZE_LIMIT);
        let encoder = MemcacheTextEncoder::new();
        let mut buffer = BytesMut::from(src);
        let mut output = BytesMut::new();
        while let Some(request) = decoder.decode(&mut buffer).unwrap() {
            let response = self.handle_request(request);
            output.put(encoder.encode_message(&response).data);
        }
        output.freeze()
    }
}

pub fn create_handler(capacity: usize) -> TextHandlerWithTimer {
    let (store, timer) = create_cache_store(capacity);
    TextHandlerWithTimer {
        handler: TextHandler::new(Arc::new(MemcStore::new(store)), DEFAULT_MAX_KEY_SIZE),
        timer,
    }
}

pub fn create_set_request(key: &str, value: &str, flags: u32, exptime: i64) -> TextRequest {
    TextRequest::Set(network::SetRequest {
        key: Bytes::copy_from_slice(key.as_bytes()),
        flags,
        exptime,
        value: Bytes::copy_from_slice(value.as_bytes()),
    })
}

pub fn create_get_request(keys: &[&str]) -> TextRequest {
    TextRequest::Get(network::GetRequest {
        keys: keys
            .iter()
            .map(|key| Bytes::copy_from_slice(key.as_bytes()))
            .collect(),
    })
}

pub fn create_delete_request(key: &str) -> TextRequest {
    TextRequest::Delete(network::DeleteRequest {
        key: Bytes::copy_from_slice(key.as_bytes()),
    })
}
