use crate::cache::key_validator;
use crate::memcache::response::Response;
use crate::memcache::store;
use crate::protocol::text::decoder::TextRequest;
use crate::protocol::text::network;
use std::sync::Arc;

/// Turns decoded text requests into store calls.
///
/// Keeps no state between requests, everything shared lives in the store.
pub struct TextHandler {
    storage: Arc<store::MemcStore>,
    max_key_size: usize,
}

impl TextHandler {
    pub fn new(store: Arc<store::MemcStore>, max_key_size: usize) -> TextHandler {
        TextHandler {
            storage: store,
            max_key_size,
        }
    }

    pub fn handle_request(&self, req: TextRequest) -> Response {
        match req {
            TextRequest::Set(set_request) => self.set(set_request),
            TextRequest::Get(get_request) => self.get(get_request),
            TextRequest::Delete(delete_request) => self.delete(delete_request),
            TextRequest::Invalid(err) => Response::Invalid(err),
        }
    }

    fn set(&self, request: network::SetRequest) -> Response {
        if let Err(err) = key_validator::validate_key(&request.key, self.max_key_size) {
            return Response::Set(Err(err));
        }
        let record = store::Record::new(request.value, request.flags, request.exptime);
        self.storage.set(request.key, record)
    }

    fn get(&self, request: network::GetRequest) -> Response {
        if let Err(err) = key_validator::validate_keys(&request.keys, self.max_key_size) {
            return Response::Get(Err(err));
        }
        self.storage.get(&request.keys)
    }

    fn delete(&self, request: network::DeleteRequest) -> Response {
        if let Err(err) = key_validator::validate_key(&request.key, self.max_key_size) {
            return Response::Delete(Err(err));
        }
        self.storage.delete(request.key)
    }
}
