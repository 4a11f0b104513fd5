use bytes::Bytes;

pub const CRLF: &[u8] = b"\r\n";

/// Longest command line accepted, terminator excluded
pub const MAX_LINE_LENGTH: usize = 2048;

#[derive(Debug, Clone, PartialEq)]
pub struct SetRequest {
    pub key: Bytes,
    pub flags: u32,
    pub exptime: i64,
    pub value: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetRequest {
    pub keys: Vec<Bytes>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRequest {
    pub key: Bytes,
}

/// Command line of a SET whose data block was not read yet
#[derive(Debug, Clone, PartialEq)]
pub struct SetHeader {
    pub key: Bytes,
    pub flags: u32,
    pub exptime: i64,
    pub bytes: usize,
}

impl SetHeader {
    pub fn into_request(self, value: Bytes) -> SetRequest {
        SetRequest {
            key: self.key,
            flags: self.flags,
            exptime: self.exptime,
            value,
        }
    }
}
