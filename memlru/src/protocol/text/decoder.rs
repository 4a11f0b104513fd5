use super::network::{self, DeleteRequest, GetRequest, SetHeader, SetRequest};
use crate::cache::error::CacheError;
use bytes::{Buf, Bytes, BytesMut};
use std::cmp;
use std::io;
use std::str::FromStr;
use tokio_util::codec::Decoder;

const BAD_COMMAND_LINE: &str = "bad command line format";
const BAD_DATA_CHUNK: &str = "bad data chunk";
const LINE_TOO_LONG: &str = "line too long";

/// Client request
#[derive(Debug, PartialEq)]
pub enum TextRequest {
    Set(SetRequest),
    Get(GetRequest),
    Delete(DeleteRequest),
    /// Request that can only be answered with an error
    Invalid(CacheError),
}

#[derive(Debug, PartialEq)]
enum RequestParserState {
    AwaitingLine,
    AwaitingData(SetHeader),
    /// Bytes of an oversized data block still to be thrown away
    DiscardingData(usize),
    /// Rest of an overlong command line still to be thrown away
    SkippingLine,
}

enum Decoded {
    Frame(TextRequest),
    Incomplete,
    Continue,
}

enum ParsedLine {
    Complete(TextRequest),
    NeedsData(SetHeader),
}

/// Incremental decoder of the memcached text protocol.
///
/// A SET is only produced once its data block and the trailing CRLF are
/// buffered, so a connection dropped mid frame yields nothing.
pub struct MemcacheTextDecoder {
    state: RequestParserState,
    item_size_limit: u64,
}

impl MemcacheTextDecoder {
    pub fn new(item_size_limit: u64) -> MemcacheTextDecoder {
        MemcacheTextDecoder {
            state: RequestParserState::AwaitingLine,
            item_size_limit,
        }
    }

    fn decode_line(&mut self, src: &mut BytesMut) -> Decoded {
        let line_end = match src.iter().position(|byte| *byte == b'\n') {
            Some(position) => position,
            None => {
                // room for a trailing '\r' of a line that is still within the limit
                if src.len() > network::MAX_LINE_LENGTH + 1 {
                    debug!("Command line exceeds {} bytes", network::MAX_LINE_LENGTH);
                    src.clear();
                    self.state = RequestParserState::SkippingLine;
                    return Decoded::Frame(TextRequest::Invalid(CacheError::malformed(
                        LINE_TOO_LONG,
                    )));
                }
                return Decoded::Incomplete;
            }
        };

        let mut line = src.split_to(line_end + 1).freeze();
        line.truncate(line_end);
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        if line.len() > network::MAX_LINE_LENGTH {
            return Decoded::Frame(TextRequest::Invalid(CacheError::malformed(LINE_TOO_LONG)));
        }

        match self.parse_line(line) {
            ParsedLine::Complete(request) => Decoded::Frame(request),
            ParsedLine::NeedsData(header) => {
                if header.bytes as u64 > self.item_size_limit {
                    debug!(
                        "Value of {} bytes exceeds item size limit {}",
                        header.bytes, self.item_size_limit
                    );
                    self.state =
                        RequestParserState::DiscardingData(header.bytes.saturating_add(2));
                } else {
                    self.state = RequestParserState::AwaitingData(header);
                }
                Decoded::Continue
            }
        }
    }

    fn decode_data(&mut self, header: SetHeader, src: &mut BytesMut) -> Decoded {
        let frame_length = header.bytes + network::CRLF.len();
        if src.len() < frame_length {
            src.reserve(frame_length - src.len());
            self.state = RequestParserState::AwaitingData(header);
            return Decoded::Incomplete;
        }

        let value = src.split_to(header.bytes).freeze();
        if src.starts_with(network::CRLF) {
            src.advance(network::CRLF.len());
            return Decoded::Frame(TextRequest::Set(header.into_request(value)));
        }

        // The data line is longer than announced. Drop it up to its line
        // end so that the leftover is not read as another command.
        match src[..network::CRLF.len()].iter().position(|byte| *byte == b'\n') {
            Some(position) => src.advance(position + 1),
            None => {
                src.advance(network::CRLF.len());
                self.state = RequestParserState::SkippingLine;
            }
        }
        Decoded::Frame(TextRequest::Invalid(CacheError::malformed(BAD_DATA_CHUNK)))
    }

    fn discard_data(&mut self, remaining: usize, src: &mut BytesMut) -> Decoded {
        let skip = cmp::min(remaining, src.len());
        src.advance(skip);
        let remaining = remaining - skip;
        if remaining > 0 {
            self.state = RequestParserState::DiscardingData(remaining);
            return Decoded::Incomplete;
        }
        Decoded::Frame(TextRequest::Invalid(CacheError::value_too_large()))
    }

    fn skip_line(&mut self, src: &mut BytesMut) -> Decoded {
        match src.iter().position(|byte| *byte == b'\n') {
            Some(position) => {
                src.advance(position + 1);
                Decoded::Continue
            }
            None => {
                src.clear();
                self.state = RequestParserState::SkippingLine;
                Decoded::Incomplete
            }
        }
    }

    fn parse_line(&self, line: Bytes) -> ParsedLine {
        let tokens: Vec<Bytes> = line
            .split(|byte| *byte == b' ')
            .filter(|token| !token.is_empty())
            .map(|token| line.slice_ref(token))
            .collect();

        let (verb, args) = match tokens.split_first() {
            Some((verb, args)) => (verb, args),
            None => return ParsedLine::Complete(TextRequest::Invalid(CacheError::unknown_command())),
        };

        if verb.eq_ignore_ascii_case(b"set") {
            match Self::parse_set_header(args) {
                Some(header) => ParsedLine::NeedsData(header),
                None => ParsedLine::Complete(Self::bad_command_line()),
            }
        } else if verb.eq_ignore_ascii_case(b"get") {
            ParsedLine::Complete(TextRequest::Get(GetRequest {
                keys: args.to_vec(),
            }))
        } else if verb.eq_ignore_ascii_case(b"delete") {
            match args {
                [key] => ParsedLine::Complete(TextRequest::Delete(DeleteRequest {
                    key: key.clone(),
                })),
                _ => ParsedLine::Complete(Self::bad_command_line()),
            }
        } else {
            trace!("Unknown command: {:?}", verb);
            ParsedLine::Complete(TextRequest::Invalid(CacheError::unknown_command()))
        }
    }

    fn parse_set_header(args: &[Bytes]) -> Option<SetHeader> {
        match args {
            [key, flags, exptime, bytes] => Some(SetHeader {
                key: key.clone(),
                flags: parse_number(flags)?,
                exptime: parse_number(exptime)?,
                bytes: parse_number(bytes)?,
            }),
            _ => None,
        }
    }

    fn bad_command_line() -> TextRequest {
        TextRequest::Invalid(CacheError::malformed(BAD_COMMAND_LINE))
    }
}

fn parse_number<T: FromStr>(token: &[u8]) -> Option<T> {
    std::str::from_utf8(token).ok()?.parse().ok()
}

impl Decoder for MemcacheTextDecoder {
    type Item = TextRequest;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let state = std::mem::replace(&mut self.state, RequestParserState::AwaitingLine);
            let decoded = match state {
                RequestParserState::AwaitingLine => self.decode_line(src),
                RequestParserState::AwaitingData(header) => self.decode_data(header, src),
                RequestParserState::DiscardingData(remaining) => self.discard_data(remaining, src),
                RequestParserState::SkippingLine => self.skip_line(src),
            };
            match decoded {
                Decoded::Frame(request) => return Ok(Some(request)),
                Decoded::Incomplete => return Ok(None),
                Decoded::Continue => {}
            }
        }
    }
}
