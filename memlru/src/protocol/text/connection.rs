use crate::memcache::response::Response;
use crate::protocol::text::decoder::{MemcacheTextDecoder, TextRequest};
use crate::protocol::text::encoder::{MemcacheTextEncoder, ResponseMessage};
use bytes::BytesMut;
use std::io;
use std::io::{Error, ErrorKind};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::Decoder;

pub struct MemcacheTextConnection {
    stream: TcpStream,
    decoder: MemcacheTextDecoder,
    encoder: MemcacheTextEncoder,
    buffer: BytesMut,
}

impl MemcacheTextConnection {
    const SOCKET_BUFFER: usize = 4096;

    pub fn new(socket: TcpStream, item_size_limit: u64) -> Self {
        MemcacheTextConnection {
            stream: socket,
            decoder: MemcacheTextDecoder::new(item_size_limit),
            encoder: MemcacheTextEncoder::new(),
            buffer: BytesMut::with_capacity(MemcacheTextConnection::SOCKET_BUFFER),
        }
    }

    pub async fn read_frame(&mut self) -> Result<Option<TextRequest>, io::Error> {
        loop {
            // Pipelined requests already in the buffer are served
            // before reading from the socket again.
            if let Some(frame) = self.decoder.decode(&mut self.buffer)? {
                return Ok(Some(frame));
            }

            // `0` indicates "end of stream"
            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                // A clean shutdown leaves nothing in the buffer, anything
                // left is a frame the peer never finished and is dropped.
                if self.buffer.is_empty() {
                    return Ok(None);
                } else {
                    return Err(Error::new(
                        ErrorKind::ConnectionReset,
                        "Connection reset by peer",
                    ));
                }
            }
        }
    }

    pub async fn write(&mut self, msg: &Response) -> io::Result<()> {
        let message = self.encoder.encode_message(msg);
        self.write_data_to_stream(message).await?;
        Ok(())
    }

    async fn write_data_to_stream(&mut self, msg: ResponseMessage) -> io::Result<()> {
        self.stream.write_all(&msg.data[..]).await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
