use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, error, info};
use tracing_attributes::instrument;

use super::handler;
use crate::memcache::store as storage;
use crate::protocol::text::connection::MemcacheTextConnection;
use crate::protocol::text::decoder::TextRequest;

pub struct ClientConfig {
    pub(crate) item_size_limit: u64,
    pub(crate) max_key_size: usize,
    pub(crate) rx_timeout_secs: u32,
}

pub struct Client {
    stream: MemcacheTextConnection,
    addr: SocketAddr,
    config: ClientConfig,
    handler: handler::TextHandler,
    /// Max connection semaphore.
    ///
    /// The listener takes a permit before accepting, dropping the client
    /// hands it back so the listener can resume accepting connections.
    limit_connections: Arc<Semaphore>,
}

impl Client {
    pub fn new(
        store: Arc<storage::MemcStore>,
        socket: TcpStream,
        addr: SocketAddr,
        config: ClientConfig,
        limit_connections: Arc<Semaphore>,
    ) -> Self {
        Client {
            stream: MemcacheTextConnection::new(socket, config.item_size_limit),
            addr,
            handler: handler::TextHandler::new(store, config.max_key_size),
            config,
            limit_connections,
        }
    }

    #[instrument(skip(self), fields(peer = %self.addr))]
    pub async fn handle(&mut self) {
        debug!("New client connected: {}", self.addr);

        loop {
            match timeout(
                Duration::from_secs(self.config.rx_timeout_secs as u64),
                self.stream.read_frame(),
            )
            .await
            {
                Ok(req_or_none) => {
                    let client_close = self.handle_frame(req_or_none).await;
                    if client_close {
                        return;
                    }
                }
                Err(err) => {
                    debug!(
                        "Timeout {}s elapsed, disconnecting client: {}, error: {}",
                        self.config.rx_timeout_secs, self.addr, err
                    );
                    if let Err(_e) = self.stream.shutdown().await.map_err(log_error) {}
                    return;
                }
            }
        }
    }

    /// Returns true if we should leave client receive loop
    async fn handle_frame(&mut self, req: Result<Option<TextRequest>, io::Error>) -> bool {
        match req {
            Ok(Some(request)) => self.handle_request(request).await,
            Ok(None) => {
                debug!("Connection closed: {}", self.addr);
                true
            }
            Err(err) => {
                log_error(err);
                true
            }
        }
    }

    async fn handle_request(&mut self, request: TextRequest) -> bool {
        debug!("Got request {:?}", request);
        let response = self.handler.handle_request(request);
        debug!("Sending response {:?}", response);
        if let Err(e) = self.stream.write(&response).await {
            error!("error on sending response; error = {:?}", e);
            return true;
        }
        false
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        // Runs even if the connection task panics, so the
        // permit is never lost.
        self.limit_connections.add_permits(1);
    }
}

fn log_error(e: io::Error) {
    // a peer dropping the connection is not a server fault
    match e.kind() {
        io::ErrorKind::NotConnected | io::ErrorKind::ConnectionReset => info!("Error: {}", e),
        _ => error!("Error: {}", e),
    }
}
