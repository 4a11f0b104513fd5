use socket2::{Domain, SockAddr, Socket, Type};
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use tokio::io;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use tracing::{debug, error, info};

use super::client_handler;
use crate::cache::cache::Cache;
use crate::memcache::store as storage;

#[derive(Clone, Copy, Debug)]
pub struct MemcacheServerConfig {
    timeout_secs: u32,
    connection_limit: u32,
    item_size_limit: u64,
    max_key_size: usize,
    listen_backlog: u32,
}

impl MemcacheServerConfig {
    pub fn new(
        timeout_secs: u32,
        connection_limit: u32,
        item_size_limit: u64,
        max_key_size: usize,
        listen_backlog: u32,
    ) -> Self {
        MemcacheServerConfig {
            timeout_secs,
            connection_limit,
            item_size_limit,
            max_key_size,
            listen_backlog,
        }
    }

    /// Shared by every listener of a server, so the limit is global
    pub fn create_connection_limiter(&self) -> Arc<Semaphore> {
        Arc::new(Semaphore::new(self.connection_limit as usize))
    }

    pub fn listen_backlog(&self) -> u32 {
        self.listen_backlog
    }
}

#[derive(Clone)]
pub struct MemcacheTcpServer {
    storage: Arc<storage::MemcStore>,
    limit_connections: Arc<Semaphore>,
    config: MemcacheServerConfig,
    cancellation_token: CancellationToken,
}

impl MemcacheTcpServer {
    pub fn new(
        config: MemcacheServerConfig,
        store: Arc<dyn Cache + Send + Sync>,
        limit_connections: Arc<Semaphore>,
        cancellation_token: CancellationToken,
    ) -> MemcacheTcpServer {
        MemcacheTcpServer {
            storage: Arc::new(storage::MemcStore::new(store)),
            limit_connections,
            config,
            cancellation_token,
        }
    }

    pub async fn run(&mut self, listener: std::net::TcpListener) -> io::Result<()> {
        let listener = TcpListener::from_std(listener)?;
        self.serve(listener).await
    }

    /// Accepts clients until the cancellation token fires. While the
    /// connection limit is reached no further connection is accepted.
    pub async fn serve(&mut self, listener: TcpListener) -> io::Result<()> {
        loop {
            tokio::select! {
                _ = self.cancellation_token.cancelled() => {
                    info!("Listener stopped");
                    return Ok(());
                }
                permit = self.limit_connections.acquire() => {
                    match permit {
                        // returned by the client's Drop
                        Ok(permit) => permit.forget(),
                        Err(err) => {
                            error!("Connection limit semaphore closed: {}", err);
                            return Ok(());
                        }
                    }
                }
            }

            tokio::select! {
                _ = self.cancellation_token.cancelled() => {
                    info!("Listener stopped");
                    return Ok(());
                }
                connection = listener.accept() => {
                    match connection {
                        Ok((socket, peer_addr)) => {
                            if let Err(err) = socket.set_nodelay(true) {
                                debug!("Cannot set TCP_NODELAY for {}: {}", peer_addr, err);
                            }
                            let mut client = client_handler::Client::new(
                                Arc::clone(&self.storage),
                                socket,
                                peer_addr,
                                self.get_client_config(),
                                Arc::clone(&self.limit_connections)
                            );
                            let token = self.cancellation_token.clone();
                            tokio::spawn(async move {
                                tokio::select! {
                                    _ = token.cancelled() => {}
                                    _ = client.handle() => {}
                                }
                            });
                        },
                        Err(err) => {
                            self.limit_connections.add_permits(1);
                            error!("Accept error: {}", err);
                        }
                    }
                }
            }
        }
    }

    fn get_client_config(&self) -> client_handler::ClientConfig {
        client_handler::ClientConfig {
            item_size_limit: self.config.item_size_limit,
            max_key_size: self.config.max_key_size,
            rx_timeout_secs: self.config.timeout_secs,
        }
    }
}

/// Binds a non blocking listening socket with SO_REUSEPORT, so several
/// runtimes can each own a listener on the same address.
pub fn bind_listener<A: ToSocketAddrs>(
    addr: A,
    listen_backlog: u32,
) -> Result<std::net::TcpListener, std::io::Error> {
    let mut addrs_iter = addr.to_socket_addrs()?;
    let socket_addr = addrs_iter
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no address to bind to"))?;
    let domain = match socket_addr {
        SocketAddr::V4(_) => Domain::IPV4,
        SocketAddr::V6(_) => Domain::IPV6,
    };
    let socket = Socket::new(domain, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.set_reuse_port(true)?;
    socket.set_nonblocking(true)?;

    debug!("Binding to addr: {:?}", socket_addr);
    let sock_addr = SockAddr::from(socket_addr);
    if let Err(err) = socket.bind(&sock_addr) {
        error!("Can't bind to: {:?}, err {:?}", sock_addr, err);
        return Err(err);
    }

    if let Err(err) = socket.listen(listen_backlog as i32) {
        error!("Listen error: {:?}", err);
        return Err(err);
    }
    Ok(socket.into())
}
