#![allow(dead_code)]

use memlru::cache::cache::{Cache, KeyType};
use memlru::memcache::builder::MemcacheStoreConfig;
use memlru::memcache::cli::parser::{self, RuntimeType};
use memlru::memcache_server::runtime_builder;
use memlru::memcache_server::server_context::ServerContext;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const CONNECT_ATTEMPTS: u32 = 100;

/// In-process server bound to a free local port,
/// stopped through its cancellation token when dropped.
pub struct MemlruTestServer {
    addr: SocketAddr,
    store: Arc<dyn Cache + Send + Sync>,
    cancellation_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl MemlruTestServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn store(&self) -> Arc<dyn Cache + Send + Sync> {
        self.store.clone()
    }

    pub fn connect(&self) -> TestClient {
        TestClient::connect(self.addr)
    }

    /// Stored keys and keys tracked by the eviction policy, both sorted
    pub fn key_sets(&self) -> (Vec<KeyType>, Vec<KeyType>) {
        let mut stored = self.store.keys();
        let mut tracked = self.store.tracked_keys();
        stored.sort();
        tracked.sort();
        (stored, tracked)
    }
}

impl Drop for MemlruTestServer {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                eprintln!("Server thread panicked");
            }
        }
    }
}

pub struct MemlruServerParamsBuilder {
    capacity: usize,
    max_item_size: String,
    connection_limit: u32,
    idle_timeout: u32,
    runtime: RuntimeType,
    threads: usize,
}

impl MemlruServerParamsBuilder {
    pub fn new() -> MemlruServerParamsBuilder {
        MemlruServerParamsBuilder {
            capacity: 1024,
            max_item_size: String::from("1m"),
            connection_limit: 64,
            idle_timeout: 60,
            runtime: RuntimeType::CurrentThread,
            threads: 2,
        }
    }

    pub fn with_capacity(&mut self, capacity: usize) -> &mut Self {
        self.capacity = capacity;
        self
    }

    pub fn with_max_item_size(&mut self, max_item_size: &str) -> &mut Self {
        self.max_item_size = String::from(max_item_size);
        self
    }

    pub fn with_connection_limit(&mut self, connection_limit: u32) -> &mut Self {
        self.connection_limit = connection_limit;
        self
    }

    pub fn with_idle_timeout(&mut self, idle_timeout: u32) -> &mut Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn with_runtime(&mut self, runtime: RuntimeType) -> &mut Self {
        self.runtime = runtime;
        self
    }

    pub fn with_threads(&mut self, threads: usize) -> &mut Self {
        self.threads = threads;
        self
    }

    pub fn build(&self, port: u16) -> Vec<String> {
        let runtime = match self.runtime {
            RuntimeType::CurrentThread => "current-thread",
            RuntimeType::MultiThread => "multi-thread",
        };
        vec![
            String::from("memlrud"),
            String::from("--port"),
            port.to_string(),
            String::from("--listen"),
            String::from("127.0.0.1"),
            String::from("--capacity"),
            self.capacity.to_string(),
            String::from("--max-item-size"),
            self.max_item_size.clone(),
            String::from("--connection-limit"),
            self.connection_limit.to_string(),
            String::from("--idle-timeout"),
            self.idle_timeout.to_string(),
            String::from("--runtime-type"),
            String::from(runtime),
            String::from("--threads"),
            self.threads.to_string(),
        ]
    }
}

impl Default for MemlruServerParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn get_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

pub fn spawn_server(params: &MemlruServerParamsBuilder) -> MemlruTestServer {
    let port = get_free_port();
    let config = parser::parse(params.build(port)).unwrap();
    let store_config =
        MemcacheStoreConfig::new(config.eviction_policy, config.capacity, config.max_key_size);
    let ctxt = ServerContext::get_default_server_context(store_config);
    let store = ctxt.store();
    let cancellation_token = ctxt.cancellation_token();
    let addr = SocketAddr::new(config.listen_address, config.port);

    let handle = thread::spawn(move || {
        runtime_builder::start_memlru_server_with_ctxt(&config, &ctxt).unwrap();
    });

    let server = MemlruTestServer {
        addr,
        store,
        cancellation_token,
        handle: Some(handle),
    };
    wait_until_listening(addr);
    server
}

pub fn spawn_default_server() -> MemlruTestServer {
    spawn_server(&MemlruServerParamsBuilder::new())
}

fn wait_until_listening(addr: SocketAddr) {
    for _ in 0..CONNECT_ATTEMPTS {
        if TcpStream::connect(addr).is_ok() {
            return;
        }
        thread::sleep(Duration::from_millis(20));
    }
    panic!("Server did not start listening on {}", addr);
}

/// Blocking client speaking the raw text protocol
pub struct TestClient {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl TestClient {
    pub fn connect(addr: SocketAddr) -> TestClient {
        let stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let writer = stream.try_clone().unwrap();
        TestClient {
            reader: BufReader::new(stream),
            writer,
        }
    }

    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.writer.set_read_timeout(Some(timeout)).unwrap();
    }

    pub fn send(&mut self, request: &[u8]) {
        self.writer.write_all(request).unwrap();
        self.writer.flush().unwrap();
    }

    /// Reads one complete reply, a GET reply up to and including END
    pub fn read_reply(&mut self) -> std::io::Result<Vec<u8>> {
        let mut reply = Vec::new();
        loop {
            let line = self.read_line()?;
            reply.extend_from_slice(&line);
            if !line.starts_with(b"VALUE ") {
                return Ok(reply);
            }
            let bytes = value_length(&line);
            let mut data = vec![0; bytes + 2];
            self.reader.read_exact(&mut data)?;
            reply.extend_from_slice(&data);
        }
    }

    fn read_line(&mut self) -> std::io::Result<Vec<u8>> {
        let mut line = Vec::new();
        let read = self.reader.read_until(b'\n', &mut line)?;
        if read == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed",
            ));
        }
        Ok(line)
    }

    pub fn command(&mut self, request: &[u8]) -> String {
        self.send(request);
        String::from_utf8_lossy(&self.read_reply().unwrap()).into_owned()
    }

    pub fn set(&mut self, key: &str, value: &str, flags: u32, exptime: i64) -> String {
        let request = format!(
            "set {} {} {} {}\r\n{}\r\n",
            key,
            flags,
            exptime,
            value.len(),
            value
        );
        self.command(request.as_bytes())
    }

    pub fn get(&mut self, keys: &[&str]) -> String {
        self.command(format!("get {}\r\n", keys.join(" ")).as_bytes())
    }

    pub fn delete(&mut self, key: &str) -> String {
        self.command(format!("delete {}\r\n", key).as_bytes())
    }

    /// True once the server has closed the connection
    pub fn is_closed(&mut self) -> bool {
        let mut buf = [0u8; 1];
        matches!(self.reader.read(&mut buf), Ok(0))
    }
}

fn value_length(line: &[u8]) -> usize {
    let line = String::from_utf8_lossy(line);
    line.trim_end()
        .rsplit(' ')
        .next()
        .and_then(|bytes| bytes.parse().ok())
        .unwrap()
}

pub fn value_reply(key: &str, flags: u32, value: &str) -> String {
    format!("VALUE {} {} {}\r\n{}\r\n", key, flags, value.len(), value)
}
