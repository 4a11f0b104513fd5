use crate::memcache::cli::parser::{MemlruConfig, RuntimeType};
use crate::memcache_server::memc_tcp::{bind_listener, MemcacheServerConfig, MemcacheTcpServer};
use crate::memcache_server::server_context::ServerContext;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::Builder;

fn get_worker_thread_name() -> String {
    static ATOMIC_ID: AtomicUsize = AtomicUsize::new(0);
    let id = ATOMIC_ID.fetch_add(1, Ordering::SeqCst);
    format!("memlrud-wrk-{}", id)
}

fn create_multi_thread_runtime(worker_threads: usize) -> io::Result<tokio::runtime::Runtime> {
    Builder::new_multi_thread()
        .thread_name_fn(get_worker_thread_name)
        .worker_threads(worker_threads)
        .enable_all()
        .build()
}

fn create_current_thread_runtime() -> io::Result<tokio::runtime::Runtime> {
    Builder::new_current_thread()
        .thread_name_fn(get_worker_thread_name)
        .enable_all()
        .build()
}

pub fn get_server_config(config: &MemlruConfig) -> MemcacheServerConfig {
    MemcacheServerConfig::new(
        config.idle_timeout,
        config.connection_limit,
        config.item_size_limit,
        config.max_key_size,
        config.backlog_limit,
    )
}

fn create_current_thread_server(
    config: &MemlruConfig,
    ctxt: &ServerContext,
) -> io::Result<tokio::runtime::Runtime> {
    let addr = SocketAddr::new(config.listen_address, config.port);
    let memc_config = get_server_config(config);

    // every thread owns a listener on the same address
    let listeners = (0..config.threads.max(1))
        .map(|_| bind_listener(addr, memc_config.listen_backlog()))
        .collect::<io::Result<Vec<_>>>()?;

    let limit_connections = memc_config.create_connection_limiter();
    for (i, listener) in listeners.into_iter().enumerate() {
        let store = ctxt.store();
        let limit_connections = limit_connections.clone();
        let cancellation_token = ctxt.cancellation_token();
        std::thread::Builder::new()
            .name(format!("memlrud-listener-{}", i))
            .spawn(move || {
                debug!("Creating runtime {}", i);
                let child_runtime = match create_current_thread_runtime() {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        error!("Cannot create runtime {}: {}", i, err);
                        cancellation_token.cancel();
                        return;
                    }
                };
                let mut tcp_server = MemcacheTcpServer::new(
                    memc_config,
                    store,
                    limit_connections,
                    cancellation_token.clone(),
                );
                if let Err(err) = child_runtime.block_on(tcp_server.run(listener)) {
                    error!("Listener {} failed: {}", i, err);
                    cancellation_token.cancel();
                }
            })?;
    }

    let runtime = create_current_thread_runtime()?;
    let task_runner = ctxt.pending_tasks_runner();
    runtime.spawn(async move { task_runner.run().await });
    Ok(runtime)
}

fn create_threadpool_server(
    config: &MemlruConfig,
    ctxt: &ServerContext,
) -> io::Result<tokio::runtime::Runtime> {
    let addr = SocketAddr::new(config.listen_address, config.port);
    let memc_config = get_server_config(config);
    let listener = bind_listener(addr, memc_config.listen_backlog())?;

    let runtime = create_multi_thread_runtime(config.threads.max(1))?;
    let mut tcp_server = MemcacheTcpServer::new(
        memc_config,
        ctxt.store(),
        memc_config.create_connection_limiter(),
        ctxt.cancellation_token(),
    );
    let cancellation_token = ctxt.cancellation_token();
    let task_runner = ctxt.pending_tasks_runner();
    runtime.spawn(async move { task_runner.run().await });
    runtime.spawn(async move {
        if let Err(err) = tcp_server.run(listener).await {
            error!("Listener failed: {}", err);
            cancellation_token.cancel();
        }
    });
    Ok(runtime)
}

/// Binds the listeners and starts serving. The returned runtime is
/// meant to drive the server clock until the context is cancelled.
pub fn create_memlru_server(
    config: &MemlruConfig,
    ctxt: &ServerContext,
) -> io::Result<tokio::runtime::Runtime> {
    match config.runtime_type {
        RuntimeType::CurrentThread => create_current_thread_server(config, ctxt),
        RuntimeType::MultiThread => create_threadpool_server(config, ctxt),
    }
}

/// Runs a server until the context is cancelled.
pub fn start_memlru_server_with_ctxt(config: &MemlruConfig, ctxt: &ServerContext) -> io::Result<()> {
    let parent_runtime = create_memlru_server(config, ctxt)?;
    let system_timer = ctxt.system_timer();
    parent_runtime.block_on(system_timer.run());
    Ok(())
}
