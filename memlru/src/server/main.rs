use crate::memcache;
use crate::memcache::cli::parser::MemlruConfig;
use crate::memcache_server;
use crate::memcache_server::server_context::ServerContext;
use log::info;
use std::process;
use tracing_log::LogTracer;

#[cfg(feature = "jemallocator")]
use jemallocator::Jemalloc;

#[cfg(feature = "jemallocator")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn get_log_level(verbose: u8) -> tracing::Level {
    // 'memlrud -v -v -v' is the same as 'memlrud -vvv'
    match verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

fn log_config(cli_config: &MemlruConfig) {
    info!("Listen address: {}", cli_config.listen_address);
    info!("Listen port: {}", cli_config.port);
    info!("Connection limit: {}", cli_config.connection_limit);
    info!("Listen backlog: {}", cli_config.backlog_limit);
    info!("Number of threads: {}", cli_config.threads);
    info!("Runtime type: {}", cli_config.runtime_type.as_str());
    info!("Eviction policy: {}", cli_config.eviction_policy.as_str());
    info!("Capacity: {} items", cli_config.capacity);
    info!("Max key size: {}", cli_config.max_key_size);
    info!(
        "Max item size: {}",
        byte_unit::Byte::from_u64(cli_config.item_size_limit)
            .get_appropriate_unit(byte_unit::UnitType::Decimal)
    );
    info!("Idle timeout: {}s", cli_config.idle_timeout);
}

pub fn run(args: Vec<String>) {
    if let Err(err) = LogTracer::init() {
        eprintln!("Cannot initialize logger: {}", err);
        process::exit(1);
    }

    let cli_config = match memcache::cli::parser::parse(args) {
        Ok(config) => config,
        Err(err) => {
            eprint!("{}", err);
            process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(get_log_level(cli_config.verbose))
        .init();
    log_config(&cli_config);

    let store_config = memcache::builder::MemcacheStoreConfig::new(
        cli_config.eviction_policy,
        cli_config.capacity,
        cli_config.max_key_size,
    );
    let ctxt = ServerContext::get_default_server_context(store_config);
    if let Err(err) =
        memcache_server::runtime_builder::start_memlru_server_with_ctxt(&cli_config, &ctxt)
    {
        error!("Cannot start server: {}", err);
        eprintln!("Cannot start server: {}", err);
        process::exit(1);
    }
}
