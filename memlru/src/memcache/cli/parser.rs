use crate::cache::eviction_policy::EvictionPolicy;
use crate::cache::key_validator::DEFAULT_MAX_KEY_SIZE;
use crate::version;
use byte_unit::{Byte, Unit};
use clap::{Parser, ValueEnum};
use std::net::IpAddr;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum RuntimeType {
    /// each thread runs its own single threaded runtime and listener
    CurrentThread,
    /// one work stealing runtime shared by all threads
    MultiThread,
}

impl RuntimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeType::CurrentThread => "Work handled within current thread runtime",
            RuntimeType::MultiThread => "Work stealing threadpool runtime",
        }
    }
}

const DEFAULT_PORT: u16 = 11211;
const DEFAULT_ADDRESS: &str = "127.0.0.1";
const CONNECTION_LIMIT: u32 = 1024;
const LISTEN_BACKLOG: u32 = 1024;
const CAPACITY: usize = 65536;
const MAX_ITEM_SIZE: &str = "1m";
const IDLE_TIMEOUT_SECS: u32 = 60;
const ITEM_SIZE_LIMIT_MIB: u64 = 1000;

#[derive(Parser, Debug)]
#[command(
    author,
    version = version::MEMLRU_VERSION,
    about = "memlrud - memcached text protocol compatible LRU cache server"
)]
pub struct MemlruConfig {
    /// TCP port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// interface to listen on
    #[arg(short, long = "listen", default_value = DEFAULT_ADDRESS)]
    pub listen_address: IpAddr,

    /// max simultaneous connections
    #[arg(short, long, default_value_t = CONNECTION_LIMIT)]
    pub connection_limit: u32,

    /// set the backlog queue limit
    #[arg(short = 'b', long = "listen-backlog", default_value_t = LISTEN_BACKLOG)]
    pub backlog_limit: u32,

    /// max number of items stored before evicting
    #[arg(short = 'n', long, default_value_t = CAPACITY, value_parser = parse_capacity)]
    pub capacity: usize,

    /// max key length in bytes
    #[arg(short = 'k', long, default_value_t = DEFAULT_MAX_KEY_SIZE)]
    pub max_key_size: usize,

    /// adjusts max item size (max: 1000m)
    #[arg(short = 'I', long = "max-item-size", default_value = MAX_ITEM_SIZE, value_parser = parse_item_size)]
    pub item_size_limit: u64,

    /// eviction policy
    #[arg(short, long, value_enum, default_value_t = EvictionPolicy::LeastRecentlyUsed)]
    pub eviction_policy: EvictionPolicy,

    /// number of threads to use
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub threads: usize,

    /// runtime type to use
    #[arg(short, long, value_enum, default_value_t = RuntimeType::CurrentThread)]
    pub runtime_type: RuntimeType,

    /// seconds an idle connection is kept open
    #[arg(short = 'T', long, default_value_t = IDLE_TIMEOUT_SECS)]
    pub idle_timeout: u32,

    /// sets the level of verbosity
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_capacity(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err(String::from("capacity must be at least 1")),
        Ok(capacity) => Ok(capacity),
        Err(err) => Err(format!("invalid capacity: {}", err)),
    }
}

fn parse_item_size(value: &str) -> Result<u64, String> {
    let item_size = Byte::parse_str(value, true)
        .map_err(|err| format!("invalid item size: {}", err))?;
    let item_size_max = Byte::from_u64_with_unit(ITEM_SIZE_LIMIT_MIB, Unit::MiB)
        .ok_or_else(|| String::from("invalid item size limit"))?;
    if item_size > item_size_max {
        return Err(format!(
            "Max item size cannot be greater than: {}",
            item_size_max.get_appropriate_unit(byte_unit::UnitType::Binary)
        ));
    }
    Ok(item_size.as_u64())
}

pub fn parse(args: Vec<String>) -> Result<MemlruConfig, String> {
    MemlruConfig::try_parse_from(args).map_err(|err| err.to_string())
}
