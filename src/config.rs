use clap::Parser;

use crate::store::EvictionPolicy;

const HOST: &str = "127.0.0.1";
const PORT: u16 = 6380;
const CAPACITY: usize = 1_000_000;

/// Server settings, read from the command line with environment variable fallbacks.
#[derive(Parser, Debug, Clone)]
#[command(version, about = "In-memory key-value cache with secondary indexes")]
pub struct Config {
    /// The address to listen on
    #[arg(long, env = "IDXCACHE_HOST", default_value = HOST)]
    pub host: String,

    /// The port to listen on
    #[arg(short, long, env = "IDXCACHE_PORT", default_value_t = PORT)]
    pub port: u16,

    /// Eviction policy: none, random, lru, mru, fifo, lfu, clock, arc, 2queue (twoqueues) or
    /// tinylfu
    #[arg(short, long, env = "IDXCACHE_EVICTION", default_value_t = EvictionPolicy::None)]
    pub eviction: EvictionPolicy,

    /// Maximum number of entries, ignored by the `none` policy
    #[arg(short, long, env = "IDXCACHE_CAPACITY", default_value_t = CAPACITY)]
    pub capacity: usize,
}
