//! Explicit configuration.
//!
//! Everything that changes behaviour is a value passed to a constructor.
//! Nothing is read from process-wide state after startup. [`Config::from_env`]
//! is a convenience for binaries; libraries and tests build a [`Config`]
//! directly or through [`Config::from_lookup`].
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `WRAP_BUFFER_HANDLER` | *(fresh)* | `pool`, `pooledhandler` or `bphandler` selects pooled buffers |
//! | `WRAP_POOL_SIZE` | `32` | idle buffers kept by the pool |
//! | `WRAP_POOL_ALLOC` | `16384` | initial capacity of each pooled buffer |
//! | `HOST` | `0.0.0.0` | listen interface |
//! | `PORT` | `8080` | listen port |

use std::convert::Infallible;
use std::net::SocketAddr;
use std::str::FromStr;

use tracing::debug;

use crate::error::Error;
use crate::handler::Handler;
use crate::pool::{BufferSource, PoolConfig};
use crate::scope::{Buffered, buffered};

/// Which body storage a buffered scope uses.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BufferStrategy {
    /// A new buffer per request.
    #[default]
    Fresh,
    /// Buffers checked out of a shared pool.
    Pooled,
}

impl BufferStrategy {
    /// Maps a selector name to a strategy. Case-insensitive; unknown names
    /// (including the empty string) select [`Fresh`](Self::Fresh).
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "pool" | "pooledhandler" | "bphandler" => Self::Pooled,
            _ => Self::Fresh,
        }
    }
}

impl FromStr for BufferStrategy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

/// Host and pipeline configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub strategy: BufferStrategy,
    pub pool: PoolConfig,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: BufferStrategy::default(),
            pool: PoolConfig::default(),
            host: "0.0.0.0".to_owned(),
            port: 8080,
        }
    }
}

impl Config {
    /// Reads the variables in the module table from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key/value lookup. Missing or empty values
    /// fall back to the defaults; numbers that do not parse are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let config = Self {
            strategy: get("WRAP_BUFFER_HANDLER")
                .map(|v| BufferStrategy::from_name(&v))
                .unwrap_or_default(),
            pool: PoolConfig {
                size: parse(&get, "WRAP_POOL_SIZE")?.unwrap_or(defaults.pool.size),
                alloc: parse(&get, "WRAP_POOL_ALLOC")?.unwrap_or(defaults.pool.alloc),
            },
            host: get("HOST").unwrap_or(defaults.host),
            port: parse(&get, "PORT")?.unwrap_or(defaults.port),
        };
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// `host:port` as a socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr, Error> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// The buffer source selected by [`strategy`](Self::strategy).
    ///
    /// Each call to a pooled config builds a new pool. Build the source once
    /// and clone it to share one pool between handlers.
    pub fn buffer_source(&self) -> BufferSource {
        match self.strategy {
            BufferStrategy::Fresh => BufferSource::Fresh,
            BufferStrategy::Pooled => BufferSource::pooled(self.pool),
        }
    }

    /// Wraps `handler` in a buffered scope using the configured strategy.
    pub fn buffered<H: Handler>(&self, handler: H) -> Buffered<H> {
        buffered(handler, self.buffer_source())
    }
}

fn parse<T: FromStr>(
    get: &impl Fn(&'static str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, Error> {
    get(key)
        .map(|value| value.trim().parse().map_err(|_| Error::Config { key, value }))
        .transpose()
}
