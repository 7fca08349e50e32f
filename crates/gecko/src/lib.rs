//! CoinGecko / GeckoTerminal REST access.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod rest;

pub use config::{ConfigError, GeckoConfig};
pub use error::FetchError;
pub use rest::GeckoRest;
