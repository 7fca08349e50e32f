use thiserror::Error;

use gecko::{ConfigError, FetchError};
use state_machine::seq::Seq;

use crate::event::Channel;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Fatal at startup; there is no degraded mode without upstream config.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] FetchError),

    /// A newer request on the same channel already owns the result slot.
    #[error("stale completion on {channel}: {seq}")]
    StaleCompletion { channel: Channel, seq: Seq },

    #[error("session closed")]
    Closed,
}

impl From<ConfigError> for SessionError {
    fn from(e: ConfigError) -> Self {
        SessionError::ConfigurationMissing(e.to_string())
    }
}
