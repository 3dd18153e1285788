//! Errors raised while binding or running the dashboard listener

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("port {port} is unavailable: {reason}")]
    PortUnavailable { port: u16, reason: String },

    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("port {0} cannot be used for an explicit bind")]
    InvalidPort(u16),

    #[error("'{0}' is not a valid listen address")]
    InvalidAddress(String),

    #[error("listener failed: {0}")]
    Io(#[from] io::Error),
}
