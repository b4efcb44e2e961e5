//! # Servidor
//! src/server/mod.rs
//!
//! - [`socket`]: bind/listen/accept dual-stack
//! - [`worker`]: loop read → route → write de una conexión
//! - [`tcp`]: dispatcher sobre un pool de workers

pub mod socket;
pub mod tcp;
pub mod worker;

use crate::config::ConfigError;
use thiserror::Error;

pub use socket::{AcceptedConnection, AddressFamily, Endpoint, ListenSocket, SocketError};
pub use tcp::Server;

/// Errores que impiden arrancar el servidor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Socket(#[from] SocketError),
}
