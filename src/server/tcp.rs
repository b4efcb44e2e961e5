//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Dispatcher: un thread acepta conexiones y cada conexión se entrega a un
//! pool de workers de tamaño fijo, que la atiende hasta cerrarla.
//!
//! ```text
//!  ListenSocket::accept ──→ ThreadPool::execute ──→ worker::serve_connection
//!        ↑                         (N workers)
//!        └──────── loop ───────────┘
//! ```
//!
//! El tamaño del pool es el único control de admisión: con todos los
//! workers ocupados, las conexiones nuevas esperan en la cola del pool.

use crate::config::{Config, DEFAULT_WORKERS};
use crate::router::Router;
use crate::server::socket::{AddressFamily, ListenSocket};
use crate::server::{worker, ServerError};
use std::sync::Arc;
use threadpool::ThreadPool;

/// Servidor HTTP concurrente con pool de workers
pub struct Server {
    router: Arc<Router>,
    port: u16,
    family: AddressFamily,
    workers: usize,
    resolve_names: bool,
}

impl Server {
    pub fn new(router: Arc<Router>, port: u16) -> Self {
        Self {
            router,
            port,
            family: AddressFamily::Ipv6,
            workers: DEFAULT_WORKERS,
            resolve_names: true,
        }
    }

    /// Toma puerto, familia, workers y DNS de la configuración CLI
    pub fn from_config(config: &Config, router: Arc<Router>) -> Self {
        Self::new(router, config.port)
            .with_family(config.family)
            .with_workers(config.workers)
            .with_name_resolution(!config.no_dns)
    }

    pub fn with_family(mut self, family: AddressFamily) -> Self {
        self.family = family;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_name_resolution(mut self, resolve_names: bool) -> Self {
        self.resolve_names = resolve_names;
        self
    }

    /// Crea el socket de escucha (fatal si falla)
    pub fn bind(&self) -> Result<ListenSocket, ServerError> {
        let mut listener = ListenSocket::new(self.port).with_name_resolution(self.resolve_names);
        let address = listener.bind_and_listen(self.family)?;
        tracing::info!(%address, family = ?listener.family(), "Servidor escuchando");
        Ok(listener)
    }

    /// Loop de accept
    ///
    /// Termina solo cuando `accept` falla de forma fatal, que es la ruta
    /// normal de apagado. Retorna el número de conexiones aceptadas.
    pub fn serve(&self, listener: ListenSocket) -> u64 {
        let pool = ThreadPool::with_name("search-worker".to_string(), self.workers);
        tracing::info!(workers = self.workers, "Pool de workers listo");

        let mut accepted: u64 = 0;
        loop {
            let connection = match listener.accept() {
                Ok(connection) => connection,
                Err(e) if !e.is_fatal() => {
                    tracing::warn!(error = %e, "Conexión descartada");
                    continue;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Loop de accept terminado");
                    break;
                }
            };
            accepted += 1;

            tracing::info!(
                peer = %connection.peer.dns_name,
                peer_address = %connection.peer.address,
                port = connection.peer.port,
                local = %connection.local.dns_name,
                local_address = %connection.local.address,
                "Nueva conexión"
            );
            tracing::debug!(
                active = pool.active_count(),
                queued = pool.queued_count(),
                "Estado del pool"
            );

            let router = Arc::clone(&self.router);
            pool.execute(move || worker::serve_connection(connection, &router));
        }

        tracing::info!(accepted, "Conexiones atendidas");
        accepted
    }

    /// Bind + loop de accept
    pub fn run(&self) -> Result<u64, ServerError> {
        let listener = self.bind()?;
        Ok(self.serve(listener))
    }
}
