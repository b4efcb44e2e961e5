//! # Search Server - Entry Point
//! src/main.rs
//!
//! Valida la configuración, carga los índices y corre el servidor.
//!
//! Códigos de salida: 0 cuando el loop de accept termina; 1 si la
//! configuración es inválida o el socket no se puede crear.

use search_server::config::{startup_banner, Config, ConfigError, ServerConfig};
use search_server::files::FsFileReader;
use search_server::router::Router;
use search_server::search::IndexQueryProcessor;
use search_server::server::{Server, ServerError};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("search_server=info")),
        )
        .init();

    tracing::info!("{}", startup_banner());
    let config = Config::new();

    match run(&config) {
        Ok(accepted) => {
            tracing::info!(accepted, "Servidor detenido");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Error fatal");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<u64, ServerError> {
    config.validate()?;
    config.print_summary();

    let engine = IndexQueryProcessor::load_usable(&config.indices);
    if engine.is_empty() {
        return Err(ConfigError::NoUsableIndex.into());
    }

    let server_config = ServerConfig::new(&config.static_dir, engine.identifiers().to_vec())?;
    let router = Router::new(Arc::new(server_config), Arc::new(FsFileReader), Arc::new(engine));

    Server::from_config(config, Arc::new(router)).run()
}
