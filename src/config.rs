//! # Configuración del Servidor
//! src/config.rs
//!
//! Dos niveles de configuración:
//!
//! - [`Config`]: argumentos CLI y variables de entorno, tal como llegan.
//! - [`ServerConfig`]: lo que necesitan los workers (directorio estático
//!   canonizado e identificadores de índice). Se construye una vez al
//!   arrancar y se comparte como `Arc<ServerConfig>` sin locks.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./search_server 5555 ./test_tree enron.idx books.idx --workers 32
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! SEARCH_WORKERS=8 SEARCH_NO_DNS=true ./search_server 5555 ./static main.idx
//! ```

use crate::server::AddressFamily;
use clap::Parser;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Puerto mínimo aceptado (los menores requieren privilegios)
pub const MIN_PORT: u16 = 1024;

/// Tamaño por defecto del pool de workers
pub const DEFAULT_WORKERS: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("port {0} is not reasonable (must be >= 1024)")]
    InvalidPort(u16),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("cannot access static directory {}: {}", .0.display(), .1)]
    StaticDir(PathBuf, #[source] std::io::Error),

    #[error("workers must be >= 1")]
    NoWorkers,

    #[error("no index files were readable")]
    NoUsableIndex,
}

/// Línea de arranque que el binario registra antes de la configuración
pub fn startup_banner() -> String {
    format!(
        "{} v{}: archivos estáticos y búsqueda sobre índices invertidos",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

/// Configuración del servidor desde la línea de comandos
#[derive(Debug, Clone, Parser)]
#[command(name = "search_server")]
#[command(about = "Servidor HTTP de archivos estáticos y búsqueda sobre índices invertidos")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor (>= 1024)
    pub port: u16,

    /// Directorio con los archivos servidos bajo /static/
    pub static_dir: PathBuf,

    /// Archivos de índice (.idx) consultados por las búsquedas
    #[arg(required = true, num_args = 1..)]
    pub indices: Vec<PathBuf>,

    /// Número de workers del pool (conexiones atendidas en paralelo)
    #[arg(long, default_value_t = DEFAULT_WORKERS, env = "SEARCH_WORKERS")]
    pub workers: usize,

    /// Familia de direcciones del socket de escucha
    #[arg(long, value_enum, default_value = "ipv6", env = "SEARCH_FAMILY")]
    pub family: AddressFamily,

    /// No resolver nombres DNS de los extremos de cada conexión
    #[arg(long, env = "SEARCH_NO_DNS")]
    pub no_dns: bool,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Valida las condiciones fatales al arrancar
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port < MIN_PORT {
            return Err(ConfigError::InvalidPort(self.port));
        }

        let metadata = self
            .static_dir
            .metadata()
            .map_err(|e| ConfigError::StaticDir(self.static_dir.clone(), e))?;
        if !metadata.is_dir() {
            return Err(ConfigError::NotADirectory(self.static_dir.clone()));
        }

        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }

        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn print_summary(&self) {
        tracing::info!(
            port = self.port,
            static_dir = %self.static_dir.display(),
            workers = self.workers,
            family = ?self.family,
            dns = !self.no_dns,
            "Configuración"
        );
        for index in &self.indices {
            tracing::info!(index = %index.display(), "Índice solicitado");
        }
    }
}

/// Configuración compartida por todos los workers (solo lectura)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Directorio estático, canonizado
    pub static_dir: PathBuf,

    /// Identificadores de los índices, en orden
    pub indices: Vec<String>,
}

impl ServerConfig {
    /// Canoniza el directorio estático para las comprobaciones de ruta
    pub fn new(static_dir: &Path, indices: Vec<String>) -> Result<Self, ConfigError> {
        let static_dir = static_dir
            .canonicalize()
            .map_err(|e| ConfigError::StaticDir(static_dir.to_path_buf(), e))?;

        Ok(Self {
            static_dir,
            indices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempDir;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("search_server").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_positionals_and_defaults() {
        let config = parse(&["5555", "/tmp", "a.idx", "b.idx"]).unwrap();

        assert_eq!(config.port, 5555);
        assert_eq!(config.static_dir, PathBuf::from("/tmp"));
        assert_eq!(config.indices, vec![PathBuf::from("a.idx"), PathBuf::from("b.idx")]);
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.family, AddressFamily::Ipv6);
        assert!(!config.no_dns);
    }

    #[test]
    fn test_parse_options() {
        let config = parse(&["8080", "/tmp", "a.idx", "--workers", "4", "--family", "ipv4", "--no-dns"])
            .unwrap();

        assert_eq!(config.workers, 4);
        assert_eq!(config.family, AddressFamily::Ipv4);
        assert!(config.no_dns);
    }

    #[test]
    fn test_index_is_required() {
        assert!(parse(&["5555", "/tmp"]).is_err());
        assert!(parse(&["notaport", "/tmp", "a.idx"]).is_err());
    }

    #[test]
    fn test_validate_success() {
        let dir = TempDir::new("config_ok");
        let config = parse(&["5555", dir.path().to_str().unwrap(), "a.idx"]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_low_port() {
        let dir = TempDir::new("config_port");
        let config = parse(&["80", dir.path().to_str().unwrap(), "a.idx"]).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPort(80))));
    }

    #[test]
    fn test_validate_static_dir() {
        let dir = TempDir::new("config_dir");
        dir.write("file.txt", b"x");

        let missing = dir.path().join("missing");
        let config = parse(&["5555", missing.to_str().unwrap(), "a.idx"]).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::StaticDir(..))));

        let file = dir.path().join("file.txt");
        let config = parse(&["5555", file.to_str().unwrap(), "a.idx"]).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::NotADirectory(_))));
    }

    #[test]
    fn test_validate_workers() {
        let dir = TempDir::new("config_workers");
        let config = parse(&["5555", dir.path().to_str().unwrap(), "a.idx", "--workers", "0"]).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::NoWorkers)));
    }

    #[test]
    fn test_server_config_canonicalizes() {
        let dir = TempDir::new("config_canon");
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();

        let config = ServerConfig::new(&dir.path().join("sub/.."), vec!["a.idx".to_string()]).unwrap();
        assert_eq!(config.static_dir, dir.path());
        assert_eq!(config.indices, vec!["a.idx"]);
    }

    #[test]
    fn test_startup_banner_names_the_server() {
        let banner = startup_banner();
        assert!(banner.starts_with("search_server v"));
        assert!(banner.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_print_summary() {
        let config = parse(&["5555", "/tmp", "a.idx"]).unwrap();
        // No debe hacer panic
        config.print_summary();
    }
}
