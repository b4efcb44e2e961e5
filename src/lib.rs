//! # Search Server
//! src/lib.rs
//!
//! Servidor HTTP/1.1 concurrente que sirve archivos estáticos y una página
//! de búsqueda sobre índices invertidos.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: parsing de requests, serialización de respuestas y framing
//!   de mensajes sobre una conexión persistente (pipelining)
//! - `server`: socket de escucha dual-stack, dispatcher y loop de conexión
//! - `router`: clasificación de requests, archivos estáticos y búsquedas
//! - `search`: motor de consultas sobre índices invertidos
//! - `files`: lectura de archivos completos
//! - `config`: argumentos CLI y configuración compartida
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use search_server::config::ServerConfig;
//! use search_server::files::FsFileReader;
//! use search_server::router::Router;
//! use search_server::search::IndexQueryProcessor;
//! use search_server::server::Server;
//! use std::path::{Path, PathBuf};
//! use std::sync::Arc;
//!
//! let engine = IndexQueryProcessor::load_usable(&[PathBuf::from("books.idx")]);
//! let config = ServerConfig::new(Path::new("./static"), engine.identifiers().to_vec()).unwrap();
//! let router = Router::new(Arc::new(config), Arc::new(FsFileReader), Arc::new(engine));
//!
//! Server::new(Arc::new(router), 5555).run().unwrap();
//! ```

pub mod config;
pub mod files;
pub mod http;
pub mod router;
pub mod search;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// Directorio temporal único, borrado al salir del test
    pub(crate) struct TempDir {
        path: PathBuf,
    }

    impl TempDir {
        pub(crate) fn new(name: &str) -> Self {
            let unique = format!(
                "search_server_{}_{}_{}",
                std::process::id(),
                name,
                COUNTER.fetch_add(1, Ordering::SeqCst)
            );
            let path = std::env::temp_dir().join(unique);
            std::fs::create_dir_all(&path).unwrap();

            // Canonizado para comparar con rutas resueltas (p.ej. /tmp → /private/tmp)
            Self {
                path: path.canonicalize().unwrap(),
            }
        }

        pub(crate) fn path(&self) -> &Path {
            &self.path
        }

        /// Escribe un archivo relativo al directorio, creando subdirectorios
        pub(crate) fn write(&self, relative: &str, contents: &[u8]) -> PathBuf {
            let path = self.path.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, contents).unwrap();
            path
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}
