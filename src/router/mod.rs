//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Clasifica cada request y produce su respuesta.
//!
//! ## Arquitectura
//!
//! ```text
//!                 ┌─ /static/<ruta> → static_files → FileProvider
//! Request → Router┤
//!                 └─ cualquier otro → query        → QueryEngine
//! ```
//!
//! Los errores de un request (archivo inexistente, ruta rechazada) se
//! convierten en respuestas HTTP; el router nunca falla.

pub mod query;
pub mod static_files;

use crate::config::ServerConfig;
use crate::files::FileProvider;
use crate::http::{Request, Response};
use crate::search::QueryEngine;
use std::sync::Arc;

pub use static_files::STATIC_PREFIX;

/// Valor del header `Server`
pub const SERVER_NAME: &str = concat!("search_server/", env!("CARGO_PKG_VERSION"));

/// Router compartido (vía `Arc`) por todos los workers
///
/// Todo su estado es de solo lectura después de construirse.
pub struct Router {
    config: Arc<ServerConfig>,
    files: Arc<dyn FileProvider>,
    engine: Arc<dyn QueryEngine>,
}

impl Router {
    pub fn new(
        config: Arc<ServerConfig>,
        files: Arc<dyn FileProvider>,
        engine: Arc<dyn QueryEngine>,
    ) -> Self {
        Self {
            config,
            files,
            engine,
        }
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    pub fn handle(&self, request: &Request) -> Response {
        let mut response = match request.path().strip_prefix(STATIC_PREFIX) {
            Some(relative) => static_files::serve(relative, &self.config.static_dir, self.files.as_ref()),
            None => query::render(request, &self.config.indices, self.engine.as_ref()),
        };

        self.add_common_headers(&mut response);
        response
    }

    /// Agrega headers comunes a todas las respuestas
    fn add_common_headers(&self, response: &mut Response) {
        response.add_header("Server", SERVER_NAME);
    }
}
