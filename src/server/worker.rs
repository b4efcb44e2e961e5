//! # Loop de Conexión
//! src/server/worker.rs
//!
//! Lo que ejecuta un worker del pool por cada conexión aceptada:
//!
//! ```text
//! loop {
//!     next_request()  ── EndOfStream / error ──→ cerrar
//!     router.handle()
//!     write_response() ── error ──→ cerrar
//!     Connection: close ──→ cerrar
//! }
//! ```
//!
//! El cierre ocurre en un único lugar ([`serve_connection`]), una sola vez
//! por conexión, sin importar por qué terminó el loop.

use crate::http::{ConnectionError, HttpConnection};
use crate::router::Router;
use crate::server::socket::AcceptedConnection;
use std::io::{self, Read, Write};
use std::net::Shutdown;

/// Motivo por el que terminó el loop de una conexión
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// El peer cerró sin enviar otro request
    EndOfStream,
    /// Error de lectura, header demasiado grande o request malformado
    ReadFailed,
    WriteFailed,
    /// El request pidió `Connection: close`
    ClientClosed,
}

/// Resultado de atender una conexión
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Served {
    pub exit: LoopExit,
    pub responses: usize,
}

/// Atiende una conexión hasta que deba cerrarse y la cierra
pub fn serve_connection(connection: AcceptedConnection, router: &Router) {
    let AcceptedConnection { stream, peer, .. } = connection;

    let mut http = HttpConnection::new(stream);
    let served = drive(&mut http, router);

    let stream = http.into_inner();
    if let Err(e) = stream.shutdown(Shutdown::Both) {
        // NotConnected es normal si el peer ya cerró
        if e.kind() != io::ErrorKind::NotConnected {
            tracing::debug!(peer = %peer.address, error = %e, "shutdown() fallido");
        }
    }
    drop(stream);

    tracing::info!(
        peer = %peer.dns_name,
        port = peer.port,
        responses = served.responses,
        exit = ?served.exit,
        "Conexión cerrada"
    );
}

/// Loop read → route → write sobre una conexión ya establecida
///
/// No cierra el stream; eso le corresponde a quien es dueño de la conexión.
pub fn drive<S: Read + Write>(http: &mut HttpConnection<S>, router: &Router) -> Served {
    let mut responses = 0;

    let exit = loop {
        let request = match http.next_request() {
            Ok(request) => request,
            Err(ConnectionError::EndOfStream) => break LoopExit::EndOfStream,
            Err(e) => {
                tracing::debug!(error = %e, "Lectura de request fallida");
                break LoopExit::ReadFailed;
            }
        };

        tracing::debug!(method = request.method(), uri = request.uri(), "Request");
        let response = router.handle(&request);

        if let Err(e) = http.write_response(&response) {
            tracing::debug!(error = %e, "Escritura de respuesta fallida");
            break LoopExit::WriteFailed;
        }
        responses += 1;

        if request.wants_close() {
            break LoopExit::ClientClosed;
        }
    };

    Served { exit, responses }
}
