//! # Conexión HTTP (framer de requests)
//! src/http/connection.rs
//!
//! Convierte un stream de bytes bidireccional en una secuencia de
//! [`Request`]s y escribe las [`Response`]s serializadas.
//!
//! ## Delimitación
//!
//! Un request termina en `\r\n\r\n`. Los bytes pueden llegar partidos en
//! varias lecturas, y un cliente con pipelining puede mandar varios
//! requests seguidos sin esperar respuesta. Por eso la conexión guarda un
//! buffer propio:
//!
//! ```text
//!   buffer: GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\nGET /c HT
//!           └──────── request 1 ───────┘└──────── request 2 ───────┘└ resto ┘
//! ```
//!
//! Cada llamada a [`HttpConnection::next_request`] extrae exactamente un
//! mensaje y deja el resto intacto para la siguiente llamada.

use super::{ParseError, Request, Response};
use std::io::{self, Read, Write};
use thiserror::Error;

/// Terminador de headers
const HEADER_END: &[u8] = b"\r\n\r\n";

/// Tamaño de cada lectura del socket
const READ_CHUNK: usize = 1024;

/// Tamaño máximo del buffer sin encontrar el terminador
pub const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Errores de una conexión; todos son fatales para la conexión
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// El peer cerró sin completar otro request
    #[error("end of stream")]
    EndOfStream,

    #[error("request header exceeds {} bytes", MAX_HEADER_BYTES)]
    HeaderTooLarge,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed request: {0}")]
    Parse(#[from] ParseError),
}

/// Conexión HTTP sobre cualquier stream `Read + Write`
///
/// En producción el stream es un `TcpStream`; en tests, un stream en memoria.
/// Una conexión la usa un solo worker a la vez, así que el buffer no
/// necesita sincronización.
pub struct HttpConnection<S> {
    stream: S,
    buffer: Vec<u8>,
}

impl<S: Read + Write> HttpConnection<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
        }
    }

    /// Lee y parsea el siguiente request de la conexión
    ///
    /// Si el buffer ya contiene un mensaje completo, no se lee del socket.
    /// Un cierre del peer sin mensaje completo es
    /// [`ConnectionError::EndOfStream`], distinto de un error de lectura.
    pub fn next_request(&mut self) -> Result<Request, ConnectionError> {
        let message = self.next_message()?;
        Ok(Request::parse(&message)?)
    }

    /// Extrae el siguiente mensaje crudo, terminador incluido
    fn next_message(&mut self) -> Result<Vec<u8>, ConnectionError> {
        let mut searched = 0;
        let end = loop {
            if let Some(pos) = find_header_end(&self.buffer, searched) {
                break pos + HEADER_END.len();
            }
            if self.buffer.len() > MAX_HEADER_BYTES {
                return Err(ConnectionError::HeaderTooLarge);
            }
            // El terminador puede quedar partido entre dos lecturas
            searched = self.buffer.len().saturating_sub(HEADER_END.len() - 1);

            let mut chunk = [0u8; READ_CHUNK];
            let bytes_read = loop {
                match self.stream.read(&mut chunk) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(ConnectionError::Io(e)),
                }
            };
            if bytes_read == 0 {
                return Err(ConnectionError::EndOfStream);
            }
            self.buffer.extend_from_slice(&chunk[..bytes_read]);
        };

        let rest = self.buffer.split_off(end);
        Ok(std::mem::replace(&mut self.buffer, rest))
    }

    /// Serializa y escribe la respuesta completa
    ///
    /// Una escritura parcial se reporta como error (`WriteZero`).
    pub fn write_response(&mut self, response: &Response) -> Result<(), ConnectionError> {
        self.stream.write_all(&response.to_bytes())?;
        self.stream.flush()?;
        Ok(())
    }

    /// Bytes recibidos que todavía no forman un request completo
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Devuelve el stream para cerrarlo
    pub fn into_inner(self) -> S {
        self.stream
    }
}

/// Busca `\r\n\r\n` a partir de `from`
fn find_header_end(buffer: &[u8], from: usize) -> Option<usize> {
    buffer
        .get(from..)?
        .windows(HEADER_END.len())
        .position(|window| window == HEADER_END)
        .map(|pos| from + pos)
}
