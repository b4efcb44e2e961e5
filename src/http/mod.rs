//! # Módulo HTTP
//!
//! Implementa el subconjunto de HTTP/1.1 que necesita el servidor, sin
//! librerías de alto nivel:
//!
//! - Delimitación de requests sobre un stream persistente (con pipelining)
//! - Parsing de la request line y los headers
//! - Construcción y serialización de respuestas
//!
//! No hay chunked transfer encoding ni bodies en los requests: un request
//! termina en la primera línea vacía.
//!
//! ### Formato de Request
//!
//! ```text
//! GET /static/index.html HTTP/1.1\r\n
//! Host: localhost:5555\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <html></html>
//! ```

pub mod connection; // Framer: buffer de lectura + escritura de respuestas
pub mod request;    // Parsing de HTTP requests
pub mod response;   // Construcción de HTTP responses
pub mod status;     // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use connection::{ConnectionError, HttpConnection};
pub use request::{ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
