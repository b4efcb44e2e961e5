//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! El router construye la respuesta de forma progresiva (status, tipo de
//! contenido, body agregado por partes) y la conexión la serializa una sola
//! vez con [`Response::to_bytes`].
//!
//! ## Formato en el cable
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 13\r\n
//! Server: search_server\r\n
//! \r\n
//! <html>...
//! ```
//!
//! El body es una secuencia opaca de bytes: los archivos binarios viajan
//! tal cual, sin pasar por `String`.

use super::StatusCode;

/// Etiqueta de protocolo de todas las respuestas
pub const PROTOCOL: &str = "HTTP/1.1";

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone)]
pub struct Response {
    protocol: &'static str,

    /// Código de estado HTTP (200, 404)
    status: StatusCode,

    /// Valor del header `Content-Type`
    content_type: String,

    /// Headers adicionales, en orden de inserción
    headers: Vec<(String, String)>,

    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta vacía de tipo `text/html`
    pub fn new(status: StatusCode) -> Self {
        Self {
            protocol: PROTOCOL,
            status,
            content_type: "text/html".to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Establece el `Content-Type`
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    /// Reemplaza el body por bytes arbitrarios (archivos binarios)
    ///
    /// # Ejemplo
    /// ```
    /// use search_server::http::{Response, StatusCode};
    ///
    /// let png = vec![0x89, 0x50, 0x4E, 0x47, 0x00, 0xFF];
    /// let response = Response::new(StatusCode::Ok).with_body_bytes(png.clone());
    /// assert_eq!(response.body(), &png[..]);
    /// ```
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Agrega texto al final del body
    pub fn append_to_body(&mut self, text: &str) {
        self.body.extend_from_slice(text.as_bytes());
    }

    /// Agrega un header adicional (después de `Content-Type`/`Content-Length`)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// # Ejemplo
    /// ```
    /// use search_server::http::{Response, StatusCode};
    ///
    /// let mut response = Response::new(StatusCode::Ok);
    /// response.append_to_body("Hello");
    ///
    /// let text = String::from_utf8(response.to_bytes()).unwrap();
    /// assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    /// assert!(text.ends_with("\r\n\r\nHello"));
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("{} {}\r\n", self.protocol, self.status);
        head.push_str(&format!("Content-Type: {}\r\n", self.content_type));
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str("\r\n");

        let mut result = Vec::with_capacity(head.len() + self.body.len());
        result.extend_from_slice(head.as_bytes());
        result.extend_from_slice(&self.body);
        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
