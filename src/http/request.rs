//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Convierte un mensaje ya delimitado (todo lo que hay hasta e incluyendo
//! `\r\n\r\n`) en un [`Request`] inmutable. La delimitación del mensaje la
//! hace [`HttpConnection`](super::connection::HttpConnection); aquí solo se
//! interpreta el texto.
//!
//! ## Formato de un Request
//!
//! ```text
//! GET /query?terms=rust+book HTTP/1.1\r\n
//! Host: localhost:5555\r\n
//! Connection: close\r\n
//! \r\n
//! ```
//!
//! ## Reglas
//!
//! 1. **Request Line**: el segundo token separado por espacios es el URI.
//!    Si falta, el parseo falla (nunca se hace panic).
//! 2. **Headers**: cada línea se parte en el primer `:`. El nombre se pasa
//!    a minúsculas; el valor conserva su capitalización y se recorta.
//!    Las líneas sin `:` se ignoran.
//! 3. **Request vacío**: un mensaje sin líneas equivale a `GET /`.
//! 4. **Codificación**: solo la request line tiene que ser UTF-8; una línea
//!    de header que no lo es se ignora igual que una línea sin `:`.

use std::collections::HashMap;
use thiserror::Error;

/// Representa un request HTTP parseado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Método tal como llegó (no se valida: solo se sirve contenido)
    method: String,

    /// URI completo: path + query string (ej: "/query?terms=foo")
    uri: String,

    /// Solo el path, sin query string (ej: "/query")
    path: String,

    /// Query parameters decodificados (ej: {"terms": "foo bar"})
    query_params: HashMap<String, String>,

    /// Headers con el nombre en minúsculas (ej: {"connection": "close"})
    headers: HashMap<String, String>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// La request line no tiene segundo token
    #[error("request line without URI: {0:?}")]
    MissingUri(String),

    /// La request line no es UTF-8 válido
    #[error("request line is not valid UTF-8")]
    InvalidEncoding,
}

impl Request {
    /// Parsea un mensaje delimitado
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use search_server::http::Request;
    ///
    /// let raw = b"GET /query?terms=foo+bar HTTP/1.1\r\nConnection: close\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.uri(), "/query?terms=foo+bar");
    /// assert_eq!(request.query_param("terms"), Some("foo bar"));
    /// assert_eq!(request.header("connection"), Some("close"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.is_empty() {
            return Ok(Self::from_parts("GET", "/", HashMap::new()));
        }

        let mut lines = split_lines(buffer);

        // 1. Request line: la única parte que tiene que ser UTF-8
        let request_line = lines.next().unwrap_or_default();
        let request_line = std::str::from_utf8(request_line).map_err(|_| ParseError::InvalidEncoding)?;
        let mut tokens = request_line.split_whitespace();
        let method = tokens.next().unwrap_or_default();
        let uri = tokens
            .next()
            .ok_or_else(|| ParseError::MissingUri(request_line.to_string()))?;

        // 2. Headers: las líneas que no son UTF-8 se ignoran
        let headers = Self::parse_headers(lines.filter_map(|line| std::str::from_utf8(line).ok()));

        Ok(Self::from_parts(method, uri, headers))
    }

    fn from_parts(method: &str, uri: &str, headers: HashMap<String, String>) -> Self {
        let (path, query_params) = Self::parse_path_and_query(uri);
        Self {
            method: method.to_string(),
            uri: uri.to_string(),
            path,
            query_params,
            headers,
        }
    }

    /// Separa el path de la query string y decodifica los parámetros
    ///
    /// Ejemplo: "/query?terms=a+b" → ("/query", {"terms": "a b"})
    fn parse_path_and_query(uri: &str) -> (String, HashMap<String, String>) {
        match uri.split_once('?') {
            Some((path, query)) => {
                let mut params = HashMap::new();
                for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                    // Si un parámetro se repite, gana la primera aparición
                    params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
                }
                (path.to_string(), params)
            }
            None => (uri.to_string(), HashMap::new()),
        }
    }

    /// Parsea los headers; si un nombre se repite, gana el último
    fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> HashMap<String, String> {
        let mut headers = HashMap::new();

        for line in lines {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.strip_prefix(' ').unwrap_or(value).trim();
            headers.insert(name.trim().to_ascii_lowercase(), value.to_string());
        }

        headers
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Obtiene el URI completo (path + query string)
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Obtiene el path del request
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene un query parameter específico
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico; el nombre no distingue mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    /// El cliente pidió cerrar la conexión tras esta respuesta
    pub fn wants_close(&self) -> bool {
        self.header("connection") == Some("close")
    }
}

/// Parte el mensaje en líneas separadas por `\r\n`, sin decodificar
fn split_lines(buffer: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = Some(buffer);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.windows(2).position(|w| w == b"\r\n") {
            Some(pos) => {
                rest = Some(&current[pos + 2..]);
                Some(&current[..pos])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}
