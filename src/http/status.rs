//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! El servidor solo produce dos resultados visibles para el cliente:
//!
//! - **200 OK**: archivo estático encontrado o página de búsqueda
//! - **404 Not Found**: archivo inexistente, ilegible o fuera del directorio base
//!
//! Los errores del motor de búsqueda no se modelan como errores HTTP.

/// Códigos de estado que emite el router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 404 Not Found - Recurso no encontrado (o rechazado por seguridad)
    NotFound = 404,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use search_server::http::StatusCode;
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
        }
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
