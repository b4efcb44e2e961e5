//! # Motor de Búsqueda
//! src/search/mod.rs
//!
//! El router solo conoce el trait [`QueryEngine`]: recibe la lista de
//! identificadores de índice configurados y los términos (ya en
//! minúsculas) y devuelve documentos ordenados por ranking.
//!
//! [`IndexQueryProcessor`] es la implementación usada por el binario,
//! basada en índices invertidos serializados en JSON.

pub mod index;

pub use index::{IndexError, IndexQueryProcessor, InvertedIndex};

/// Un documento que contiene todos los términos buscados
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    /// Nombre del documento (ruta relativa o URL `http://...`)
    pub document_name: String,

    /// Ranking: mayor es más relevante
    pub rank: u64,
}

/// Motor de consultas
///
/// Varios workers lo llaman a la vez; las implementaciones deben ser
/// seguras para uso concurrente de solo lectura.
pub trait QueryEngine: Send + Sync {
    fn process_query(&self, indices: &[String], terms: &[String]) -> Vec<QueryResult>;
}
