//! # Índices Invertidos
//! src/search/index.rs
//!
//! Cada archivo `.idx` es un índice invertido en JSON:
//!
//! ```json
//! {
//!   "postings": {
//!     "rust":   { "books/rust.html": 12, "http://example.com/": 1 },
//!     "server": { "books/rust.html": 3 }
//!   }
//! }
//! ```
//!
//! ## Semántica de una consulta
//!
//! - Dentro de un índice, un documento coincide solo si contiene **todos**
//!   los términos; su ranking es la suma de las ocurrencias.
//! - Entre índices, los rankings del mismo documento se suman.
//! - Resultado ordenado por ranking descendente y, en empate, por nombre.

use super::{QueryEngine, QueryResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensión obligatoria de los archivos de índice
pub const INDEX_EXTENSION: &str = "idx";

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("{} is not a valid index file (expected a regular .{} file)", .0.display(), INDEX_EXTENSION)]
    NotAnIndex(PathBuf),

    #[error("could not read index: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed index: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Índice invertido: término → documento → ocurrencias
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvertedIndex {
    postings: HashMap<String, HashMap<String, u64>>,
}

impl InvertedIndex {
    /// Abre y valida un archivo de índice
    pub fn open(path: &Path) -> Result<Self, IndexError> {
        let has_extension = path.extension().and_then(|e| e.to_str()) == Some(INDEX_EXTENSION);
        if !has_extension || !path.metadata()?.is_file() {
            return Err(IndexError::NotAnIndex(path.to_path_buf()));
        }

        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Registra `count` ocurrencias de `term` en `document`
    pub fn add_posting(&mut self, term: &str, document: &str, count: u64) {
        let total = self
            .postings
            .entry(term.to_string())
            .or_default()
            .entry(document.to_string())
            .or_default();
        *total = total.saturating_add(count);
    }

    /// Documentos que contienen todos los términos, con su ranking
    pub fn lookup(&self, terms: &[String]) -> HashMap<&str, u64> {
        let Some((first, rest)) = terms.split_first() else {
            return HashMap::new();
        };
        let Some(docs) = self.postings.get(first) else {
            return HashMap::new();
        };

        let mut matches: HashMap<&str, u64> =
            docs.iter().map(|(doc, count)| (doc.as_str(), *count)).collect();

        for term in rest {
            let Some(docs) = self.postings.get(term) else {
                return HashMap::new();
            };
            matches.retain(|doc, _| docs.contains_key(*doc));
            for (doc, rank) in matches.iter_mut() {
                *rank = rank.saturating_add(docs[*doc]);
            }
        }

        matches
    }
}

/// Motor de consultas sobre varios índices cargados al arrancar
///
/// Es inmutable después de construirse, así que se comparte entre
/// workers sin locks.
#[derive(Debug, Default)]
pub struct IndexQueryProcessor {
    indices: HashMap<String, InvertedIndex>,

    /// Identificadores en el orden en que se cargaron
    order: Vec<String>,
}

impl IndexQueryProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carga todos los índices utilizables y omite el resto con un warning
    pub fn load_usable(paths: &[PathBuf]) -> Self {
        let mut processor = Self::new();
        for path in paths {
            match InvertedIndex::open(path) {
                Ok(index) => {
                    tracing::info!(index = %path.display(), "Índice cargado");
                    processor.insert(path.display().to_string(), index);
                }
                Err(e) => {
                    tracing::warn!(index = %path.display(), error = %e, "Índice omitido");
                }
            }
        }
        processor
    }

    /// Registra un índice bajo un identificador
    pub fn insert(&mut self, identifier: String, index: InvertedIndex) {
        if self.indices.insert(identifier.clone(), index).is_none() {
            self.order.push(identifier);
        }
    }

    /// Identificadores de los índices cargados
    pub fn identifiers(&self) -> &[String] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl QueryEngine for IndexQueryProcessor {
    fn process_query(&self, indices: &[String], terms: &[String]) -> Vec<QueryResult> {
        let mut totals: HashMap<&str, u64> = HashMap::new();

        for identifier in indices {
            // Identificadores desconocidos se ignoran
            let Some(index) = self.indices.get(identifier) else {
                continue;
            };
            for (doc, rank) in index.lookup(terms) {
                let total = totals.entry(doc).or_default();
                *total = total.saturating_add(rank);
            }
        }

        let mut results: Vec<QueryResult> = totals
            .into_iter()
            .map(|(doc, rank)| QueryResult {
                document_name: doc.to_string(),
                rank,
            })
            .collect();
        results.sort_by(|a, b| {
            b.rank
                .cmp(&a.rank)
                .then_with(|| a.document_name.cmp(&b.document_name))
        });
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempDir;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn sample_processor() -> IndexQueryProcessor {
        let mut first = InvertedIndex::default();
        first.add_posting("rust", "a.html", 5);
        first.add_posting("rust", "b.html", 2);
        first.add_posting("book", "b.html", 4);
        first.add_posting("book", "c.html", 1);

        let mut second = InvertedIndex::default();
        second.add_posting("rust", "a.html", 1);
        second.add_posting("rust", "http://example.com/", 7);

        let mut processor = IndexQueryProcessor::new();
        processor.insert("first.idx".to_string(), first);
        processor.insert("second.idx".to_string(), second);
        processor
    }

    #[test]
    fn test_single_term_sums_across_indices() {
        let processor = sample_processor();
        let results = processor.process_query(processor.identifiers(), &terms(&["rust"]));

        assert_eq!(
            results,
            vec![
                QueryResult { document_name: "http://example.com/".to_string(), rank: 7 },
                QueryResult { document_name: "a.html".to_string(), rank: 6 },
                QueryResult { document_name: "b.html".to_string(), rank: 2 },
            ]
        );
    }

    #[test]
    fn test_all_terms_required() {
        let processor = sample_processor();
        let results = processor.process_query(processor.identifiers(), &terms(&["rust", "book"]));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document_name, "b.html");
        assert_eq!(results[0].rank, 6);
    }

    #[test]
    fn test_unknown_term_and_empty_terms() {
        let processor = sample_processor();
        assert!(processor.process_query(processor.identifiers(), &terms(&["missing"])).is_empty());
        assert!(processor.process_query(processor.identifiers(), &[]).is_empty());
    }

    #[test]
    fn test_only_requested_indices_are_consulted() {
        let processor = sample_processor();
        let results = processor.process_query(&terms(&["second.idx", "nope.idx"]), &terms(&["rust"]));

        assert_eq!(results.len(), 2);
        assert_eq!(results[1], QueryResult { document_name: "a.html".to_string(), rank: 1 });
    }

    #[test]
    fn test_huge_counts_saturate() {
        let mut first = InvertedIndex::default();
        first.add_posting("a", "doc", u64::MAX);
        first.add_posting("b", "doc", 10);
        let mut second = InvertedIndex::default();
        second.add_posting("a", "doc", 5);
        second.add_posting("b", "doc", 5);

        let mut processor = IndexQueryProcessor::new();
        processor.insert("first.idx".to_string(), first);
        processor.insert("second.idx".to_string(), second);

        let results = processor.process_query(processor.identifiers(), &terms(&["a", "b"]));
        assert_eq!(results, vec![QueryResult { document_name: "doc".to_string(), rank: u64::MAX }]);
    }

    #[test]
    fn test_load_usable_skips_bad_files() {
        let dir = TempDir::new("index_load");

        let mut index = InvertedIndex::default();
        index.add_posting("hello", "hello.txt", 3);
        let good = dir.write("good.idx", &serde_json::to_vec(&index).unwrap());
        let malformed = dir.write("bad.idx", b"not json");
        let wrong_extension = dir.write("notes.txt", b"{}");
        std::fs::create_dir_all(dir.path().join("folder.idx")).unwrap();
        let directory = dir.path().join("folder.idx");
        let missing = dir.path().join("missing.idx");

        let processor = IndexQueryProcessor::load_usable(&[
            good.clone(),
            malformed.clone(),
            wrong_extension.clone(),
            directory.clone(),
            missing,
        ]);
        assert_eq!(processor.identifiers(), &[good.display().to_string()]);
        assert!(!processor.is_empty());

        assert!(matches!(InvertedIndex::open(&malformed), Err(IndexError::Malformed(_))));
        assert!(matches!(InvertedIndex::open(&wrong_extension), Err(IndexError::NotAnIndex(_))));
        assert!(matches!(InvertedIndex::open(&directory), Err(IndexError::NotAnIndex(_))));
    }

    #[test]
    fn test_json_format() {
        let index: InvertedIndex =
            serde_json::from_str(r#"{ "postings": { "rust": { "a.html": 2 } } }"#).unwrap();
        assert_eq!(index.lookup(&terms(&["rust"])).get("a.html"), Some(&2));
    }
}
