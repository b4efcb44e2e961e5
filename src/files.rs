//! # Lectura de Archivos Estáticos
//! src/files.rs
//!
//! Capacidad de "leer un archivo completo a memoria". Recibe una ruta ya
//! validada por el router (absoluta y dentro del directorio base) y
//! devuelve los bytes crudos, sin interpretarlos como texto.

use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found")]
    NotFound,

    #[error("could not read file: {0}")]
    Io(#[from] io::Error),
}

/// Proveedor del contenido de archivos
///
/// Se comparte entre todos los workers, por eso exige `Send + Sync`.
pub trait FileProvider: Send + Sync {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FileError>;
}

/// Implementación sobre el sistema de archivos local
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileReader;

impl FileProvider for FsFileReader {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FileError> {
        std::fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FileError::NotFound,
            _ => FileError::Io(e),
        })
    }
}
