//! # Archivos Estáticos
//! src/router/static_files.rs
//!
//! Resuelve `/static/<ruta>` contra el directorio base y delega la lectura
//! al [`FileProvider`].
//!
//! ## Seguridad
//!
//! La ruta final se canoniza (resolviendo `..` y symlinks) y tiene que
//! seguir dentro del directorio base. Cualquier violación produce el mismo
//! 404 que un archivo inexistente: la respuesta no revela si el archivo
//! existe fuera del directorio.

use crate::files::FileProvider;
use crate::http::{Response, StatusCode};
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};

/// Prefijo de las rutas de archivos estáticos
pub const STATIC_PREFIX: &str = "/static/";

/// Sirve el archivo `relative` (lo que sigue a `/static/`, sin decodificar)
///
/// Los `%XX` se decodifican a bytes, así que también se sirven archivos
/// cuyo nombre no es UTF-8.
pub fn serve(relative: &str, base_dir: &Path, files: &dyn FileProvider) -> Response {
    let decoded: Vec<u8> = percent_decode_str(relative).collect();
    // En el 404 se muestra el nombre decodificado solo si es texto válido
    let shown = std::str::from_utf8(&decoded).unwrap_or(relative);
    let file_name = path_from_bytes(&decoded);

    let Some(path) = resolve_under(base_dir, &file_name) else {
        return not_found(shown);
    };

    match files.read_file(&path) {
        Ok(bytes) => Response::new(StatusCode::Ok)
            .with_content_type(content_type_for(&file_name))
            .with_body_bytes(bytes),
        Err(e) => {
            tracing::debug!(file = %path.display(), error = %e, "Lectura fallida");
            not_found(shown)
        }
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Resuelve `relative` dentro de `base_dir` (que debe estar canonizado)
///
/// Retorna `None` si la ruta no existe o escapa del directorio base.
pub fn resolve_under(base_dir: &Path, relative: &Path) -> Option<PathBuf> {
    // Una ruta absoluta se toma relativa al directorio base
    let relative: PathBuf = relative
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    let resolved = base_dir.join(&relative).canonicalize().ok()?;

    if resolved.starts_with(base_dir) {
        Some(resolved)
    } else {
        tracing::warn!(requested = %relative.display(), "Ruta fuera del directorio estático rechazada");
        None
    }
}

/// Tipo MIME según la extensión del archivo
pub fn content_type_for(file_name: impl AsRef<Path>) -> &'static str {
    let extension = file_name
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "html" | "htm" => "text/html",
        "csv" => "text/csv",
        "css" => "text/css",
        "ics" => "text/calendar",
        "js" => "text/javascript",
        "txt" => "text/plain",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "png" => "image/png",
        "tiff" => "image/tiff",
        "xml" => "text/xml",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn not_found(file_name: &str) -> Response {
    let mut response = Response::new(StatusCode::NotFound);
    response.append_to_body("<html><body>Couldn't find file \"");
    response.append_to_body(&html_escape::encode_text(file_name));
    response.append_to_body("\"</body></html>");
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FsFileReader;
    use crate::test_support::TempDir;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("index.html"), "text/html");
        assert_eq!(content_type_for("a/b/page.HTM"), "text/html");
        assert_eq!(content_type_for("data.csv"), "text/csv");
        assert_eq!(content_type_for("style.css"), "text/css");
        assert_eq!(content_type_for("cal.ics"), "text/calendar");
        assert_eq!(content_type_for("app.js"), "text/javascript");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("photo.jpg"), "image/jpeg");
        assert_eq!(content_type_for("photo.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("anim.gif"), "image/gif");
        assert_eq!(content_type_for("logo.png"), "image/png");
        assert_eq!(content_type_for("scan.tiff"), "image/tiff");
        assert_eq!(content_type_for("feed.xml"), "text/xml");
        assert_eq!(content_type_for("icon.svg"), "image/svg+xml");
        assert_eq!(content_type_for("archive.tar.gz"), "application/octet-stream");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }

    #[test]
    fn test_serve_existing_file() {
        let dir = TempDir::new("static_ok");
        dir.write("index.html", b"<html>hi</html>");

        let response = serve("index.html", dir.path(), &FsFileReader);
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.content_type(), "text/html");
        assert_eq!(response.body(), b"<html>hi</html>");
    }

    #[test]
    fn test_serve_percent_encoded_name() {
        let dir = TempDir::new("static_pct");
        dir.write("my file.txt", b"spaced");

        let response = serve("my%20file.txt", dir.path(), &FsFileReader);
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"spaced");
    }

    #[test]
    fn test_missing_file_is_404_with_escaped_name() {
        let dir = TempDir::new("static_missing");

        let response = serve("<b>nope</b>.html", dir.path(), &FsFileReader);
        assert_eq!(response.status(), StatusCode::NotFound);
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("&lt;b&gt;nope&lt;/b&gt;.html"));
        assert!(!body.contains("<b>"));
    }

    #[test]
    fn test_traversal_is_rejected() {
        let dir = TempDir::new("static_traversal");
        std::fs::create_dir_all(dir.path().join("pub")).unwrap();
        dir.write("secret.txt", b"top secret");
        let base = dir.path().join("pub").canonicalize().unwrap();

        assert!(resolve_under(&base, Path::new("../secret.txt")).is_none());
        let response = serve("../secret.txt", &base, &FsFileReader);
        assert_eq!(response.status(), StatusCode::NotFound);
        assert!(!String::from_utf8_lossy(response.body()).contains("top secret"));

        let encoded = serve("%2E%2E/secret.txt", &base, &FsFileReader);
        assert_eq!(encoded.status(), StatusCode::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_rejected() {
        let dir = TempDir::new("static_symlink");
        std::fs::create_dir_all(dir.path().join("pub")).unwrap();
        dir.write("secret.txt", b"top secret");
        std::os::unix::fs::symlink(dir.path().join("secret.txt"), dir.path().join("pub/link.txt"))
            .unwrap();
        let base = dir.path().join("pub").canonicalize().unwrap();

        assert!(resolve_under(&base, Path::new("link.txt")).is_none());
    }

    #[test]
    fn test_absolute_path_stays_inside_base() {
        let dir = TempDir::new("static_absolute");
        dir.write("a.txt", b"a");

        assert!(resolve_under(dir.path(), Path::new("/a.txt")).is_some());
        assert!(resolve_under(dir.path(), Path::new("/etc/passwd")).is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_file_name() {
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new("static_non_utf8");
        let name = std::ffi::OsStr::from_bytes(b"caf\xe9.txt");
        std::fs::write(dir.path().join(name), b"latin-1").unwrap();

        let response = serve("caf%E9.txt", dir.path(), &FsFileReader);
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.content_type(), "text/plain");
        assert_eq!(response.body(), b"latin-1");

        let missing = serve("caf%E9-missing.txt", dir.path(), &FsFileReader);
        assert_eq!(missing.status(), StatusCode::NotFound);
        let body = String::from_utf8(missing.body().to_vec()).unwrap();
        assert!(body.contains("Couldn't find file \"caf%E9-missing.txt\""));
        assert!(!body.contains('\u{FFFD}'));
    }

    #[test]
    fn test_binary_round_trip() {
        let dir = TempDir::new("static_binary");
        let png: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0xFF, 0xC3, 0x28];
        dir.write("a.png", &png);

        let response = serve("a.png", dir.path(), &FsFileReader);
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.content_type(), "image/png");
        assert_eq!(response.body(), &png[..]);
    }
}
