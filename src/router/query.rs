//! # Página de Búsqueda
//! src/router/query.rs
//!
//! Todo lo que no es `/static/...` cae aquí: la portada con el formulario
//! y, si el URI trae `query?terms=`, los resultados de la búsqueda.
//!
//! ```text
//! GET /                      → portada
//! GET /query?terms=          → portada + "No results found for <b></b>"
//! GET /query?terms=rust+book → portada + lista de resultados
//! ```
//!
//! Todo valor que viene del cliente o de un nombre de documento se escapa
//! antes de insertarlo en el HTML.

use crate::http::{Request, Response, StatusCode};
use crate::search::{QueryEngine, QueryResult};
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Marca que distingue una búsqueda enviada de la primera visita
const SEARCH_MARKER: &str = "query?terms=";

const PAGE_HEADER: &str = "<html><head><title>Buscador</title></head>\n\
<body>\n\
<center style=\"font-size:500%;\">\n\
<span style=\"color:teal;\">B</span>\
<span style=\"color:orange;\">u</span>\
<span style=\"color:red;\">s</span>\
<span style=\"color:gold;\">c</span>\
<span style=\"color:blue;\">a</span>\n\
</center>\n\
<p>\n\
<div style=\"height:20px;\"></div>\n\
<center>\n\
<form action=\"/query\" method=\"get\">\n\
<input type=\"text\" size=30 name=\"terms\" />\n\
<input type=\"submit\" value=\"Search\" />\n\
</form>\n\
</center><p>\n";

const PAGE_FOOTER: &str = "</body>\n</html>\n";

/// Renderiza la página de búsqueda; siempre responde 200 OK
pub fn render(request: &Request, indices: &[String], engine: &dyn QueryEngine) -> Response {
    let mut response = Response::new(StatusCode::Ok);
    response.append_to_body(PAGE_HEADER);

    let query = request
        .query_param("terms")
        .unwrap_or_default()
        .to_lowercase();
    let query = query.trim();

    if request.uri().contains(SEARCH_MARKER) {
        let terms: Vec<String> = query.split_whitespace().map(str::to_string).collect();
        let results = engine.process_query(indices, &terms);
        tracing::debug!(terms = ?terms, results = results.len(), "Búsqueda procesada");

        append_results(&mut response, query, &results);
    }

    response.append_to_body(PAGE_FOOTER);
    response
}

fn append_results(response: &mut Response, query: &str, results: &[QueryResult]) {
    let escaped_query = encode_text(query);

    if results.is_empty() {
        response.append_to_body("<p><br>\nNo results found for <b>");
        response.append_to_body(&escaped_query);
        response.append_to_body("</b>\n<p>\n\n");
        return;
    }

    response.append_to_body("<p><br>\n");
    if results.len() == 1 {
        response.append_to_body("1 result found for <b>");
    } else {
        response.append_to_body(&format!("{} results found for <b>", results.len()));
    }
    response.append_to_body(&escaped_query);
    response.append_to_body("</b>\n<p>\n\n<ul>\n");

    for result in results {
        response.append_to_body(&format!(
            " <li> <a href=\"{}\">{}</a> [{}]<br>\n",
            encode_double_quoted_attribute(&link_target(&result.document_name)),
            encode_text(&result.document_name),
            result.rank
        ));
    }
    response.append_to_body("</ul>\n");
}

/// Documentos locales se sirven bajo `/static/`; las URLs `http://` se
/// enlazan tal cual
fn link_target(document_name: &str) -> String {
    if document_name.starts_with("http://") {
        document_name.to_string()
    } else {
        format!("/static/{}", document_name)
    }
}
