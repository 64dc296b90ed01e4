//! Embedded single-page UI

use axum::{
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "ui"]
struct Assets;

/// Get the index.html content
pub fn get_index_html() -> Option<String> {
    Assets::get("index.html").and_then(|content| String::from_utf8(content.data.into_owned()).ok())
}

/// Serve the interview page
pub async fn serve_index() -> Response {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - interview page not embedded</h1>".to_string()),
        )
            .into_response(),
    }
}

/// Serve any other embedded file under `/assets/`
pub async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches("/assets/");

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}
