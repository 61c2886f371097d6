use std::env;

use actix_cors::Cors;
use actix_web::http::header;

/// CORS for the lobby browser and the WebSocket upgrade.
///
/// Origins come from `CORS_ALLOWED_ORIGINS` (comma separated). Entries that
/// are empty, `null` or not http(s) are ignored; with nothing usable left the
/// local dev origins are allowed.
pub fn cors_middleware() -> Cors {
    let configured = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
        .max_age(3600);

    for origin in allowed_origins(&configured) {
        cors = cors.allowed_origin(&origin);
    }
    cors
}

fn allowed_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        vec![
            "http://localhost:3000".to_string(),
            "http://127.0.0.1:3000".to_string(),
        ]
    } else {
        origins
    }
}
