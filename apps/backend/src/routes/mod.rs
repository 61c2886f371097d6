use actix_web::web;

pub mod health;
pub mod realtime;
pub mod rooms;

/// All HTTP routes. `main.rs` wraps them in CORS and request logging; tests
/// mount them bare.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health: /health
    cfg.configure(health::configure_routes);

    // Lobby browser: /api/rooms/**
    cfg.service(web::scope("/api/rooms").configure(rooms::configure_routes));

    // WebSocket upgrade: /api/ws
    cfg.service(web::scope("/api/ws").configure(realtime::configure_routes));
}
