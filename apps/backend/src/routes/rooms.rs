use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::state::app_state::AppState;

/// Lobbies that still have a free seat.
async fn list_open(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(app_state.rooms().open_lobbies()))
}

/// Read-only view of one room, as a spectator would see it.
async fn show(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let handle = app_state.rooms().get(&path.into_inner())?;
    let snapshot = handle.snapshot();
    Ok(HttpResponse::Ok().json(&*snapshot))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_open))
        .route("/{code}", web::get().to(show));
}
