use actix_web::{web, App, HttpServer};
use monopoly_backend::middleware::cors::cors_middleware;
use monopoly_backend::middleware::request_log::RequestLog;
use monopoly_backend::{routes, AppState, ServerConfig};
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(config.clone());
    let rooms = app_state.rooms();
    let reaper = rooms.spawn_reaper(config.reap_interval());

    info!(
        host = %config.host,
        port = config.port,
        max_rooms = config.max_rooms,
        turn_timeout_secs = config.turn_timeout_secs,
        "starting monopoly server"
    );

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(RequestLog)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    reaper.abort();
    rooms.shutdown_all().await;
    info!("server stopped");
    Ok(())
}
