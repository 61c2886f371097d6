use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use monopoly_backend::config::server::ServerConfig;
use monopoly_backend::routes;
use monopoly_backend::state::app_state::AppState;

/// Fresh state with small limits so tests stay cheap.
pub fn test_state() -> AppState {
    AppState::new(ServerConfig {
        max_rooms: 8,
        turn_timeout_secs: 30,
        ..ServerConfig::default()
    })
}

/// Build the routes as production mounts them, minus CORS.
pub async fn create_test_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .wrap(monopoly_backend::RequestLog)
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await
}
