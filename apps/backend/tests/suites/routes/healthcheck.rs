use actix_web::test;
use serde_json::Value;

use crate::support::app::{create_test_app, test_state};

#[actix_web::test]
async fn health_reports_ok_and_room_count() {
    let state = test_state();
    state
        .rooms()
        .create_room(state.rooms().default_settings())
        .expect("room");
    let app = create_test_app(state).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["rooms"], 1);
    assert_eq!(body["appVersion"], env!("CARGO_PKG_VERSION"));
    assert!(body["time"].as_str().unwrap().contains('T'));
}
