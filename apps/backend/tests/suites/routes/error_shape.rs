use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details_from_service_response;

use crate::support::app::{create_test_app, test_state};

#[actix_web::test]
async fn unknown_room_is_a_problem_details_404() {
    let app = create_test_app(test_state()).await;
    let req = test::TestRequest::get().uri("/api/rooms/ZZZZZZ").to_request();
    let resp = test::call_service(&app, req).await;

    let problem = assert_problem_details_from_service_response(
        resp,
        "ROOM_NOT_FOUND",
        StatusCode::NOT_FOUND,
        Some("ZZZZZZ"),
    )
    .await;
    assert_eq!(problem.title, "Room Not Found");
}

#[actix_web::test]
async fn malformed_codes_are_not_found_too() {
    let app = create_test_app(test_state()).await;
    let req = test::TestRequest::get().uri("/api/rooms/not-a-code").to_request();
    let resp = test::call_service(&app, req).await;

    assert_problem_details_from_service_response(resp, "ROOM_NOT_FOUND", StatusCode::NOT_FOUND, None)
        .await;
}
