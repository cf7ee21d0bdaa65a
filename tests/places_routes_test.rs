mod common;

use actix_web::test;
use common::TestApp;
use serial_test::serial;

#[actix_rt::test]
#[serial]
async fn test_places_route_returns_catalog_rows() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/places").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let rows = body.as_array().expect("expected a JSON array");
    assert!(!rows.is_empty());
    assert!(rows[0]["place_id"].is_string());
    assert!(rows[0]["name"].is_string());
}

#[actix_rt::test]
#[serial]
async fn test_places_route_accepts_query_params() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/places?search=lalbagh&city=Bengaluru&limit=5")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
#[serial]
async fn test_places_route_rejects_post() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post().uri("/places").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 405);
}
