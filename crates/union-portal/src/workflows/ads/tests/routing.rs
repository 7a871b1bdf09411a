use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::ads::router::ad_router;

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn create_then_billing() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);

    let created = ad_router(service.clone())
        .oneshot(json_request(
            "POST",
            "/api/v1/unions/mokdong-6/ads",
            json!({
                "advertiser": "목동공인중개사",
                "placement": {
                    "type": "MAIN",
                    "image_url": "https://cdn.example/banner.png",
                    "display_order": 1
                },
                "contract": {
                    "amount": 300000,
                    "starts_on": "2026-03-01",
                    "ends_on": "2026-03-31",
                    "paid": false
                }
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(created.status(), StatusCode::CREATED);
    let payload = read_json_body(created).await;
    assert_eq!(payload["data"]["placement"]["type"], json!("MAIN"));
    assert_eq!(payload["data"]["active"], json!(true));

    let billing = ad_router(service)
        .oneshot(get("/api/v1/unions/mokdong-6/ads/billing"))
        .await
        .expect("route executes");
    assert_eq!(billing.status(), StatusCode::OK);
    let payload = read_json_body(billing).await;
    assert_eq!(payload["data"]["outstanding"], json!(300000));
}

#[tokio::test]
async fn invalid_placement_is_unprocessable() {
    let (service, _, _) = build_service();

    let response = ad_router(Arc::new(service))
        .oneshot(json_request(
            "POST",
            "/api/v1/unions/mokdong-6/ads",
            json!({
                "advertiser": "양천이사",
                "placement": { "type": "BOARD", "title": "", "body": "할인", "category": "moving" }
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"]["code"], json!("validation_error"));
}

#[tokio::test]
async fn deleting_unknown_ad_is_not_found() {
    let (service, _, _) = build_service();

    let response = ad_router(Arc::new(service))
        .oneshot(
            Request::delete("/api/v1/unions/mokdong-6/ads/ad-missing")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn live_route_filters_by_date() {
    let (service, _, _) = build_service();
    service
        .create(
            &union_id(),
            board_post(Some(contract(50_000, "2026-03-01", "2026-03-31", true))),
        )
        .expect("ad created");
    let router = ad_router(Arc::new(service));

    let response = router
        .clone()
        .oneshot(get("/api/v1/unions/mokdong-6/ads/live?date=2026-03-10"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["items"].as_array().map(Vec::len), Some(1));

    let response = router
        .oneshot(get("/api/v1/unions/mokdong-6/ads/live?date=2026-06-01"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn media_upload_uses_the_declared_content_type() {
    let (service, _, media) = build_service();
    let router = ad_router(Arc::new(service));

    let accepted = router
        .clone()
        .oneshot(
            Request::put("/api/v1/unions/mokdong-6/ads/media/creative/banner.png")
                .header(header::CONTENT_TYPE, "image/png")
                .body(Body::from(vec![0x89, 0x50, 0x4e, 0x47]))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(accepted.status(), StatusCode::CREATED);
    let payload = read_json_body(accepted).await;
    assert_eq!(
        payload["data"]["url"],
        json!("https://storage.example/mokdong-6/banner.png")
    );

    let rejected = router
        .oneshot(
            Request::put("/api/v1/unions/mokdong-6/ads/media/creative/notes.txt")
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from("hello"))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(rejected.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(media.stored.lock().expect("media mutex poisoned").len(), 1);
}
