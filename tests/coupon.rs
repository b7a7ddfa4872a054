mod common;

use common::spawn_app;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_coupon_lifecycle() {
    let app = spawn_app().await;
    let admin = app.admin().await;

    // Step 1: Create, inactive unless asked otherwise
    let response = app
        .client
        .post(app.url("/api/admin/coupon"))
        .headers(admin.clone())
        .json(&json!({ "code": "WINTER-10", "amount": 10 }))
        .send()
        .await
        .expect("Failed to send create request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let coupon = response
        .json::<Value>()
        .await
        .expect("Failed to parse coupon response JSON");
    assert_eq!(coupon["code"], "WINTER-10");
    assert_eq!(coupon["amount"].as_i64(), Some(10));
    assert_eq!(coupon["is_active"], false);
    let path = format!("/api/admin/coupon/{}", coupon["id"]);

    // Step 2: Switch it on
    let response = app
        .client
        .put(app.url(&path))
        .headers(admin.clone())
        .json(&json!({ "code": "WINTER-10", "amount": 15, "is_active": true }))
        .send()
        .await
        .expect("Failed to send update request");
    assert_eq!(response.status(), StatusCode::OK);

    let (status, coupon) = app.get_json(&admin, &path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(coupon["amount"].as_i64(), Some(15));
    assert_eq!(coupon["is_active"], true);

    let (status, coupons) = app.get_json(&admin, "/api/admin/coupon").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(coupons.as_array().map(Vec::len), Some(1));

    let (status, _) = app.get_json(&admin, "/api/admin/coupon/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_coupon_validation() {
    let app = spawn_app().await;
    let admin = app.admin().await;

    for payload in [
        json!({ "code": "with space", "amount": 5 }),
        json!({ "code": "", "amount": 5 }),
        json!({ "code": "NEGATIVE", "amount": -1 }),
        json!({ "code": "NOAMOUNT" }),
    ] {
        let response = app
            .client
            .post(app.url("/api/admin/coupon"))
            .headers(admin.clone())
            .json(&payload)
            .send()
            .await
            .expect("Failed to send create request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", payload);
    }
}

#[tokio::test]
async fn test_duplicate_coupon_code() {
    let app = spawn_app().await;
    let admin = app.admin().await;

    let payload = json!({ "code": "ONCE", "amount": 1, "is_active": true });
    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let response = app
            .client
            .post(app.url("/api/admin/coupon"))
            .headers(admin.clone())
            .json(&payload)
            .send()
            .await
            .expect("Failed to send create request");
        assert_eq!(response.status(), expected);
    }
}
