mod common;

use common::{spawn_app, SEED_PASSWORD};
use reqwest::{header, StatusCode};

// Test if the server is running and responds to a health check
#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/"))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success(), "Health check failed");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body["status"], "ok");
}

//auth testing
#[tokio::test]
async fn test_create_user_and_login() {
    let app = spawn_app().await;

    let payload = serde_json::json!({
        "username": "JohnDoe",
        "password": "Muzion15"
    });

    let response = app
        .client
        .post(app.url("/register"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    // Step 2: Same username again
    let response = app
        .client
        .post(app.url("/register"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Step 3: Login returns a token
    let response = app
        .client
        .post(app.url("/login"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert!(body["token"].as_str().is_some_and(|token| !token.is_empty()));
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/register"))
        .json(&serde_json::json!({
            "username": "JaneDoe",
            "password": "short"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/login"))
        .json(&serde_json::json!({
            "username": "admin",
            "password": format!("{}x", SEED_PASSWORD)
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/cart"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .client
        .get(app.url("/api/cart"))
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_route_rejects_regular_user() {
    let app = spawn_app().await;
    let user = app.user().await;
    let admin = app.admin().await;

    let (status, _) = app.get_json(&user, "/api/admin/coupon").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get_json(&admin, "/api/admin/coupon").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());
}

#[tokio::test]
async fn test_admin_can_use_user_routes() {
    let app = spawn_app().await;
    let admin = app.admin().await;

    let (status, body) = app.get_json(&admin, "/api/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());
}
