#![allow(dead_code)]

use baranki_shop::{config::AppConfig, connect, create_app};
use reqwest::{header, Client, StatusCode};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const SEED_PASSWORD: &str = "Muzion15";

pub struct TestApp {
    pub address: String,
    pub client: Client,
    /// Direct handle on the database the server uses.
    pub db: DatabaseConnection,
    _dir: TempDir,
}

/// Serves the app on an ephemeral port over a fresh SQLite file.
pub async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("shop.db");
    let config = AppConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        bind_addr: "127.0.0.1:0".to_owned(),
        secret: "test-secret".to_owned(),
        token_ttl_hours: 1,
        seed_password: SEED_PASSWORD.to_owned(),
    };

    let db = connect(&config).await.expect("Failed to set up database");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let address = format!("http://{}", listener.local_addr().expect("No local addr"));

    let app = create_app(db.clone(), config);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        address,
        client: Client::new(),
        db,
        _dir: dir,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> header::HeaderMap {
        let login_response = self
            .client
            .post(self.url("/login"))
            .json(&json!({
                "username": username,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to send login request");

        assert_eq!(login_response.status(), StatusCode::OK);

        let login_body = login_response
            .json::<Value>()
            .await
            .expect("Failed to parse login response JSON");

        let token = login_body["token"]
            .as_str()
            .expect("Token not found in login response");

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))
                .expect("Failed to create Authorization header"),
        );
        headers
    }

    pub async fn admin(&self) -> header::HeaderMap {
        self.login("admin", SEED_PASSWORD).await
    }

    pub async fn user(&self) -> header::HeaderMap {
        self.login("user", SEED_PASSWORD).await
    }

    /// Registers a brand new account and logs it in.
    pub async fn new_user(&self) -> header::HeaderMap {
        let username = format!("user_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);
        let response = self
            .client
            .post(self.url("/register"))
            .json(&json!({
                "username": username,
                "password": SEED_PASSWORD
            }))
            .send()
            .await
            .expect("Failed to send register request");
        assert_eq!(response.status(), StatusCode::CREATED);

        self.login(&username, SEED_PASSWORD).await
    }

    pub async fn create_product(
        &self,
        admin: &header::HeaderMap,
        price: f64,
        discount_price: Option<f64>,
    ) -> Value {
        let response = self
            .client
            .post(self.url("/api/admin/product"))
            .headers(admin.clone())
            .json(&json!({
                "name": format!("Product {}", uuid::Uuid::new_v4()),
                "price": price,
                "discount_price": discount_price,
                "weight": 0.5,
                "short_description": "Fresh",
                "category": { "name": "Bakery" },
                "inventory": { "quantity": 100 }
            }))
            .send()
            .await
            .expect("Failed to send create product request");
        assert_eq!(response.status(), StatusCode::CREATED);

        response
            .json::<Value>()
            .await
            .expect("Failed to parse create product response JSON")
    }

    pub async fn create_cart(&self, headers: &header::HeaderMap) -> i64 {
        let response = self
            .client
            .post(self.url("/api/cart"))
            .headers(headers.clone())
            .send()
            .await
            .expect("Failed to send create cart request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response
            .json::<Value>()
            .await
            .expect("Failed to parse create cart response JSON");
        body["id"].as_i64().expect("Cart id missing")
    }

    pub async fn add_item(
        &self,
        headers: &header::HeaderMap,
        cart_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/api/cart/{}/items", cart_id)))
            .headers(headers.clone())
            .json(&json!({
                "product_id": product_id,
                "quantity": quantity
            }))
            .send()
            .await
            .expect("Failed to send add item request")
    }

    pub async fn get_json(&self, headers: &header::HeaderMap, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .headers(headers.clone())
            .send()
            .await
            .expect("Failed to send get request");
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }
}
