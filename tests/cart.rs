mod common;

use common::spawn_app;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn product_id(product: &Value) -> i64 {
    product["id"].as_i64().expect("Product id missing")
}

#[tokio::test]
async fn test_cart_totals_follow_discounts() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    let user = app.user().await;

    // Step 1: Two products, one discounted
    let bread = app.create_product(&admin, 10.0, None).await;
    let bagel = app.create_product(&admin, 5.0, Some(4.0)).await;

    // Step 2: Fill a fresh cart
    let cart_id = app.create_cart(&user).await;
    let response = app.add_item(&user, cart_id, product_id(&bread), 2).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = app.add_item(&user, cart_id, product_id(&bagel), 1).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let line = response
        .json::<Value>()
        .await
        .expect("Failed to parse add item response JSON");
    assert_eq!(line["total_item_price"].as_f64(), Some(5.0));
    assert_eq!(line["total_discount_item_price"].as_f64(), Some(4.0));
    assert_eq!(line["amount_saved"].as_f64(), Some(1.0));
    assert_eq!(line["final_price"].as_f64(), Some(4.0));

    // Step 3: Cart total is the sum of final prices
    let (status, cart) = app.get_json(&user, &format!("/api/cart/{}", cart_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(cart["total"].as_f64(), Some(24.0));

    let plain = &cart["items"][0];
    assert_eq!(plain["final_price"].as_f64(), Some(20.0));
    assert_eq!(plain["total_discount_item_price"].as_f64(), Some(20.0));
    assert_eq!(plain["amount_saved"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn test_adding_same_product_merges_quantity() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    let user = app.user().await;

    let product = app.create_product(&admin, 3.0, None).await;
    let cart_id = app.create_cart(&user).await;

    let response = app.add_item(&user, cart_id, product_id(&product), 1).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = app.add_item(&user, cart_id, product_id(&product), 2).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (status, items) = app
        .get_json(&user, &format!("/api/cart/{}/items", cart_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = items.as_array().expect("Items should be an array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"].as_i64(), Some(3));
    assert_eq!(items[0]["final_price"].as_f64(), Some(9.0));
}

#[tokio::test]
async fn test_add_item_validation() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    let user = app.user().await;

    let product = app.create_product(&admin, 3.0, None).await;
    let cart_id = app.create_cart(&user).await;

    let response = app.add_item(&user, cart_id, product_id(&product), 0).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.add_item(&user, cart_id, 9999, 1).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .client
        .post(app.url(&format!("/api/cart/{}/items", cart_id)))
        .headers(user.clone())
        .json(&json!({ "product_id": product_id(&product) }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_and_remove_cart_entry() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    let user = app.user().await;

    let product = app.create_product(&admin, 2.5, None).await;
    let cart_id = app.create_cart(&user).await;
    let item = app
        .add_item(&user, cart_id, product_id(&product), 1)
        .await
        .json::<Value>()
        .await
        .expect("Failed to parse add item response JSON");
    let item_id = item["id"].as_i64().expect("Item id missing");
    let item_path = format!("/api/cart/{}/items/{}", cart_id, item_id);

    // Step 1: Change the quantity
    let patch_response = app
        .client
        .put(app.url(&item_path))
        .headers(user.clone())
        .json(&json!({ "quantity": 4 }))
        .send()
        .await
        .expect("Failed to send update request");
    assert_eq!(patch_response.status(), StatusCode::OK);
    let body = patch_response
        .json::<Value>()
        .await
        .expect("Failed to parse update response JSON");
    assert_eq!(body["quantity"].as_i64(), Some(4));
    assert_eq!(body["final_price"].as_f64(), Some(10.0));

    // Step 2: Zero is not a valid quantity
    let patch_response = app
        .client
        .put(app.url(&item_path))
        .headers(user.clone())
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .expect("Failed to send update request");
    assert_eq!(patch_response.status(), StatusCode::BAD_REQUEST);

    // Step 3: Remove it
    let remove_response = app
        .client
        .delete(app.url(&item_path))
        .headers(user.clone())
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(remove_response.status(), StatusCode::OK);

    let (status, _) = app.get_json(&user, &item_path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, cart) = app.get_json(&user, &format!("/api/cart/{}", cart_id)).await;
    assert_eq!(cart["total"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn test_other_users_cart_is_hidden() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    let owner = app.user().await;
    let stranger = app.new_user().await;

    let product = app.create_product(&admin, 1.0, None).await;
    let cart_id = app.create_cart(&owner).await;
    let response = app.add_item(&owner, cart_id, product_id(&product), 1).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let cart_path = format!("/api/cart/{}", cart_id);
    let (status, _) = app.get_json(&stranger, &cart_path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = app.add_item(&stranger, cart_id, product_id(&product), 1).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (status, carts) = app.get_json(&stranger, "/api/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(carts.as_array().map(Vec::len), Some(0));

    // Admins are not scoped to their own carts
    let (status, cart) = app.get_json(&admin, &cart_path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["id"].as_i64(), Some(cart_id));
}

#[tokio::test]
async fn test_delete_cart() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    let user = app.user().await;

    let product = app.create_product(&admin, 1.0, None).await;
    let cart_id = app.create_cart(&user).await;
    app.add_item(&user, cart_id, product_id(&product), 1).await;

    let response = app
        .client
        .delete(app.url(&format!("/api/cart/{}", cart_id)))
        .headers(user.clone())
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = app.get_json(&user, &format!("/api/cart/{}", cart_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_merged_quantity_is_capped() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    let user = app.user().await;

    let product = app.create_product(&admin, 1.0, None).await;
    let cart_id = app.create_cart(&user).await;

    // Step 1: Out-of-range quantities never reach the cart
    let response = app.add_item(&user, cart_id, product_id(&product), i32::MAX as i64).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Step 2: Fill the line up to the cap, then try to push past it
    let response = app.add_item(&user, cart_id, product_id(&product), 10_000).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = app.add_item(&user, cart_id, product_id(&product), 1).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response
        .json::<Value>()
        .await
        .expect("Failed to parse error response JSON");
    assert!(body["error"].is_string());

    let (_, cart) = app.get_json(&user, &format!("/api/cart/{}", cart_id)).await;
    let items = cart["items"].as_array().expect("Items should be an array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"].as_i64(), Some(10_000));
    assert_eq!(cart["total"].as_f64(), Some(10_000.0));
}

#[tokio::test]
async fn test_other_users_cart_items_are_hidden() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    let owner = app.user().await;
    let stranger = app.new_user().await;

    let product = app.create_product(&admin, 2.0, None).await;
    let cart_id = app.create_cart(&owner).await;
    let item = app
        .add_item(&owner, cart_id, product_id(&product), 3)
        .await
        .json::<Value>()
        .await
        .expect("Failed to parse add item response JSON");
    let item_id = item["id"].as_i64().expect("Item id missing");
    let item_path = format!("/api/cart/{}/items/{}", cart_id, item_id);

    // Step 1: Read, change and remove through the stranger's token
    let (status, _) = app.get_json(&stranger, &item_path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = app
        .client
        .put(app.url(&item_path))
        .headers(stranger.clone())
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .expect("Failed to send update request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .client
        .delete(app.url(&item_path))
        .headers(stranger.clone())
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .client
        .delete(app.url(&format!("/api/cart/{}", cart_id)))
        .headers(stranger.clone())
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Step 2: The item is not reachable through another cart either
    let stranger_cart = app.create_cart(&stranger).await;
    let (status, _) = app
        .get_json(
            &stranger,
            &format!("/api/cart/{}/items/{}", stranger_cart, item_id),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let owner_cart = app.create_cart(&owner).await;
    let (status, _) = app
        .get_json(&owner, &format!("/api/cart/{}/items/{}", owner_cart, item_id))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Step 3: The owner still sees the untouched item
    let (status, body) = app.get_json(&owner, &item_path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"].as_i64(), Some(3));

    let (status, cart) = app.get_json(&owner, &format!("/api/cart/{}", cart_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["total"].as_f64(), Some(6.0));
}

#[tokio::test]
async fn test_non_numeric_id_is_a_json_400() {
    let app = spawn_app().await;
    let user = app.user().await;

    let (status, body) = app.get_json(&user, "/api/cart/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let response = app
        .client
        .get(app.url("/api/product/abc"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response
        .json::<Value>()
        .await
        .expect("Failed to parse error response JSON");
    assert!(body["error"].is_string());
}
