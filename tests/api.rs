use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use storefront::{InMemoryCatalogStore, create_admin_router, create_catalog_router};

fn server() -> TestServer {
    let store = Arc::new(InMemoryCatalogStore::new());
    let app = Router::new()
        .merge(create_catalog_router(Arc::clone(&store), "/media/"))
        .nest("/admin", create_admin_router(store));
    TestServer::new(app).unwrap()
}

async fn post(server: &TestServer, path: &str, body: Value) -> (StatusCode, Value) {
    let response = server.post(path).json(&body).await;
    (response.status_code(), response.json::<Value>())
}

async fn put(server: &TestServer, path: &str, body: Value) -> (StatusCode, Value) {
    let response = server.put(path).json(&body).await;
    (response.status_code(), response.json::<Value>())
}

async fn get(server: &TestServer, path: &str) -> (StatusCode, Value) {
    let response = server.get(path).await;
    (response.status_code(), response.json::<Value>())
}

/// Ids of a category, a product type and an active product filed under them.
struct Seeded {
    category: i64,
    product_type: i64,
    product: i64,
}

async fn seed(server: &TestServer) -> Seeded {
    let (status, category) = post(
        server,
        "/admin/categories",
        json!({"name": "Shoes", "slug": "shoes", "is_active": true}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, product_type) =
        post(server, "/admin/product-types", json!({"name": "Footwear"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, product) = post(
        server,
        "/admin/products",
        json!({
            "name": "Runner",
            "slug": "runner",
            "pid": "RUN-1",
            "description": "A running shoe",
            "is_active": true,
            "category_id": category["id"],
            "product_type_id": product_type["id"],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    Seeded {
        category: category["id"].as_i64().unwrap(),
        product_type: product_type["id"].as_i64().unwrap(),
        product: product["id"].as_i64().unwrap(),
    }
}

fn line(seeded: &Seeded, sku: &str, price: &str, order: Option<i32>) -> Value {
    let mut body = json!({
        "price": price,
        "sku": sku,
        "stock_qty": 5,
        "is_active": true,
        "weight": 1.5,
        "product_id": seeded.product,
        "product_type_id": seeded.product_type,
    });
    if let Some(order) = order {
        body["order"] = json!(order);
    }
    body
}

#[tokio::test]
async fn lines_are_numbered_and_duplicates_rejected() {
    let server = server();
    let seeded = seed(&server).await;

    let (status, first) = post(&server, "/admin/product-lines", line(&seeded, "L1", "10", None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["order"], 1);
    assert_eq!(first["price"], "10.00");

    let (status, second) = post(&server, "/admin/product-lines", line(&seeded, "L2", "12.5", None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["order"], 2);

    let (status, body) = post(&server, "/admin/product-lines", line(&seeded, "L3", "9", Some(2))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Duplicate value.");

    let (_, products) = get(&server, "/products/runner").await;
    let skus: Vec<_> = products[0]["product_line"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| line["sku"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(skus, vec!["L1", "L2"]);
}

#[tokio::test]
async fn line_price_accepts_numbers_and_strings() {
    let server = server();
    let seeded = seed(&server).await;

    let mut numeric = line(&seeded, "L1", "0", None);
    numeric["price"] = json!(12.5);
    let (status, created) = post(&server, "/admin/product-lines", numeric).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["order"], 1);
    assert_eq!(created["price"], "12.50");

    let (status, created) = post(&server, "/admin/product-lines", line(&seeded, "L2", "12.50", None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["order"], 2);
    assert_eq!(created["price"], "12.50");
}

#[tokio::test]
async fn line_update_keeps_order_when_unset() {
    let server = server();
    let seeded = seed(&server).await;
    let (_, first) = post(&server, "/admin/product-lines", line(&seeded, "L1", "10", None)).await;
    post(&server, "/admin/product-lines", line(&seeded, "L2", "10", None)).await;

    let path = format!("/admin/product-lines/{}", first["id"]);
    let (status, updated) = put(&server, &path, line(&seeded, "L1", "11", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["order"], 1);
    assert_eq!(updated["price"], "11.00");

    let (status, body) = put(&server, &path, line(&seeded, "L1", "11", Some(2))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Duplicate value.");
}

#[tokio::test]
async fn one_value_per_attribute_on_a_line() {
    let server = server();
    let seeded = seed(&server).await;
    let (_, line) = post(&server, "/admin/product-lines", line(&seeded, "L1", "10", None)).await;

    let (_, color) = post(&server, "/admin/attributes", json!({"name": "Color"})).await;
    let (_, size) = post(&server, "/admin/attributes", json!({"name": "Size"})).await;
    let (_, red) = post(
        &server,
        "/admin/attribute-values",
        json!({"attribute_value": "Red", "attribute_id": color["id"]}),
    )
    .await;
    let (_, blue) = post(
        &server,
        "/admin/attribute-values",
        json!({"attribute_value": "Blue", "attribute_id": color["id"]}),
    )
    .await;
    let (_, large) = post(
        &server,
        "/admin/attribute-values",
        json!({"attribute_value": "Large", "attribute_id": size["id"]}),
    )
    .await;

    let path = format!("/admin/product-lines/{}/attribute-values", line["id"]);
    let (status, body) = post(&server, &path, json!({"attribute_value_id": red["id"]})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"], true);

    let (status, body) = post(&server, &path, json!({"attribute_value_id": blue["id"]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Duplicate attribute exists");

    let (status, _) = post(&server, &path, json!({"attribute_value_id": large["id"]})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(&server, &path, json!({"attribute_value_id": red["id"]})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], false);

    let (_, products) = get(&server, "/products/runner").await;
    let specification = &products[0]["product_line"][0]["specification"];
    assert_eq!(specification[color["id"].to_string()], "Red");
    assert_eq!(specification[size["id"].to_string()], "Large");
}

#[tokio::test]
async fn product_document_nests_images_and_attributes() {
    let server = server();
    let seeded = seed(&server).await;
    let (_, line) = post(&server, "/admin/product-lines", line(&seeded, "L1", "10", None)).await;
    for text in ["side", "front"] {
        let (status, _) = post(
            &server,
            "/admin/product-images",
            json!({"alternative_text": text, "url": format!("{}.jpg", text), "product_line_id": line["id"]}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, material) = post(&server, "/admin/attributes", json!({"name": "Material"})).await;
    let (_, mesh) = post(
        &server,
        "/admin/attribute-values",
        json!({"attribute_value": "Mesh", "attribute_id": material["id"]}),
    )
    .await;
    let (status, _) = post(
        &server,
        &format!("/admin/products/{}/attribute-values", seeded.product),
        json!({"attribute_value_id": mesh["id"]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, products) = get(&server, "/products/runner").await;
    assert_eq!(status, StatusCode::OK);
    let product = &products[0];
    assert_eq!(product["pid"], "RUN-1");
    assert_eq!(product["attribute"]["Material"], "Mesh");
    let images = product["product_line"][0]["product_image"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["alternative_text"], "side");
    assert_eq!(images[0]["order"], 1);
    assert_eq!(images[0]["url"], "/media/side.jpg");
    assert_eq!(images[1]["order"], 2);
}

#[tokio::test]
async fn category_listing_hoists_first_line() {
    let server = server();
    let seeded = seed(&server).await;

    let (status, listing) = get(&server, "/products/category/shoes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing[0]["name"], "Runner");
    assert!(listing[0].get("price").is_none());
    assert!(listing[0].get("image").is_none());

    let (_, line) = post(&server, "/admin/product-lines", line(&seeded, "L1", "19.99", None)).await;
    post(
        &server,
        "/admin/product-images",
        json!({"alternative_text": "front", "product_line_id": line["id"]}),
    )
    .await;

    let (_, listing) = get(&server, "/products/category/shoes").await;
    assert_eq!(listing[0]["price"], "19.99");
    assert_eq!(listing[0]["image"][0]["url"], "/media/test.jpg");
}

#[tokio::test]
async fn inactive_and_unknown_slugs_answer_empty() {
    let server = server();
    let seeded = seed(&server).await;

    let (status, body) = get(&server, "/products/nothing-here").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = get(&server, "/products/category/nothing-here").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = put(
        &server,
        &format!("/admin/products/{}", seeded.product),
        json!({
            "name": "Runner",
            "slug": "runner",
            "pid": "RUN-1",
            "is_active": false,
            "category_id": seeded.category,
            "product_type_id": seeded.product_type,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&server, "/products/runner").await;
    assert_eq!(body, json!([]));
    let (_, body) = get(&server, "/products/category/shoes").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn categories_list_only_active_in_tree_order() {
    let server = server();
    let (_, shoes) = post(
        &server,
        "/admin/categories",
        json!({"name": "Shoes", "slug": "shoes", "is_active": true}),
    )
    .await;
    post(
        &server,
        "/admin/categories",
        json!({"name": "Boots", "slug": "boots", "is_active": true, "parent_id": shoes["id"]}),
    )
    .await;
    post(
        &server,
        "/admin/categories",
        json!({"name": "Archive", "slug": "archive", "is_active": false}),
    )
    .await;

    let (status, body) = get(&server, "/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"category": "Shoes", "slug": "shoes"},
            {"category": "Boots", "slug": "boots"},
        ])
    );
}

#[tokio::test]
async fn admin_errors_map_to_statuses() {
    let server = server();
    let seeded = seed(&server).await;

    let (status, _) = post(
        &server,
        "/admin/categories",
        json!({"name": "Shoes", "slug": "shoes-again", "is_active": true}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = put(
        &server,
        "/admin/categories/9999",
        json!({"name": "Ghost", "slug": "ghost"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut orphan = line(&seeded, "L1", "10", None);
    orphan["product_id"] = json!(9999);
    let (status, _) = post(&server, "/admin/product-lines", orphan).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(
        &server,
        "/admin/product-lines",
        line(&seeded, "L1", "10000", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
