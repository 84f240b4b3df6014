//! Product management through the admin HTTP surface.

#![allow(clippy::unwrap_used)]

use ms_apparels_integration_tests::{TestApp, location, png_part};
use reqwest::{
    StatusCode,
    multipart::{Form, Part},
};

const EMAIL: &str = "leo@msapparels.com";
const PASSWORD: &str = "Champion1!";

async fn signed_in() -> TestApp {
    let app = TestApp::spawn().await;
    app.seed_staff("Leo Park", EMAIL, PASSWORD, "moderator").await;
    app.seed_product("p1", "Classic Tee", 19.5, 25.0).await;
    app.seed_product("p2", "Team Jersey", 40.0, 55.0).await;
    app.login(EMAIL, PASSWORD).await;
    app
}

#[tokio::test]
async fn test_list_shows_formatted_prices() {
    let app = signed_in().await;

    let resp = app.get_admin("/dashboard/products/show").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Classic Tee"));
    assert!(body.contains("$19.50"));
    assert!(body.contains("$55.00"));
}

#[tokio::test]
async fn test_search_single_match_and_no_match() {
    let app = signed_in().await;

    let body = app
        .get_admin("/dashboard/products/show?q=jersey")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Team Jersey"));
    assert!(!body.contains("Classic Tee"));

    let body = app
        .get_admin("/dashboard/products/show?q=hoodie")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("No products match your search."));
    assert!(!body.contains("No products found in the database."));
}

#[tokio::test]
async fn test_search_filters_loaded_list_without_refetch() {
    let app = signed_in().await;
    app.get_admin("/dashboard/products/show").await;

    // Added behind the admin's back after the list was loaded
    app.seed_product("p3", "Tee Limited", 30.0, 35.0).await;

    let body = app
        .get_admin("/dashboard/products/show?q=tee")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Classic Tee"));
    assert!(!body.contains("Tee Limited"));

    // A plain visit fetches again
    let body = app
        .get_admin("/dashboard/products/show")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Tee Limited"));
}

#[tokio::test]
async fn test_search_without_loaded_list_fetches_first() {
    let app = signed_in().await;

    let body = app
        .get_admin("/dashboard/products/show?q=JERSEY")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Team Jersey"));
    assert!(!body.contains("Classic Tee"));
}

#[tokio::test]
async fn test_empty_catalog_copy() {
    let app = TestApp::spawn().await;
    app.seed_staff("Leo Park", EMAIL, PASSWORD, "moderator").await;
    app.login(EMAIL, PASSWORD).await;

    let body = app
        .get_admin("/dashboard/products/show")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("No products found in the database."));
}

#[tokio::test]
async fn test_delete_removes_only_that_product() {
    let app = signed_in().await;
    app.get_admin("/dashboard/products/show").await;

    let resp = app
        .client
        .post(app.admin("/dashboard/products/p1/delete"))
        .form(&[("confirm", "yes")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp).as_deref(),
        Some("/dashboard/products/show")
    );

    assert!(app.backend.products.get("p1").await.is_none());
    assert!(app.backend.products.get("p2").await.is_some());

    let body = app
        .get_admin("/dashboard/products/show")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Your product has been deleted."));
    assert!(body.contains("Team Jersey"));
    assert!(!body.contains("Classic Tee"));
}

#[tokio::test]
async fn test_unconfirmed_delete_sends_nothing() {
    let app = signed_in().await;
    app.get_admin("/dashboard/products/show").await;

    app.client
        .post(app.admin("/dashboard/products/p1/delete"))
        .form(&[("confirm", "no")])
        .send()
        .await
        .unwrap();

    assert_eq!(app.backend.products.writes(), 0);
    assert_eq!(app.backend.products.all().await.len(), 2);
}

#[tokio::test]
async fn test_add_rejects_bad_prices_without_network_call() {
    let app = signed_in().await;

    for price in ["0", "-5", "abc"] {
        let form = Form::new()
            .text("name", "Training Shorts")
            .text("price", price)
            .text("old_price", "30")
            .part("image", png_part());

        let resp = app
            .client
            .post(app.admin("/dashboard/products/add"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{price}");
        let body = resp.text().await.unwrap();
        assert!(
            body.contains("Price and old price must be positive numbers"),
            "{price}"
        );
    }

    assert_eq!(app.backend.products.writes(), 0);
}

#[tokio::test]
async fn test_add_creates_product() {
    let app = signed_in().await;

    let form = Form::new()
        .text("name", "Training Shorts")
        .text("price", "22.5")
        .text("old_price", "30")
        .part("image", png_part());

    let resp = app
        .client
        .post(app.admin("/dashboard/products/add"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.backend.products.writes(), 1);

    let created = app
        .backend
        .products
        .all()
        .await
        .into_iter()
        .find(|p| p["name"] == "Training Shorts")
        .unwrap();
    assert_eq!(created["price"], 22.5);
    assert!(
        created["image"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
}

#[tokio::test]
async fn test_edit_without_new_image_keeps_current_image() {
    let app = signed_in().await;
    let original_image = app.backend.products.get("p1").await.unwrap()["image"].clone();

    let edit_page = app.get_admin("/dashboard/products/p1/edit").await;
    assert_eq!(edit_page.status(), StatusCode::OK);
    assert!(edit_page.text().await.unwrap().contains("Classic Tee"));

    let form = Form::new()
        .text("name", "Classic Tee v2")
        .text("price", "21")
        .text("old_price", "25");
    let resp = app
        .client
        .post(app.admin("/dashboard/products/p1/edit"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let updated = app.backend.products.get("p1").await.unwrap();
    assert_eq!(updated["name"], "Classic Tee v2");
    assert_eq!(updated["price"], 21.0);
    assert_eq!(updated["image"], original_image);
}

#[tokio::test]
async fn test_backend_rejection_shown_verbatim_with_form_kept() {
    let app = signed_in().await;
    app.backend
        .products
        .reject_creates(axum::http::StatusCode::CONFLICT, "Product name already taken")
        .await;

    let form = Form::new()
        .text("name", "Training Shorts")
        .text("price", "22.5")
        .text("old_price", "30")
        .part("image", png_part());
    let resp = app
        .client
        .post(app.admin("/dashboard/products/add"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Product name already taken"));
    assert!(body.contains(r#"value="Training Shorts""#));
    assert!(body.contains(r#"value="22.5""#));
    assert!(body.contains(r#"value="30""#));
    assert_eq!(app.backend.products.writes(), 0);
}

#[tokio::test]
async fn test_rejected_image_keeps_typed_fields() {
    let app = signed_in().await;

    let not_an_image = Part::bytes(b"hello".as_slice())
        .file_name("notes.txt")
        .mime_str("text/plain")
        .unwrap();
    let form = Form::new()
        .text("name", "Training Shorts")
        .text("price", "22.5")
        .text("old_price", "30")
        .part("image", not_an_image);
    let resp = app
        .client
        .post(app.admin("/dashboard/products/add"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("File must be an image"));
    assert!(body.contains(r#"value="Training Shorts""#));
    assert!(body.contains(r#"value="22.5""#));
    assert_eq!(app.backend.products.writes(), 0);
}
