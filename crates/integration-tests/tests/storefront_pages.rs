//! Public storefront pages against the mock backend.

#![allow(clippy::unwrap_used)]

use ms_apparels_integration_tests::{TestApp, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_products_page_lists_feed() {
    let app = TestApp::spawn().await;
    app.seed_product("p1", "Classic Tee", 19.5, 25.0).await;
    app.seed_product("p2", "Polo & Shorts", 40.0, 55.0).await;

    let resp = app
        .client
        .get(app.storefront("/products"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Classic Tee"));
    assert!(body.contains("$19.50"));
    assert!(body.contains("$25.00"));
    assert!(body.contains("Order Now"));
    assert!(body.contains("phone=17867637398"));
    assert!(body.contains("Polo%20%26%20Shorts"));
}

#[tokio::test]
async fn test_products_page_empty_feed() {
    let app = TestApp::spawn().await;

    let body = app
        .client
        .get(app.storefront("/products"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("No products found."));
}

#[tokio::test]
async fn test_home_has_banner_products_and_reviews() {
    let app = TestApp::spawn().await;
    app.seed_product("p1", "Team Jersey", 40.0, 55.0).await;

    for path in ["/", "/home"] {
        let resp = app.client.get(app.storefront(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
        let body = resp.text().await.unwrap();
        assert!(body.contains("Where Champions Unite"), "{path}");
        assert!(body.contains("Team Jersey"), "{path}");
        assert!(body.contains("Sarah K."), "{path}");
    }
}

#[tokio::test]
async fn test_static_pages_render() {
    let app = TestApp::spawn().await;

    let about = app.client.get(app.storefront("/about")).send().await.unwrap();
    assert_eq!(about.status(), StatusCode::OK);
    assert!(about.text().await.unwrap().contains("Trusted Client"));

    let faq = app.client.get(app.storefront("/faq")).send().await.unwrap();
    let body = faq.text().await.unwrap();
    assert_eq!(body.matches("<details").count(), 10);

    let contact = app.client.get(app.storefront("/contact")).send().await.unwrap();
    let body = contact.text().await.unwrap();
    assert!(body.contains("Msapparels1117@gmail.com"));
    assert!(body.contains("name=\"user_email\""));
}

#[tokio::test]
async fn test_contact_without_email_service_reports_failure() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.storefront("/contact"))
        .form(&[
            ("user_name", "Jordan"),
            ("user_email", "jordan@example.com"),
            ("message", "Do you print numbers on the back?"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/contact"));

    let body = app
        .client
        .get(app.storefront("/contact"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Failed to send message. Please try again."));

    // Shown once
    let body = app
        .client
        .get(app.storefront("/contact"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!body.contains("Failed to send message."));
}

#[tokio::test]
async fn test_contact_validation_keeps_input() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.storefront("/contact"))
        .form(&[
            ("user_name", "Jordan"),
            ("user_email", "not-an-email"),
            ("message", "Hello"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Please enter a valid email address."));
    assert!(body.contains("not-an-email"));
}

#[tokio::test]
async fn test_login_redirects_to_admin() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(app.storefront("/login")).send().await.unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(
        location(&resp),
        Some(format!("{}/login", app.admin_url))
    );
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.storefront("/collections/summer"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
