//! Integration test harness for MS Apparels.
//!
//! [`TestApp::spawn`] starts in-process mock versions of the backend REST
//! API and the identity provider on ephemeral ports, then serves the real
//! admin and storefront routers against them. Tests drive the apps over
//! HTTP with a cookie-enabled client that does not follow redirects, and
//! inspect the mocks to see which calls were made.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ms-apparels-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post, put},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use ms_apparels_admin::config::{AdminConfig, IdentityConfig};
use ms_apparels_storefront::config::StorefrontConfig;

const LOCALHOST: [u8; 4] = [127, 0, 0, 1];

type Reply = (StatusCode, Json<Value>);

// =============================================================================
// Mock Backend
// =============================================================================

/// One backend collection (`/products` or `/moderators`).
#[derive(Default)]
pub struct Collection {
    records: Mutex<Vec<Value>>,
    writes: AtomicUsize,
    create_rejection: Mutex<Option<(StatusCode, String)>>,
}

impl Collection {
    /// Add a record without counting it as a write.
    pub async fn seed(&self, record: Value) {
        self.records.lock().await.push(record);
    }

    /// Every stored record.
    pub async fn all(&self) -> Vec<Value> {
        self.records.lock().await.clone()
    }

    /// The record with `_id == id`.
    pub async fn get(&self, id: &str) -> Option<Value> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r["_id"] == id)
            .cloned()
    }

    /// Number of POST, PUT and DELETE calls received.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Answer every following create with `{ "error": message }`.
    pub async fn reject_creates(&self, status: StatusCode, message: &str) {
        *self.create_rejection.lock().await = Some((status, message.to_string()));
    }

    /// Store a create, or answer with the configured rejection.
    async fn create(&self, body: Value) -> Reply {
        if let Some((status, message)) = self.create_rejection.lock().await.clone() {
            return (status, Json(json!({ "error": message })));
        }
        let id = self.insert(body).await;
        (
            StatusCode::CREATED,
            Json(json!({ "acknowledged": true, "insertedId": id })),
        )
    }

    async fn insert(&self, mut body: Value) -> String {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let id = uuid::Uuid::new_v4().simple().to_string();
        if let Some(fields) = body.as_object_mut() {
            fields.insert("_id".to_string(), json!(id));
        }
        self.records.lock().await.push(body);
        id
    }

    async fn update(&self, id: &str, body: Value) -> Option<Value> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().await;
        let record = records.iter_mut().find(|r| r["_id"] == id)?;
        if let (Some(target), Some(changes)) = (record.as_object_mut(), body.as_object()) {
            for (key, value) in changes {
                target.insert(key.clone(), value.clone());
            }
        }
        Some(record.clone())
    }

    async fn remove(&self, id: &str) -> bool {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r["_id"] != id);
        records.len() < before
    }
}

/// In-memory stand-in for the MS Apparels backend.
#[derive(Default)]
pub struct MockBackend {
    pub products: Collection,
    pub moderators: Collection,
    roles: Mutex<HashMap<String, String>>,
    role_lookups: AtomicUsize,
}

impl MockBackend {
    /// Assign the role returned by `GET /user/role` for `uid`.
    pub async fn set_role(&self, uid: &str, role: &str) {
        self.roles
            .lock()
            .await
            .insert(uid.to_string(), role.to_string());
    }

    /// Number of role lookups received.
    pub fn role_lookups(&self) -> usize {
        self.role_lookups.load(Ordering::SeqCst)
    }

    fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/api/products", get(list_products).post(create_product))
            .route(
                "/api/products/{id}",
                put(update_product).delete(delete_product),
            )
            .route(
                "/api/moderators",
                get(list_moderators).post(create_moderator),
            )
            .route(
                "/api/moderators/{id}",
                put(update_moderator).delete(delete_moderator),
            )
            .route("/api/user/role", get(user_role))
            .with_state(self)
    }
}

fn not_found(what: &str) -> Reply {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("{what} not found") })),
    )
}

async fn list_products(State(backend): State<Arc<MockBackend>>) -> Json<Vec<Value>> {
    Json(backend.products.all().await)
}

async fn create_product(State(backend): State<Arc<MockBackend>>, Json(body): Json<Value>) -> Reply {
    backend.products.create(body).await
}

async fn update_product(
    State(backend): State<Arc<MockBackend>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    match backend.products.update(&id, body).await {
        Some(record) => (StatusCode::OK, Json(record)),
        None => not_found("Product"),
    }
}

async fn delete_product(State(backend): State<Arc<MockBackend>>, Path(id): Path<String>) -> Reply {
    if backend.products.remove(&id).await {
        (StatusCode::OK, Json(json!({ "deletedCount": 1 })))
    } else {
        not_found("Product")
    }
}

async fn list_moderators(
    State(backend): State<Arc<MockBackend>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let all = backend.moderators.all().await;
    let matching = match query.get("uid") {
        Some(uid) => all.into_iter().filter(|m| m["uid"] == uid.as_str()).collect(),
        None => all,
    };
    Json(matching)
}

async fn create_moderator(
    State(backend): State<Arc<MockBackend>>,
    Json(body): Json<Value>,
) -> Reply {
    backend.moderators.create(body).await
}

async fn update_moderator(
    State(backend): State<Arc<MockBackend>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    match backend.moderators.update(&id, body).await {
        Some(_) => (StatusCode::OK, Json(json!({ "modifiedCount": 1 }))),
        None => not_found("Moderator"),
    }
}

async fn delete_moderator(
    State(backend): State<Arc<MockBackend>>,
    Path(id): Path<String>,
) -> Reply {
    if backend.moderators.remove(&id).await {
        (StatusCode::OK, Json(json!({ "deletedCount": 1 })))
    } else {
        not_found("Moderator")
    }
}

async fn user_role(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    backend.role_lookups.fetch_add(1, Ordering::SeqCst);

    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|h| h.starts_with("Bearer token-"));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        );
    }

    let role = match query.get("uid") {
        Some(uid) => backend.roles.lock().await.get(uid).cloned(),
        None => None,
    };
    (StatusCode::OK, Json(json!({ "role": role })))
}

// =============================================================================
// Mock Identity Provider
// =============================================================================

/// An account known to the mock identity provider.
#[derive(Debug, Clone)]
pub struct Account {
    pub uid: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl Account {
    fn id_token(&self) -> String {
        format!("token-{}", self.uid)
    }

    fn response(&self) -> Value {
        json!({
            "localId": self.uid,
            "email": self.email,
            "displayName": self.display_name,
            "idToken": self.id_token(),
            "refreshToken": format!("refresh-{}", self.uid),
        })
    }
}

/// In-memory stand-in for the Identity Toolkit REST API.
#[derive(Default)]
pub struct MockIdentity {
    accounts: Mutex<HashMap<String, Account>>,
    sign_ups: AtomicUsize,
    deletions: AtomicUsize,
    reset_emails: Mutex<Vec<String>>,
    update_failure: Mutex<Option<String>>,
}

impl MockIdentity {
    /// Register an account directly.
    pub async fn add_account(&self, account: Account) {
        self.accounts
            .lock()
            .await
            .insert(account.email.clone(), account);
    }

    /// The account registered under `email`.
    pub async fn account(&self, email: &str) -> Option<Account> {
        self.accounts.lock().await.get(email).cloned()
    }

    /// Number of `accounts:signUp` calls received.
    pub fn sign_ups(&self) -> usize {
        self.sign_ups.load(Ordering::SeqCst)
    }

    /// Number of accounts removed through `accounts:delete`.
    pub fn deletions(&self) -> usize {
        self.deletions.load(Ordering::SeqCst)
    }

    /// Fail every following `accounts:update` with the provider error `code`.
    pub async fn fail_updates(&self, code: &str) {
        *self.update_failure.lock().await = Some(code.to_string());
    }

    /// Addresses password-reset emails were requested for.
    pub async fn reset_emails(&self) -> Vec<String> {
        self.reset_emails.lock().await.clone()
    }

    fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/v1/{operation}", post(identity_call))
            .with_state(self)
    }
}

fn provider_error(code: &str) -> Reply {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": { "code": 400, "message": code } })),
    )
}

fn field<'a>(body: &'a Value, name: &str) -> &'a str {
    body[name].as_str().unwrap_or_default()
}

async fn identity_call(
    State(identity): State<Arc<MockIdentity>>,
    Path(operation): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut accounts = identity.accounts.lock().await;

    match operation.as_str() {
        "accounts:signInWithPassword" => match accounts.get(field(&body, "email")) {
            Some(account) if account.password == field(&body, "password") => {
                (StatusCode::OK, Json(account.response()))
            }
            _ => provider_error("INVALID_LOGIN_CREDENTIALS"),
        },
        "accounts:signUp" => {
            identity.sign_ups.fetch_add(1, Ordering::SeqCst);
            let email = field(&body, "email").to_string();
            if accounts.contains_key(&email) {
                return provider_error("EMAIL_EXISTS");
            }
            let account = Account {
                uid: format!("uid-{}", uuid::Uuid::new_v4().simple()),
                email: email.clone(),
                password: field(&body, "password").to_string(),
                display_name: String::new(),
            };
            let response = account.response();
            accounts.insert(email, account);
            (StatusCode::OK, Json(response))
        }
        "accounts:update" => {
            if let Some(code) = identity.update_failure.lock().await.clone() {
                return provider_error(&code);
            }
            let token = field(&body, "idToken");
            let Some(key) = accounts
                .iter()
                .find(|(_, a)| a.id_token() == token)
                .map(|(k, _)| k.clone())
            else {
                return provider_error("INVALID_ID_TOKEN");
            };
            let Some(mut account) = accounts.remove(&key) else {
                return provider_error("INVALID_ID_TOKEN");
            };
            if let Some(name) = body["displayName"].as_str() {
                account.display_name = name.to_string();
            }
            if let Some(email) = body["email"].as_str() {
                account.email = email.to_string();
            }
            if let Some(password) = body["password"].as_str() {
                account.password = password.to_string();
            }
            let response = account.response();
            accounts.insert(account.email.clone(), account);
            (StatusCode::OK, Json(response))
        }
        "accounts:delete" => {
            let token = field(&body, "idToken");
            let before = accounts.len();
            accounts.retain(|_, a| a.id_token() != token);
            if accounts.len() < before {
                identity.deletions.fetch_add(1, Ordering::SeqCst);
                (StatusCode::OK, Json(json!({})))
            } else {
                provider_error("INVALID_ID_TOKEN")
            }
        }
        "accounts:sendOobCode" => {
            let email = field(&body, "email").to_string();
            if !accounts.contains_key(&email) {
                return provider_error("EMAIL_NOT_FOUND");
            }
            identity.reset_emails.lock().await.push(email.clone());
            (StatusCode::OK, Json(json!({ "email": email })))
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "code": 404, "message": "NOT_FOUND" } })),
        ),
    }
}

// =============================================================================
// Test App
// =============================================================================

/// Running admin and storefront apps wired to fresh mocks.
pub struct TestApp {
    pub backend: Arc<MockBackend>,
    pub identity: Arc<MockIdentity>,
    pub admin_url: String,
    pub storefront_url: String,
    /// A browser: keeps cookies, never follows redirects.
    pub client: reqwest::Client,
}

impl TestApp {
    /// Start the mocks and both apps.
    pub async fn spawn() -> Self {
        let backend = Arc::new(MockBackend::default());
        let identity = Arc::new(MockIdentity::default());

        let backend_addr = serve(Arc::clone(&backend).router()).await;
        let identity_addr = serve(Arc::clone(&identity).router()).await;
        let backend_url = format!("http://{backend_addr}/api");

        let admin_config = AdminConfig {
            host: IpAddr::from(LOCALHOST),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            backend_url: backend_url.clone(),
            identity: IdentityConfig {
                api_key: SecretString::from("mock-identity-key"),
                base_url: format!("http://{identity_addr}/v1"),
            },
            storefront_url: "http://127.0.0.1".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        let admin_addr = serve(ms_apparels_admin::app(
            ms_apparels_admin::state::AppState::new(admin_config),
        ))
        .await;
        let admin_url = format!("http://{admin_addr}");

        let storefront_config = StorefrontConfig {
            host: IpAddr::from(LOCALHOST),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            backend_url,
            admin_url: admin_url.clone(),
            whatsapp_phone: "17867637398".to_string(),
            emailjs: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        let storefront_addr = serve(ms_apparels_storefront::app(
            ms_apparels_storefront::state::AppState::new(storefront_config),
        ))
        .await;

        Self {
            backend,
            identity,
            admin_url,
            storefront_url: format!("http://{storefront_addr}"),
            client: browser(),
        }
    }

    /// Absolute admin URL for `path`.
    #[must_use]
    pub fn admin(&self, path: &str) -> String {
        format!("{}{path}", self.admin_url)
    }

    /// Absolute storefront URL for `path`.
    #[must_use]
    pub fn storefront(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// Create an identity account, its moderator record and its role.
    ///
    /// Returns the moderator record id.
    pub async fn seed_staff(&self, name: &str, email: &str, password: &str, role: &str) -> String {
        let uid = format!("uid-{}", name.to_lowercase().replace(' ', "-"));
        self.identity
            .add_account(Account {
                uid: uid.clone(),
                email: email.to_string(),
                password: password.to_string(),
                display_name: name.to_string(),
            })
            .await;
        self.backend.set_role(&uid, role).await;

        let id = format!("m-{uid}");
        self.backend
            .moderators
            .seed(json!({
                "_id": id,
                "uid": uid,
                "displayName": name,
                "email": email,
                "role": role,
            }))
            .await;
        id
    }

    /// Add a product to the backend.
    pub async fn seed_product(&self, id: &str, name: &str, price: f64, old_price: f64) {
        self.backend
            .products
            .seed(json!({
                "_id": id,
                "name": name,
                "image": "data:image/png;base64,iVBORw0KGgo=",
                "price": price,
                "oldPrice": old_price,
            }))
            .await;
    }

    /// Submit the admin login form with [`Self::client`].
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.admin("/login"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .expect("Failed to submit login form")
    }

    /// GET an admin page with [`Self::client`].
    pub async fn get_admin(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.admin(path))
            .send()
            .await
            .expect("Failed to request admin page")
    }
}

/// A new cookie-keeping client that does not follow redirects.
#[must_use]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// A tiny PNG upload for multipart forms.
#[must_use]
pub fn png_part() -> reqwest::multipart::Part {
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];
    reqwest::multipart::Part::bytes(PNG)
        .file_name("tee.png")
        .mime_str("image/png")
        .expect("Failed to build image part")
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from((LOCALHOST, 0)))
        .await
        .expect("Failed to bind test listener");
    let addr = listener
        .local_addr()
        .expect("Failed to read listener address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server error");
    });
    addr
}
