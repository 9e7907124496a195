//! Integration test support for the Pitii client.
//!
//! [`MockBackend`] is an in-process stand-in for the menu backend: an axum
//! router serving the same `/api/...` routes over in-memory state, bound to
//! an ephemeral port on `127.0.0.1`. Tests drive the real client, stores and
//! views against it and then inspect what the backend saw.
//!
//! # Switches
//!
//! - [`MockBackend::fail`] makes an endpoint answer with a given status and body
//! - [`MockBackend::delay`] holds an endpoint's response back
//! - [`MockBackend::enforce_auth`] rejects writes without a issued bearer token
//! - [`MockBackend::set_session_ttl`] controls the expiry of issued tokens
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pitii-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Multipart, Path, Request, State};
use axum::http::{Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use pitii_client::config::StaffCredentials;
use pitii_client::{Access, ApiClient, ClientConfig, session};
use pitii_core::{Email, Ingredient, IngredientId, Price, Product, ProductId, User, UserId};

/// Email the mock accepts on `/api/login`.
pub const STAFF_EMAIL: &str = "staff@pitii.test";

/// Password the mock accepts on `/api/login`.
pub const STAFF_PASSWORD: &str = "correct horse battery";

/// Prefix of the URL the mock assigns to uploaded images.
pub const CDN_BASE: &str = "https://cdn.pitii.test/images";

/// Backend routes, for failure and delay switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListProducts,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    ListIngredients,
    CreateIngredient,
    DeleteIngredient,
    ListUsers,
    CreateUser,
    UpdateUser,
    DeleteUser,
    Register,
    Login,
}

/// A request as the backend received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    /// Bearer token from the `Authorization` header, if any.
    pub bearer: Option<String>,
}

/// Multipart body of a product create or update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceivedForm {
    /// Text fields by name (`name`, `price`, `imageUrl`).
    pub fields: BTreeMap<String, String>,
    /// The `image` file part, if one was sent.
    pub image: Option<ReceivedImage>,
}

/// Metadata of an uploaded image part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedImage {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

#[derive(Debug, Clone)]
struct Failure {
    status: StatusCode,
    body: String,
}

impl Failure {
    fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    fn bad_request(message: impl std::fmt::Display) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            json!({ "error": message.to_string() }).to_string(),
        )
    }

    fn not_found(what: impl std::fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            json!({ "error": format!("{what} not found") }).to_string(),
        )
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response()
    }
}

#[derive(Debug)]
struct Db {
    products: Vec<Product>,
    ingredients: HashMap<ProductId, Vec<Ingredient>>,
    users: Vec<User>,
    next_product: i64,
    next_ingredient: i64,
    next_user: i64,
    staff: User,
    tokens: HashSet<String>,
    session_ttl: chrono::Duration,
    enforce_auth: bool,
    failures: HashMap<Endpoint, Failure>,
    delays: HashMap<Endpoint, Duration>,
    product_forms: Vec<ReceivedForm>,
    requests: Vec<ReceivedRequest>,
}

impl Db {
    fn new() -> Self {
        let staff = User {
            id: UserId::new(1000),
            name: "Staff".to_owned(),
            email: Email::parse(STAFF_EMAIL).expect("staff email is valid"),
        };
        Self {
            products: Vec::new(),
            ingredients: HashMap::new(),
            users: Vec::new(),
            next_product: 1,
            next_ingredient: 1,
            next_user: 1,
            staff,
            tokens: HashSet::new(),
            session_ttl: chrono::Duration::hours(1),
            enforce_auth: false,
            failures: HashMap::new(),
            delays: HashMap::new(),
            product_forms: Vec::new(),
            requests: Vec::new(),
        }
    }

    fn product_id(&mut self) -> ProductId {
        let id = ProductId::new(self.next_product);
        self.next_product += 1;
        id
    }

    fn ingredient_id(&mut self) -> IngredientId {
        let id = IngredientId::new(self.next_ingredient);
        self.next_ingredient += 1;
        id
    }

    fn user_id(&mut self) -> UserId {
        let id = UserId::new(self.next_user);
        self.next_user += 1;
        id
    }

    fn has_product(&self, id: ProductId) -> bool {
        self.products.iter().any(|p| p.id == id)
    }
}

#[derive(Clone)]
struct Backend(Arc<Mutex<Db>>);

impl Backend {
    fn lock(&self) -> MutexGuard<'_, Db> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply the delay and failure switches for `endpoint`.
    async fn gate(&self, endpoint: Endpoint) -> Result<(), Failure> {
        let (delay, failure) = {
            let db = self.lock();
            (
                db.delays.get(&endpoint).copied(),
                db.failures.get(&endpoint).cloned(),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        failure.map_or(Ok(()), Err)
    }
}

/// In-process mock of the menu backend.
pub struct MockBackend {
    addr: SocketAddr,
    backend: Backend,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start the mock on an ephemeral port.
    pub async fn start() -> Self {
        let backend = Backend(Arc::new(Mutex::new(Db::new())));
        let app = router(backend.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "mock backend stopped");
            }
        });

        Self {
            addr,
            backend,
            server,
        }
    }

    /// Origin the mock listens on.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at the mock, with staff credentials set.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        let mut config =
            ClientConfig::for_base_url(&self.base_url()).expect("mock base URL is valid");
        config.staff = Some(StaffCredentials {
            email: STAFF_EMAIL.to_owned(),
            password: SecretString::from(STAFF_PASSWORD),
        });
        config
    }

    /// An anonymous client for the mock.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config()).expect("Failed to build client")
    }

    /// An anonymous client for the mock that gives up after `timeout`.
    #[must_use]
    pub fn client_with_timeout(&self, timeout: Duration) -> ApiClient {
        let mut config = self.config();
        config.timeout = timeout;
        ApiClient::new(&config).expect("Failed to build client")
    }

    /// Log in with the mock's staff account.
    pub async fn staff(&self) -> Access {
        let session = session::login(
            &self.client(),
            STAFF_EMAIL,
            &SecretString::from(STAFF_PASSWORD),
        )
        .await
        .expect("Staff login failed");
        Access::Staff(session)
    }

    /// Insert a product directly into the backend state.
    pub fn seed_product(&self, name: &str, price: &str, image_url: Option<&str>) -> Product {
        let mut db = self.backend.lock();
        let product = Product {
            id: db.product_id(),
            name: name.to_owned(),
            price: Price::parse(price).expect("seed price is valid"),
            image_url: image_url.map(str::to_owned),
        };
        db.products.push(product.clone());
        product
    }

    /// Insert an ingredient directly into the backend state.
    pub fn seed_ingredient(&self, product: ProductId, name: &str) -> Ingredient {
        let mut db = self.backend.lock();
        let ingredient = Ingredient {
            id: db.ingredient_id(),
            name: name.to_owned(),
        };
        db.ingredients
            .entry(product)
            .or_default()
            .push(ingredient.clone());
        ingredient
    }

    /// Insert a user directly into the backend state.
    pub fn seed_user(&self, name: &str, email: &str) -> User {
        let mut db = self.backend.lock();
        let user = User {
            id: db.user_id(),
            name: name.to_owned(),
            email: Email::parse(email).expect("seed email is valid"),
        };
        db.users.push(user.clone());
        user
    }

    /// Products as the backend stores them.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.backend.lock().products.clone()
    }

    /// Ingredients of `product` as the backend stores them.
    #[must_use]
    pub fn ingredients(&self, product: ProductId) -> Vec<Ingredient> {
        self.backend
            .lock()
            .ingredients
            .get(&product)
            .cloned()
            .unwrap_or_default()
    }

    /// Users as the backend stores them.
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.backend.lock().users.clone()
    }

    /// Make `endpoint` answer with `status` and `body` until [`recover`](Self::recover).
    pub fn fail(&self, endpoint: Endpoint, status: u16, body: impl Into<String>) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.backend
            .lock()
            .failures
            .insert(endpoint, Failure::new(status, body));
    }

    /// Let `endpoint` succeed again.
    pub fn recover(&self, endpoint: Endpoint) {
        self.backend.lock().failures.remove(&endpoint);
    }

    /// Hold `endpoint`'s responses back by `delay`.
    pub fn delay(&self, endpoint: Endpoint, delay: Duration) {
        self.backend.lock().delays.insert(endpoint, delay);
    }

    /// Reject writes that carry no token issued by `/api/login`.
    pub fn enforce_auth(&self, on: bool) {
        self.backend.lock().enforce_auth = on;
    }

    /// Lifetime of tokens issued from now on. Negative values issue expired tokens.
    pub fn set_session_ttl(&self, ttl: chrono::Duration) {
        self.backend.lock().session_ttl = ttl;
    }

    /// Every product form received, oldest first.
    #[must_use]
    pub fn product_forms(&self) -> Vec<ReceivedForm> {
        self.backend.lock().product_forms.clone()
    }

    /// Every request received, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<ReceivedRequest> {
        self.backend.lock().requests.clone()
    }

    /// Requests received with `method` on `path`.
    #[must_use]
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<ReceivedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A client whose every request fails at the transport level.
#[must_use]
pub fn unreachable_client() -> ApiClient {
    let config = ClientConfig::for_base_url("http://127.0.0.1:1").expect("URL is valid");
    ApiClient::new(&config).expect("Failed to build client")
}

/// Log lines captured by [`capture_logs`].
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Everything logged so far.
    #[must_use]
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// How many times `needle` was logged.
    #[must_use]
    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Capture log output on the current thread until the guard is dropped.
///
/// `#[tokio::test]` runs on a single thread, so everything the test awaits is
/// captured.
#[must_use]
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    (capture, tracing::subscriber::set_default(subscriber))
}

fn router(backend: Backend) -> Router {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            put(update_product).delete(delete_product),
        )
        .route(
            "/api/products/{id}/ingredients",
            get(list_ingredients).post(create_ingredient),
        )
        .route(
            "/api/products/{id}/ingredients/{ingredient_id}",
            delete(delete_ingredient),
        )
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", put(update_user).delete(delete_user))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .layer(middleware::from_fn_with_state(
            backend.clone(),
            record_request,
        ))
        .with_state(backend)
}

async fn record_request(State(backend): State<Backend>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned);

    let rejected = {
        let mut db = backend.lock();
        db.requests.push(ReceivedRequest {
            method: method.to_string(),
            path: path.clone(),
            bearer: bearer.clone(),
        });

        let public = method == Method::GET || path == "/api/login" || path == "/api/register";
        db.enforce_auth && !public && !bearer.is_some_and(|t| db.tokens.contains(&t))
    };

    if rejected {
        return Failure::new(StatusCode::UNAUTHORIZED, r#"{"error":"unauthorized"}"#)
            .into_response();
    }
    next.run(request).await
}

// ============================================================================
// Products
// ============================================================================

async fn list_products(State(backend): State<Backend>) -> Result<Json<Vec<Product>>, Failure> {
    backend.gate(Endpoint::ListProducts).await?;
    Ok(Json(backend.lock().products.clone()))
}

async fn read_product_form(mut multipart: Multipart) -> Result<ReceivedForm, Failure> {
    let mut form = ReceivedForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(Failure::bad_request)?
    {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "image" {
            let file_name = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field.bytes().await.map_err(Failure::bad_request)?;
            form.image = Some(ReceivedImage {
                file_name,
                content_type,
                len: bytes.len(),
            });
        } else {
            let text = field.text().await.map_err(Failure::bad_request)?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}

fn product_from_form(id: ProductId, form: &ReceivedForm) -> Result<Product, Failure> {
    let name = form
        .fields
        .get("name")
        .ok_or_else(|| Failure::bad_request("name is required"))?;
    let price = form
        .fields
        .get("price")
        .ok_or_else(|| Failure::bad_request("price is required"))?;
    let price = Price::parse(price).map_err(Failure::bad_request)?;

    let image_url = match (&form.image, form.fields.get("imageUrl")) {
        (Some(image), _) => Some(format!(
            "{CDN_BASE}/{}",
            image.file_name.as_deref().unwrap_or("upload")
        )),
        (None, Some(url)) => Some(url.clone()),
        (None, None) => None,
    };

    Ok(Product {
        id,
        name: name.clone(),
        price,
        image_url,
    })
}

async fn create_product(
    State(backend): State<Backend>,
    multipart: Multipart,
) -> Result<Json<Product>, Failure> {
    backend.gate(Endpoint::CreateProduct).await?;
    let form = read_product_form(multipart).await?;

    let mut db = backend.lock();
    db.product_forms.push(form.clone());
    let id = db.product_id();
    let product = product_from_form(id, &form)?;
    db.products.push(product.clone());
    Ok(Json(product))
}

async fn update_product(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<Product>, Failure> {
    backend.gate(Endpoint::UpdateProduct).await?;
    let form = read_product_form(multipart).await?;
    let id = ProductId::new(id);

    let mut db = backend.lock();
    db.product_forms.push(form.clone());
    let product = product_from_form(id, &form)?;
    let slot = db
        .products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| Failure::not_found(format!("product {id}")))?;
    *slot = product.clone();
    Ok(Json(product))
}

async fn delete_product(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Failure> {
    backend.gate(Endpoint::DeleteProduct).await?;
    let id = ProductId::new(id);

    let mut db = backend.lock();
    if !db.has_product(id) {
        return Err(Failure::not_found(format!("product {id}")));
    }
    db.products.retain(|p| p.id != id);
    db.ingredients.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Ingredients
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewIngredient {
    ingredient_name: String,
}

async fn list_ingredients(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Ingredient>>, Failure> {
    backend.gate(Endpoint::ListIngredients).await?;
    let id = ProductId::new(id);

    let db = backend.lock();
    if !db.has_product(id) {
        return Err(Failure::not_found(format!("product {id}")));
    }
    Ok(Json(db.ingredients.get(&id).cloned().unwrap_or_default()))
}

async fn create_ingredient(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    Json(body): Json<NewIngredient>,
) -> Result<Json<Ingredient>, Failure> {
    backend.gate(Endpoint::CreateIngredient).await?;
    let id = ProductId::new(id);

    let name = body.ingredient_name.trim();
    if name.is_empty() {
        return Err(Failure::bad_request("ingredientName is required"));
    }

    let mut db = backend.lock();
    if !db.has_product(id) {
        return Err(Failure::not_found(format!("product {id}")));
    }
    let ingredient = Ingredient {
        id: db.ingredient_id(),
        name: name.to_owned(),
    };
    db.ingredients
        .entry(id)
        .or_default()
        .push(ingredient.clone());
    Ok(Json(ingredient))
}

async fn delete_ingredient(
    State(backend): State<Backend>,
    Path((id, ingredient_id)): Path<(i64, i64)>,
) -> Result<StatusCode, Failure> {
    backend.gate(Endpoint::DeleteIngredient).await?;
    let id = ProductId::new(id);
    let ingredient_id = IngredientId::new(ingredient_id);

    let mut db = backend.lock();
    let ingredients = db
        .ingredients
        .get_mut(&id)
        .ok_or_else(|| Failure::not_found(format!("product {id}")))?;
    let before = ingredients.len();
    ingredients.retain(|i| i.id != ingredient_id);
    if ingredients.len() == before {
        return Err(Failure::not_found(format!("ingredient {ingredient_id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Users and auth
// ============================================================================

#[derive(Deserialize)]
struct UserBody {
    name: String,
    email: String,
    password: Option<String>,
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

fn user_from_body(id: UserId, body: &UserBody) -> Result<User, Failure> {
    Ok(User {
        id,
        name: body.name.clone(),
        email: Email::parse(&body.email).map_err(Failure::bad_request)?,
    })
}

async fn list_users(State(backend): State<Backend>) -> Result<Json<Vec<User>>, Failure> {
    backend.gate(Endpoint::ListUsers).await?;
    Ok(Json(backend.lock().users.clone()))
}

fn insert_user(backend: &Backend, body: &UserBody) -> Result<User, Failure> {
    let mut db = backend.lock();
    let email = Email::parse(&body.email).map_err(Failure::bad_request)?;
    if db.users.iter().any(|u| u.email == email) {
        return Err(Failure::new(
            StatusCode::CONFLICT,
            json!({ "error": "Email already registered" }).to_string(),
        ));
    }
    let id = db.user_id();
    let user = user_from_body(id, body)?;
    db.users.push(user.clone());
    Ok(user)
}

async fn create_user(
    State(backend): State<Backend>,
    Json(body): Json<UserBody>,
) -> Result<Json<User>, Failure> {
    backend.gate(Endpoint::CreateUser).await?;
    Ok(Json(insert_user(&backend, &body)?))
}

async fn update_user(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    Json(body): Json<UserBody>,
) -> Result<Json<User>, Failure> {
    backend.gate(Endpoint::UpdateUser).await?;
    let id = UserId::new(id);
    let user = user_from_body(id, &body)?;

    let mut db = backend.lock();
    let slot = db
        .users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| Failure::not_found(format!("user {id}")))?;
    *slot = user.clone();
    Ok(Json(user))
}

async fn delete_user(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Failure> {
    backend.gate(Endpoint::DeleteUser).await?;
    let id = UserId::new(id);

    let mut db = backend.lock();
    let before = db.users.len();
    db.users.retain(|u| u.id != id);
    if db.users.len() == before {
        return Err(Failure::not_found(format!("user {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn register(
    State(backend): State<Backend>,
    Json(body): Json<UserBody>,
) -> Result<Json<User>, Failure> {
    backend.gate(Endpoint::Register).await?;
    if body.password.as_deref().is_none_or(str::is_empty) {
        return Err(Failure::bad_request("password is required"));
    }
    Ok(Json(insert_user(&backend, &body)?))
}

async fn login(
    State(backend): State<Backend>,
    Json(body): Json<LoginBody>,
) -> Result<Json<serde_json::Value>, Failure> {
    backend.gate(Endpoint::Login).await?;
    if body.email != STAFF_EMAIL || body.password != STAFF_PASSWORD {
        return Err(Failure::new(
            StatusCode::UNAUTHORIZED,
            json!({ "error": "invalid credentials" }).to_string(),
        ));
    }

    let mut db = backend.lock();
    let token = format!("token-{}", db.tokens.len() + 1);
    db.tokens.insert(token.clone());
    let expires_at = chrono::Utc::now() + db.session_ttl;

    Ok(Json(json!({
        "token": token,
        "expiresAt": expires_at.to_rfc3339(),
        "user": db.staff,
    })))
}
