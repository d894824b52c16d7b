use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

use common::config::{RetryConfig, StorageConfig};
use planta::PlantaConfig;
use server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ServerConfig, SyncConfig,
};
use server::seed::{BootstrapToken, seed_sync_token};
use server::state::AppState;
use server::sync::SyncService;

pub const SYNC_KEY: &str = "test-sync-key";

pub mod routes {
    pub const SYNC: &str = "/api/v1/sync";
    pub const SYNC_ALIAS: &str = "/sync";
    pub const PLANTS: &str = "/api/v1/plants";
    pub const HEALTH: &str = "/api/v1/health";

    pub fn plant(id: &str) -> String {
        format!("/api/v1/plants/{id}")
    }
}

/// Fake plant API: serves canned plants in pages, rotates tokens, hosts images.
#[derive(Default)]
pub struct FakePlanta {
    pub plants: Mutex<Vec<Value>>,
    pub page_size: Mutex<usize>,
    /// When set, `GET /v1/addedPlants` answers with this status.
    pub plants_status: Mutex<Option<u16>>,
    /// When set, the refresh endpoint answers with this status.
    pub refresh_status: Mutex<Option<u16>>,
    pub images: Mutex<HashMap<String, Vec<u8>>>,
    pub plants_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub refresh_bodies: Mutex<Vec<Value>>,
    pub seen_auth: Mutex<Vec<String>>,
}

impl FakePlanta {
    pub fn total_calls(&self) -> usize {
        self.plants_calls.load(Ordering::SeqCst)
            + self.refresh_calls.load(Ordering::SeqCst)
            + self.image_calls.load(Ordering::SeqCst)
    }

    pub fn set_plants(&self, plants: Vec<Value>) {
        *self.plants.lock().unwrap() = plants;
    }

    pub fn add_image(&self, name: &str, bytes: &[u8]) {
        self.images
            .lock()
            .unwrap()
            .insert(name.to_string(), bytes.to_vec());
    }
}

async fn added_plants(
    State(fake): State<Arc<FakePlanta>>,
    headers: axum::http::HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    fake.plants_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        fake.seen_auth.lock().unwrap().push(auth.to_string());
    }
    if let Some(status) = *fake.plants_status.lock().unwrap() {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, axum::Json(json!({"error": "scripted"}))).into_response();
    }

    let plants = fake.plants.lock().unwrap().clone();
    let page_size = (*fake.page_size.lock().unwrap()).max(1);
    let start: usize = query
        .get("cursor")
        .and_then(|c| c.strip_prefix("page-"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);
    let end = (start + page_size).min(plants.len());
    let next = (end < plants.len()).then(|| format!("page-{end}"));

    axum::Json(json!({
        "status": 200,
        "data": plants.get(start..end).unwrap_or(&[]),
        "pagination": {"nextPage": next},
    }))
    .into_response()
}

async fn refresh_token(
    State(fake): State<Arc<FakePlanta>>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let n = fake.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
    fake.refresh_bodies.lock().unwrap().push(body);
    if let Some(status) = *fake.refresh_status.lock().unwrap() {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, axum::Json(json!({"error": "scripted"}))).into_response();
    }
    axum::Json(json!({
        "status": 200,
        "data": {
            "accessToken": format!("access-{n}"),
            "refreshToken": format!("refresh-{n}"),
            "tokenType": "Bearer",
            "expiresAt": (Utc::now() + Duration::days(7)).to_rfc3339(),
        }
    }))
    .into_response()
}

async fn image(State(fake): State<Arc<FakePlanta>>, Path(name): Path<String>) -> Response {
    fake.image_calls.fetch_add(1, Ordering::SeqCst);
    match fake.images.lock().unwrap().get(&name) {
        Some(bytes) => (StatusCode::OK, bytes.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_fake_planta() -> (Arc<FakePlanta>, String) {
    let fake = Arc::new(FakePlanta {
        page_size: Mutex::new(2),
        ..Default::default()
    });
    let app = Router::new()
        .route("/v1/addedPlants", get(added_plants))
        .route("/v1/auth/refreshToken", post(refresh_token))
        .route("/images/{name}", get(image))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake plant API");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (fake, format!("http://{addr}"))
}

/// JSON for a remote plant, optionally with an image hosted by the fake API.
pub fn remote_plant(id: &str, image: Option<(&str, &str)>, planta_url: &str) -> Value {
    json!({
        "id": id,
        "names": {
            "localizedName": format!("Plant {id}"),
            "variety": null,
            "custom": null,
            "scientific": "Epipremnum aureum",
        },
        "site": {"id": "site-1", "name": "Living room"},
        "image": image.map(|(name, last_updated)| json!({
            "url": format!("{planta_url}/images/{name}"),
            "lastUpdated": last_updated,
        })),
    })
}

/// A running test server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub planta: Arc<FakePlanta>,
    pub planta_url: String,
    _dir: tempfile::TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let (planta, planta_url) = spawn_fake_planta().await;

        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let db = server::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig { url: db_url },
            auth: AuthConfig {
                sync_api_key: SYNC_KEY.to_string(),
            },
            planta: PlantaConfig {
                base_url: planta_url.clone(),
                request_timeout_secs: 5,
                ..Default::default()
            },
            retry: RetryConfig {
                max_attempts: 3,
                base_delay_ms: 1,
            },
            storage: StorageConfig {
                root: dir.path().join("photos"),
                public_base_url: format!("http://{addr}/photos"),
                ..Default::default()
            },
            sync: SyncConfig::default(),
        };

        let storage = common::storage::build_object_store(&app_config.storage)
            .await
            .expect("Failed to create photo store");
        let sync = SyncService::from_config(db.clone(), &app_config, storage)
            .expect("Failed to build sync service");

        let state = AppState {
            db: db.clone(),
            config: Arc::new(app_config),
            sync: Arc::new(sync),
        };
        let app = server::build_router(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            planta,
            planta_url,
            _dir: dir,
        }
    }

    /// Spawn with a sync token that stays valid for a day.
    pub async fn spawn_with_token() -> Self {
        let app = Self::spawn().await;
        app.seed_token(Utc::now() + Duration::days(1)).await;
        app
    }

    pub async fn seed_token(&self, expires_at: DateTime<Utc>) {
        seed_sync_token(
            &self.db,
            &BootstrapToken {
                access_token: "access-0".into(),
                refresh_token: "refresh-0".into(),
                expires_at,
            },
        )
        .await
        .expect("Failed to seed sync token");
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_with_header(&self, path: &str, authorization: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", authorization)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    /// Trigger a sync with the configured key and expect HTTP 200.
    pub async fn sync(&self) -> TestResponse {
        let res = self.post_with_token(routes::SYNC, SYNC_KEY).await;
        assert_eq!(res.status, 200, "sync failed: {}", res.text);
        res
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }
}
