//! In-process fake of the plant API for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::token::{StoredToken, TokenPair, TokenStore, TokenStoreError};

enum Canned {
    Json(Value),
    Bytes(Vec<u8>),
}

#[derive(Default)]
struct Seen {
    bodies: Vec<Value>,
    queries: Vec<Option<String>>,
    auth: Vec<Option<String>>,
}

/// Queue of canned responses for one route, plus what the route received.
#[derive(Default)]
pub struct Script {
    responses: Mutex<VecDeque<(StatusCode, Canned)>>,
    calls: AtomicUsize,
    seen: Mutex<Seen>,
}

impl Script {
    pub fn push(&self, status: StatusCode, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back((status, Canned::Json(body)));
    }

    pub fn push_bytes(&self, status: StatusCode, body: &[u8]) {
        self.responses
            .lock()
            .unwrap()
            .push_back((status, Canned::Bytes(body.to_vec())));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.seen.lock().unwrap().bodies.clone()
    }

    pub fn queries(&self) -> Vec<Option<String>> {
        self.seen.lock().unwrap().queries.clone()
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.seen.lock().unwrap().auth.clone()
    }
}

async fn scripted(
    State(script): State<Arc<Script>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    script.calls.fetch_add(1, Ordering::SeqCst);
    {
        let mut seen = script.seen.lock().unwrap();
        seen.bodies
            .push(serde_json::from_slice(&body).unwrap_or(Value::Null));
        seen.queries.push(query.get("cursor").cloned());
        seen.auth.push(
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
    }

    let next = script.responses.lock().unwrap().pop_front();
    match next {
        Some((status, Canned::Json(value))) => (status, axum::Json(value)).into_response(),
        Some((status, Canned::Bytes(bytes))) => (status, bytes).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "no scripted response").into_response(),
    }
}

pub struct FakePlanta {
    addr: std::net::SocketAddr,
    pub refresh: Arc<Script>,
    pub plants: Arc<Script>,
    pub images: Arc<Script>,
}

impl FakePlanta {
    pub async fn start() -> Self {
        let refresh = Arc::new(Script::default());
        let plants = Arc::new(Script::default());
        let images = Arc::new(Script::default());

        let app = Router::new()
            .merge(
                Router::new()
                    .route("/v1/auth/refreshToken", post(scripted))
                    .with_state(refresh.clone()),
            )
            .merge(
                Router::new()
                    .route("/v1/addedPlants", get(scripted))
                    .with_state(plants.clone()),
            )
            .merge(
                Router::new()
                    .route("/images/{*path}", get(scripted))
                    .with_state(images.clone()),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            refresh,
            plants,
            images,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn image_url(&self, name: &str) -> String {
        format!("http://{}/images/{name}", self.addr)
    }
}

pub fn token_response(access: &str, refresh: &str, expires_at: DateTime<Utc>) -> Value {
    json!({
        "status": 200,
        "data": {
            "accessToken": access,
            "refreshToken": refresh,
            "tokenType": "Bearer",
            "expiresAt": expires_at.to_rfc3339(),
        }
    })
}

pub fn plant_json(id: &str, image: Option<(&str, &str)>) -> Value {
    json!({
        "id": id,
        "names": {"localizedName": format!("Plant {id}"), "variety": null, "custom": null, "scientific": null},
        "site": {"id": "site-1", "name": "Kitchen"},
        "image": image.map(|(url, last_updated)| json!({"url": url, "lastUpdated": last_updated})),
    })
}

/// Token store kept in memory, optionally failing every write.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<StoredToken>>,
    fail_writes: AtomicBool,
}

impl MemoryTokenStore {
    pub fn with_token(access: &str, refresh: &str, expires_at: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            token: Mutex::new(Some(StoredToken {
                access_token: access.into(),
                refresh_token: refresh.into(),
                expires_at,
                version: 0,
            })),
            fail_writes: AtomicBool::new(false),
        })
    }

    pub fn current(&self) -> Option<StoredToken> {
        self.token.lock().unwrap().clone()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<StoredToken>, TokenStoreError> {
        Ok(self.current())
    }

    async fn replace(&self, expected_version: i32, pair: &TokenPair) -> Result<(), TokenStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TokenStoreError::Backend("disk full".into()));
        }
        let mut guard = self.token.lock().unwrap();
        match guard.as_ref() {
            Some(current) if current.version == expected_version => {
                *guard = Some(StoredToken {
                    access_token: pair.access_token.clone(),
                    refresh_token: pair.refresh_token.clone(),
                    expires_at: pair.expires_at,
                    version: expected_version + 1,
                });
                Ok(())
            }
            _ => Err(TokenStoreError::Conflict { expected_version }),
        }
    }
}
