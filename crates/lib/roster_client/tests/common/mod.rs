//! In-process mock of the Roster backend.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use roster_client::{ApiClient, ClientConfig, Navigator, QueryCache, RetryPolicy, RosterService};
use roster_core::session::{Credentials, SessionStore};
use roster_core::storage::{KeyValueStore, MemoryStore};
use serde_json::{Value, json};

pub const GOOD_TOKEN: &str = "good-token";

#[derive(Default)]
pub struct MockState {
    pub character_hits: AtomicUsize,
    pub users_hits: AtomicUsize,
    pub last_body: Mutex<Option<Value>>,
}

/// Records every redirect instead of performing it.
#[derive(Default)]
pub struct RecordingNavigator {
    pub redirects: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, location: &str) {
        self.redirects.lock().unwrap().push(location.to_string());
    }
}

pub struct Harness {
    pub service: RosterService,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub state: Arc<MockState>,
}

impl Harness {
    pub fn sign_in(&self, token: &str) {
        self.service
            .client()
            .session()
            .save(&Credentials {
                access_token: token.to_string(),
                refresh_token: "refresh".to_string(),
            })
            .unwrap();
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.store.get(name).unwrap().is_some()
    }
}

pub fn character_json(id: &str, server_id: i32, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "level": 5,
        "cash": 100,
        "bank": 2000,
        "server_id": server_id,
        "user_id": 42,
        "created_at": "2024-03-01T12:00:00Z",
        "updated_at": "2024-03-01T12:00:00Z",
        "pet": {"has_pet": true, "expires_at": null}
    })
}

fn user_json(id: u64, role: &str) -> Value {
    json!({
        "id": id,
        "discord_id": format!("discord-{id}"),
        "username": format!("user{id}"),
        "discriminator": "0001",
        "avatar": "abc",
        "role": role,
        "created_at": "2024-01-01T00:00:00Z"
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {GOOD_TOKEN}"))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "token expired"}))).into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(user_json(1, "admin")).into_response()
}

async fn users(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.users_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!([user_json(1, "admin"), user_json(2, "user")])).into_response()
}

async fn update_role(
    State(state): State<Arc<MockState>>,
    Path(_id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    *state.last_body.lock().unwrap() = Some(body);
    StatusCode::NO_CONTENT
}

async fn characters(
    State(state): State<Arc<MockState>>,
    Path(server_id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.character_hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(30)).await;
    Json(json!([
        character_json(&format!("s{server_id}-a"), server_id, "Alpha"),
        character_json(&format!("s{server_id}-b"), server_id, "Bravo"),
    ]))
    .into_response()
}

async fn create_character(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> Response {
    *state.last_body.lock().unwrap() = Some(body.clone());
    let server_id = body["server_id"].as_i64().unwrap_or_default() as i32;
    let name = body["name"].as_str().unwrap_or_default();
    (StatusCode::CREATED, Json(character_json("new-1", server_id, name))).into_response()
}

async fn update_character(Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    let name = body["name"].as_str().unwrap_or_default();
    Json(character_json(&id, 1, name)).into_response()
}

async fn delete_character(Path(_id): Path<String>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "content_type": header("content-type"),
        "x_requested_with": header("x-requested-with"),
        "cache_control": header("cache-control"),
        "authorization": header("authorization"),
    }))
}

async fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"message": "name is required"}))).into_response()
}

async fn broken() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "oops").into_response()
}

/// Start the mock backend and a service pointed at it.
pub async fn start() -> Harness {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/me", get(me))
        .route("/admin/users", get(users))
        .route("/admin/users/{id}/role", post(update_role))
        .route("/servers/{server_id}/characters", get(characters))
        .route("/characters", post(create_character))
        .route("/characters/{id}", put(update_character).delete(delete_character))
        .route("/headers", get(echo_headers))
        .route("/bad-request", get(bad_request))
        .route("/broken", get(broken))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let store = Arc::new(MemoryStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let config = ClientConfig::from_env().with_base_url(&format!("http://{addr}"));
    let client = ApiClient::new(
        &config,
        SessionStore::new(store.clone()),
        navigator.clone(),
    )
    .unwrap();
    let service = RosterService::new(client, Arc::new(QueryCache::new()), RetryPolicy::none());

    Harness {
        service,
        store,
        navigator,
        state,
    }
}
