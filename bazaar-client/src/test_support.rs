// In-process stand-in for the Bazaar REST API, used by the client tests

use crate::api::ApiClient;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Value, json};
use shared::config::ClientConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const VIEWER_ID: &str = "v1";

#[derive(Default)]
struct Inner {
    access_token: Option<String>,
    refresh_token: Option<String>,
    refresh_delay: Option<Duration>,
    refresh_allowed: bool,
    reject_all: bool,
    token_serial: u32,
    follows: HashMap<(String, String), bool>,
    csrf_seen: Vec<Option<String>>,
    refresh_calls: usize,
    status_calls: usize,
    batch_calls: usize,
    batch_sizes: Vec<usize>,
    list_queries: Vec<HashMap<String, String>>,
}

#[derive(Clone, Default)]
pub(crate) struct MockState {
    inner: Arc<Mutex<Inner>>,
}

impl MockState {
    pub fn expire_access(&self) {
        self.inner.lock().access_token = None;
    }

    pub fn revoke_refresh(&self) {
        self.inner.lock().refresh_allowed = false;
    }

    /// Hold every refresh-token exchange for `delay` before answering
    pub fn delay_refresh(&self, delay: Duration) {
        self.inner.lock().refresh_delay = Some(delay);
    }

    pub fn reject_all(&self) {
        self.inner.lock().reject_all = true;
    }

    pub fn set_follow(&self, target_id: &str, target_type: &str, is_following: bool) {
        self.inner
            .lock()
            .follows
            .insert((target_id.to_string(), target_type.to_string()), is_following);
    }

    pub fn is_following(&self, target_id: &str, target_type: &str) -> bool {
        self.inner
            .lock()
            .follows
            .get(&(target_id.to_string(), target_type.to_string()))
            .copied()
            .unwrap_or(false)
    }

    pub fn last_csrf(&self) -> Option<String> {
        self.inner.lock().csrf_seen.last().cloned().flatten()
    }

    pub fn refresh_calls(&self) -> usize {
        self.inner.lock().refresh_calls
    }

    pub fn status_calls(&self) -> usize {
        self.inner.lock().status_calls
    }

    pub fn batch_calls(&self) -> usize {
        self.inner.lock().batch_calls
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.inner.lock().batch_sizes.clone()
    }

    pub fn last_list_query(&self) -> Option<HashMap<String, String>> {
        self.inner.lock().list_queries.last().cloned()
    }

    /// Issue fresh access, refresh and CSRF tokens, returning their cookies.
    /// Refresh tokens are single-use: issuing a new one revokes the last.
    fn issue_tokens(&self) -> [(header::HeaderName, String); 3] {
        let mut inner = self.inner.lock();
        inner.token_serial += 1;
        let access = format!("access-{}", inner.token_serial);
        let refresh = format!("refresh-{}", inner.token_serial);
        inner.access_token = Some(access.clone());
        inner.refresh_token = Some(refresh.clone());
        [
            (header::SET_COOKIE, format!("accessToken={access}; Path=/; HttpOnly")),
            (header::SET_COOKIE, format!("refreshToken={refresh}; Path=/; HttpOnly")),
            (
                header::SET_COOKIE,
                format!("csrfToken=csrf-{}; Path=/", inner.token_serial),
            ),
        ]
    }

    /// Record the CSRF header and check the access cookie
    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let mut inner = self.inner.lock();
        inner.csrf_seen.push(
            headers
                .get("x-csrf-token")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );

        let presented = cookie(headers, "accessToken");
        let valid = !inner.reject_all
            && inner.access_token.is_some()
            && presented == inner.access_token;
        if valid {
            Ok(())
        } else {
            Err(unauthorized("jwt expired"))
        }
    }
}

fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"success": false, "message": message})),
    )
        .into_response()
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): State<MockState>, Json(body): Json<LoginBody>) -> Response {
    if body.password != "secret" {
        return unauthorized("Invalid credentials");
    }
    state.inner.lock().refresh_allowed = true;
    let cookies = state.issue_tokens();
    (
        AppendHeaders(cookies),
        Json(json!({
            "success": true,
            "data": {"_id": VIEWER_ID, "username": "viewer", "email": body.email}
        })),
    )
        .into_response()
}

async fn refresh(State(state): State<MockState>, headers: HeaderMap) -> Response {
    let delay = state.inner.lock().refresh_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let allowed = {
        let mut inner = state.inner.lock();
        inner.refresh_calls += 1;
        inner.refresh_allowed
            && inner.refresh_token.is_some()
            && cookie(&headers, "refreshToken") == inner.refresh_token
    };
    if !allowed {
        return unauthorized("Refresh token expired");
    }
    let cookies = state.issue_tokens();
    (AppendHeaders(cookies), Json(json!({"success": true}))).into_response()
}

async fn logout(State(state): State<MockState>) -> Response {
    let mut inner = state.inner.lock();
    inner.access_token = None;
    inner.refresh_token = None;
    inner.refresh_allowed = false;
    Json(json!({"success": true, "message": "Logged out"})).into_response()
}

async fn status(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path((target_id, target_type)): Path<(String, String)>,
) -> Response {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    state.inner.lock().status_calls += 1;
    let is_following = state.is_following(&target_id, &target_type);
    Json(json!({"success": true, "data": {"isFollowing": is_following}})).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Target {
    target_id: String,
    target_type: String,
}

async fn toggle(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(target): Json<Target>,
) -> Response {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    if target.target_id == VIEWER_ID && target.target_type == "user" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "You cannot follow yourself"})),
        )
            .into_response();
    }
    let next = !state.is_following(&target.target_id, &target.target_type);
    state.set_follow(&target.target_id, &target.target_type, next);
    Json(json!({"success": true, "data": {"isFollowing": next}})).into_response()
}

#[derive(Deserialize)]
struct BatchBody {
    targets: Vec<Target>,
}

async fn batch_status(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<BatchBody>,
) -> Response {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    {
        let mut inner = state.inner.lock();
        inner.batch_calls += 1;
        inner.batch_sizes.push(body.targets.len());
    }
    let data: serde_json::Map<String, Value> = body
        .targets
        .iter()
        .map(|t| {
            (
                format!("{}_{}", t.target_id, t.target_type),
                Value::Bool(state.is_following(&t.target_id, &t.target_type)),
            )
        })
        .collect();
    Json(json!({"success": true, "data": data})).into_response()
}

async fn follow_list(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path((slug, list_type)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    state.inner.lock().list_queries.push(query.clone());
    if list_type != "followers" && list_type != "following" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "Invalid list type"})),
        )
            .into_response();
    }

    let mut list = vec![
        json!({"_id": format!("{slug}-fan"), "username": "fan", "type": "user", "isFollowing": true}),
        json!({"_id": "corner", "shopName": "Corner Shop", "type": "shop", "slug": "corner", "isFollowing": false}),
    ];
    if let Some(entity_type) = query.get("entityType") {
        list.retain(|row| row["type"] == entity_type.as_str());
    }
    Json(json!({"success": true, "data": {"list": list}})).into_response()
}

pub(crate) struct MockServer {
    pub base_url: String,
    pub state: MockState,
}

impl MockServer {
    pub async fn start() -> Self {
        let state = MockState::default();
        let router = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/refresh-token", post(refresh))
            .route("/api/auth/logout", post(logout))
            .route("/api/follow/toggle", post(toggle))
            .route("/api/follow/batch-status", post(batch_status))
            .route("/api/follow/status/{target_id}/{target_type}", get(status))
            .route("/api/follow/{slug}/{list_type}", get(follow_list))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_base_url: self.base_url.clone(),
            ..ClientConfig::default()
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config()).unwrap()
    }
}
