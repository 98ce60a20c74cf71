//! In-process mock of the ramp registry API.
//!
//! Every test starts its own server on a free port so state never leaks
//! between tests. The mock keeps call counters and the bodies it received
//! so tests can assert on exactly what went over the wire.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use ramp_admin::config::AppConfig;
use ramp_admin::forms::SignInForm;
use ramp_admin::session::SessionStorage;
use ramp_admin::AppContext;

pub const PASSWORD: &str = "secret";
pub const EMAIL: &str = "admin@ramp.kr";
pub const REFRESH_COOKIE: &str = "refresh=r1";
pub const DISTRICTS: [&str; 3] = ["강남구", "마포구", "종로구"];
pub const TYPES: [&str; 2] = ["카페", "음식점"];

#[derive(Default)]
pub struct MockState {
    pub base_url: String,
    pub valid_token: Mutex<String>,
    pub ramps: Mutex<Vec<Value>>,
    next_id: AtomicI64,
    token_serial: AtomicUsize,

    /// Return the whole filtered collection instead of one page
    pub unpaginated: AtomicBool,
    pub refresh_fails: AtomicBool,
    pub delete_fails: AtomicBool,
    pub fail_put_for: Mutex<Option<String>>,

    pub sign_up_calls: AtomicUsize,
    pub sign_in_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub me_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub seen_me_tokens: Mutex<Vec<Option<String>>>,
    pub list_queries: Mutex<Vec<HashMap<String, String>>>,
    pub delete_bodies: Mutex<Vec<Value>>,
    pub created_bodies: Mutex<Vec<Value>>,
    pub presigned: Mutex<Vec<Value>>,
    /// (key, content type, byte length, carried credentials)
    pub puts: Mutex<Vec<(String, String, usize, bool)>>,
    pub excel_uploads: Mutex<Vec<(String, usize)>>,
    /// Call order across presign and PUT requests
    pub upload_log: Mutex<Vec<String>>,
}

impl MockState {
    /// Insert `n` records with ids 1..=n
    pub fn seed(&self, n: usize) {
        let mut ramps = self.ramps.lock().unwrap();
        for i in 0..n {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            ramps.push(json!({
                "id": id,
                "district": DISTRICTS[i % DISTRICTS.len()],
                "type": TYPES[i % TYPES.len()],
                "tradeName": format!("상호명 {}", id),
                "address": format!("서울 주소 {}", id),
                "width": 1.2,
                "imagesKeys": [],
                "createdAt": format!("2025-0{}-10T09:00:00Z", 1 + i % 3),
                "updatedAt": "2025.03.04",
            }));
        }
    }

    /// Make the current access token stale, as if it had expired
    pub fn expire_token(&self) {
        *self.valid_token.lock().unwrap() = "expired-by-test".to_string();
    }

    pub fn ramp_ids(&self) -> Vec<i64> {
        self.ramps
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r["id"].as_i64())
            .collect()
    }

    fn issue_token(&self) -> String {
        let n = self.token_serial.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("access-{}", n);
        *self.valid_token.lock().unwrap() = token.clone();
        token
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let expected = format!("Bearer {}", self.valid_token.lock().unwrap());
        let given = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
        if given == Some(expected.as_str()) && !expected.ends_with(' ') {
            Ok(())
        } else {
            Err(error(StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

pub struct MockApi {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockApi {
    pub fn config(&self) -> AppConfig {
        AppConfig::development().with_base_url(self.base_url.clone())
    }

    pub fn context(&self) -> AppContext {
        AppContext::in_memory(self.config()).expect("context")
    }

    pub fn context_with(&self, storage: Arc<dyn SessionStorage>) -> AppContext {
        AppContext::new(self.config(), storage).expect("context")
    }

    pub async fn signed_in(&self) -> Result<AppContext> {
        let context = self.context();
        context.account.sign_in(&credentials()).await?;
        Ok(context)
    }
}

pub fn credentials() -> SignInForm {
    SignInForm {
        email: EMAIL.to_string(),
        password: PASSWORD.to_string(),
    }
}

pub async fn start() -> Result<MockApi> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);
    let state = Arc::new(MockState {
        base_url: base_url.clone(),
        ..MockState::default()
    });

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind mock API")?;
    let app = router(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(MockApi { base_url, state })
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/users/me", get(me))
        .route("/users/:id", get(user_by_id))
        .route("/ramps", get(list_ramps).post(create_ramp).delete(delete_ramps))
        .route("/ramps/upload-excel", post(upload_excel))
        .route("/uploads/presigned", post(presign))
        .route("/storage/*key", put(storage_put))
        .with_state(state)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "statusCode": status.as_u16(), "message": message }))).into_response()
}

fn with_refresh_cookie(status: StatusCode, body: Value) -> Response {
    (
        status,
        [(header::SET_COOKIE, format!("{}; Path=/; HttpOnly", REFRESH_COOKIE))],
        Json(body),
    )
        .into_response()
}

async fn sign_up(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.sign_up_calls.fetch_add(1, Ordering::SeqCst);
    if body["email"] == "taken@ramp.kr" {
        return error(StatusCode::CONFLICT, "이미 가입된 이메일입니다.");
    }
    let token = state.issue_token();
    with_refresh_cookie(StatusCode::CREATED, json!({ "access_token": token }))
}

async fn sign_in(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.sign_in_calls.fetch_add(1, Ordering::SeqCst);
    if body["email"] != EMAIL || body["password"] != PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "이메일 또는 비밀번호가 올바르지 않습니다.");
    }
    let token = state.issue_token();
    with_refresh_cookie(StatusCode::OK, json!({ "access_token": token }))
}

async fn refresh(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let has_cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|c| c.split(';').any(|pair| pair.trim() == REFRESH_COOKIE))
        .unwrap_or(false);
    if !has_cookie || state.refresh_fails.load(Ordering::SeqCst) {
        return error(StatusCode::UNAUTHORIZED, "refresh token invalid");
    }
    let token = state.issue_token();
    Json(json!({ "token": token })).into_response()
}

async fn logout(State(state): State<Arc<MockState>>) -> Response {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, "refresh=; Path=/; Max-Age=0".to_string())],
        Json(json!({ "ok": true })),
    )
        .into_response()
}

async fn me(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.me_calls.fetch_add(1, Ordering::SeqCst);
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start_matches("Bearer ").to_string());
    state.seen_me_tokens.lock().unwrap().push(token);

    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    Json(json!({ "id": 1, "email": EMAIL, "name": "관리자", "phone": "010-1234-5678" })).into_response()
}

async fn user_by_id(State(state): State<Arc<MockState>>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    if id != 1 {
        return error(StatusCode::NOT_FOUND, "사용자를 찾을 수 없습니다.");
    }
    Json(json!({ "id": 1, "email": EMAIL, "name": "관리자", "nickname": "램프지기" })).into_response()
}

async fn list_ramps(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    state.list_queries.lock().unwrap().push(params.clone());

    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let take: usize = params.get("take").and_then(|t| t.parse().ok()).unwrap_or(10);
    let descending = params.get("order_createdAt").map(|o| o == "DESC").unwrap_or(true);

    let mut rows: Vec<Value> = state
        .ramps
        .lock()
        .unwrap()
        .iter()
        .filter(|r| params.get("where__district").map_or(true, |d| r["district"] == d.as_str()))
        .filter(|r| params.get("where__type").map_or(true, |t| r["type"] == t.as_str()))
        .filter(|r| {
            params.get("where__query").map_or(true, |q| {
                r["tradeName"].as_str().unwrap_or("").contains(q.as_str())
                    || r["address"].as_str().unwrap_or("").contains(q.as_str())
            })
        })
        .cloned()
        .collect();
    rows.sort_by_key(|r| r["id"].as_i64().unwrap_or(0));
    if descending {
        rows.reverse();
    }

    let total = rows.len();
    let data: Vec<Value> = if state.unpaginated.load(Ordering::SeqCst) {
        rows
    } else {
        rows.into_iter().skip((page.max(1) - 1) * take).take(take).collect()
    };

    Json(json!({
        "data": data,
        "page": page,
        "take": take,
        "total": total,
        "totalPages": ((total + take - 1) / take).max(1),
    }))
    .into_response()
}

async fn create_ramp(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    state.created_bodies.lock().unwrap().push(body.clone());

    let id = state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let mut record = body;
    record["id"] = json!(id);
    record["createdAt"] = json!("2025-04-01T00:00:00Z");
    record["updatedAt"] = json!("2025-04-01T00:00:00Z");
    state.ramps.lock().unwrap().push(record.clone());

    (StatusCode::CREATED, Json(record)).into_response()
}

async fn delete_ramps(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    state.delete_bodies.lock().unwrap().push(body.clone());
    if state.delete_fails.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "statusCode": 500 }))).into_response();
    }

    let ids: Vec<i64> = body["ids"]
        .as_array()
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();
    state
        .ramps
        .lock()
        .unwrap()
        .retain(|r| !ids.contains(&r["id"].as_i64().unwrap_or(0)));
    Json(json!({ "deleted": ids.len() })).into_response()
}

async fn upload_excel(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let text = String::from_utf8_lossy(&body);
    if !content_type.starts_with("multipart/form-data") || !text.contains("name=\"file\"") {
        return (StatusCode::BAD_REQUEST, "expected multipart field 'file'").into_response();
    }
    state.excel_uploads.lock().unwrap().push((content_type, body.len()));
    Json(json!({ "imported": 3 })).into_response()
}

async fn presign(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    let file_name = body["fileName"].as_str().unwrap_or("file").to_string();
    state.presigned.lock().unwrap().push(body.clone());
    state.upload_log.lock().unwrap().push(format!("presign:{}", file_name));

    let key = format!("ramps/{}", file_name);
    Json(json!({
        "key": key,
        "uploadUrl": format!("{}/storage/{}", state.base_url, key),
        "publicUrl": format!("https://cdn.ramp.test/{}", key),
        "expiresIn": 300,
    }))
    .into_response()
}

async fn storage_put(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(key): Path<String>,
    body: Bytes,
) -> Response {
    let key = key.trim_start_matches('/').to_string();
    let credentials = headers.contains_key(header::AUTHORIZATION) || headers.contains_key(header::COOKIE);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.upload_log.lock().unwrap().push(format!("put:{}", key));
    state
        .puts
        .lock()
        .unwrap()
        .push((key.clone(), content_type, body.len(), credentials));

    let fail = state.fail_put_for.lock().unwrap().clone();
    if fail.map_or(false, |name| key.ends_with(&name)) {
        return (StatusCode::FORBIDDEN, "AccessDenied").into_response();
    }
    StatusCode::OK.into_response()
}
