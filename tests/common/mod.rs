// SPDX-License-Identifier: MIT

//! In-process fake PostgREST backend for integration tests.
//!
//! Implements just enough of the resource API the client issues: the auth
//! RPCs plus filtered GET/POST/PATCH/DELETE on `sessions`,
//! `session_participants`, `drinks` and `drink_types`, with the embedded
//! relations the client selects. Rows live in a shared in-memory table set.

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use rounds_tracker::config::Config;
use rounds_tracker::credentials::CredentialStore;
use rounds_tracker::models::{
    DrinkRecord, DrinkType, Participant, Session, SessionStatus, UserRef,
};
use rounds_tracker::AppContext;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Clone)]
pub struct FakeUser {
    pub user_id: Uuid,
    pub email: String,
    pub password: String,
    pub username: String,
}

impl FakeUser {
    pub fn token(&self) -> String {
        format!("tok-{}", self.user_id)
    }
}

#[derive(Default)]
pub struct BackendState {
    pub users: Vec<FakeUser>,
    pub sessions: Vec<Session>,
    pub participants: Vec<Participant>,
    pub drinks: Vec<DrinkRecord>,
    pub drink_types: Vec<DrinkType>,
    pub revoked_tokens: HashSet<String>,
}

type Shared = Arc<Mutex<BackendState>>;

/// A running fake backend plus handles for seeding and inspection.
pub struct TestBackend {
    pub base_url: String,
    pub state: Shared,
    _dir: tempfile::TempDir,
}

impl TestBackend {
    /// Build an [`AppContext`] pointed at this backend with a fresh
    /// credential file.
    pub fn context(&self) -> AppContext {
        let config = Config {
            postgrest_url: self.base_url.clone(),
            request_timeout_secs: 5,
            credentials_path: self
                ._dir
                .path()
                .join(format!("creds-{}.json", Uuid::new_v4())),
        };
        AppContext::new(config)
    }

    /// Build a context that shares an explicit credential store.
    pub fn context_with_store(&self, credentials: CredentialStore) -> AppContext {
        let config = Config {
            postgrest_url: self.base_url.clone(),
            request_timeout_secs: 5,
            credentials_path: self._dir.path().join("unused.json"),
        };
        AppContext::with_credentials(config, credentials)
    }

    pub fn credentials_path(&self) -> std::path::PathBuf {
        self._dir.path().join(format!("creds-{}.json", Uuid::new_v4()))
    }

    pub fn seed_user(&self, email: &str, password: &str, username: &str) -> FakeUser {
        let user = FakeUser {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            password: password.to_string(),
            username: username.to_string(),
        };
        self.state.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn seed_drink_type(&self, id: i32, name: &str, alcohol_percentage: f64) {
        self.state.lock().unwrap().drink_types.push(DrinkType {
            drink_type_id: id,
            name: name.to_string(),
            alcohol_percentage,
            created_at: Utc::now(),
        });
    }

    /// Mark a token as no longer valid (expired server-side).
    pub fn revoke_token(&self, token: &str) {
        self.state
            .lock()
            .unwrap()
            .revoked_tokens
            .insert(token.to_string());
    }

    pub fn participant_count(&self, session_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .participants
            .iter()
            .filter(|p| p.session_id == session_id)
            .count()
    }
}

/// Start the fake backend on an ephemeral port.
pub async fn spawn_backend() -> TestBackend {
    let state: Shared = Arc::new(Mutex::new(BackendState::default()));

    let app = Router::new()
        .route("/rpc/register", post(rpc_register))
        .route("/rpc/login", post(rpc_login))
        .route("/rpc/verify_jwt", post(rpc_verify))
        .route("/sessions", get(get_sessions).post(post_session).patch(patch_session).delete(delete_session))
        .route("/session_participants", get(get_participants).post(post_participant))
        .route("/drinks", get(get_drinks).post(post_drink).delete(delete_drink))
        .route("/drink_types", get(get_drink_types))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve fake backend");
    });

    TestBackend {
        base_url: format!("http://{}", addr),
        state,
        _dir: tempfile::tempdir().expect("tempdir"),
    }
}

// ─── Auth RPCs ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CredentialsBody {
    email: String,
    password: String,
}

fn success_body(user: &FakeUser) -> Value {
    json!({
        "success": true,
        "token": user.token(),
        "user_id": user.user_id,
        "email": user.email,
    })
}

async fn rpc_register(
    State(state): State<Shared>,
    Json(body): Json<CredentialsBody>,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    if state.users.iter().any(|u| u.email == body.email) {
        return Json(json!({
            "success": false,
            "message": "An account with this email already exists",
        }));
    }
    let username = body
        .email
        .split('@')
        .next()
        .unwrap_or("user")
        .to_string();
    let user = FakeUser {
        user_id: Uuid::new_v4(),
        email: body.email,
        password: body.password,
        username,
    };
    state.users.push(user.clone());
    Json(success_body(&user))
}

async fn rpc_login(State(state): State<Shared>, Json(body): Json<CredentialsBody>) -> Json<Value> {
    let state = state.lock().unwrap();
    match state
        .users
        .iter()
        .find(|u| u.email == body.email && u.password == body.password)
    {
        Some(user) => Json(success_body(user)),
        None => Json(json!({
            "success": false,
            "message": "Invalid email or password",
        })),
    }
}

#[derive(Deserialize)]
struct VerifyBody {
    token: String,
}

async fn rpc_verify(State(state): State<Shared>, Json(body): Json<VerifyBody>) -> Json<Value> {
    let state = state.lock().unwrap();
    let valid = !state.revoked_tokens.contains(&body.token)
        && state.users.iter().any(|u| u.token() == body.token);
    Json(json!({ "success": valid }))
}

// ─── Domain resources ────────────────────────────────────────────────────

fn authorize(state: &BackendState, headers: &HeaderMap) -> Result<Uuid, Response> {
    let unauthorized = || (StatusCode::UNAUTHORIZED, "JWT required").into_response();
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?;
    if state.revoked_tokens.contains(token) {
        return Err(unauthorized());
    }
    state
        .users
        .iter()
        .find(|u| u.token() == token)
        .map(|u| u.user_id)
        .ok_or_else(unauthorized)
}

/// Parse a `column=eq.value` filter into a Uuid.
fn eq_uuid(params: &HashMap<String, String>, column: &str) -> Option<Uuid> {
    params
        .get(column)
        .and_then(|v| v.strip_prefix("eq."))
        .and_then(|v| Uuid::parse_str(v).ok())
}

async fn get_sessions(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let state = state.lock().unwrap();
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }

    let rows: Vec<&Session> = if let Some(id) = eq_uuid(&params, "session_id") {
        state.sessions.iter().filter(|s| s.session_id == id).collect()
    } else if let Some(or) = params.get("or") {
        // "(created_by.eq.X,session_participants.user_id.eq.X)"
        let user_id = or
            .split("created_by.eq.")
            .nth(1)
            .and_then(|rest| rest.get(..36))
            .and_then(|v| Uuid::parse_str(v).ok());
        match user_id {
            Some(uid) => state
                .sessions
                .iter()
                .filter(|s| {
                    s.created_by == uid
                        || state
                            .participants
                            .iter()
                            .any(|p| p.session_id == s.session_id && p.user_id == uid)
                })
                .collect(),
            None => return (StatusCode::BAD_REQUEST, "bad or filter").into_response(),
        }
    } else {
        state.sessions.iter().collect()
    };

    Json(rows.into_iter().cloned().collect::<Vec<_>>()).into_response()
}

#[derive(Deserialize)]
struct NewSessionBody {
    name: String,
    created_by: Uuid,
    start_time: chrono::DateTime<Utc>,
    status: SessionStatus,
}

async fn post_session(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewSessionBody>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let session = Session {
        session_id: Uuid::new_v4(),
        name: body.name,
        created_by: body.created_by,
        start_time: body.start_time,
        end_time: None,
        status: body.status,
        created_at: Utc::now(),
    };
    state.sessions.push(session.clone());
    (StatusCode::CREATED, Json(vec![session])).into_response()
}

#[derive(Deserialize)]
struct SessionPatchBody {
    name: Option<String>,
    status: Option<SessionStatus>,
    end_time: Option<chrono::DateTime<Utc>>,
}

async fn patch_session(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<SessionPatchBody>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let Some(id) = eq_uuid(&params, "session_id") else {
        return (StatusCode::BAD_REQUEST, "missing filter").into_response();
    };
    let mut updated = Vec::new();
    for session in state.sessions.iter_mut().filter(|s| s.session_id == id) {
        if let Some(name) = &body.name {
            session.name = name.clone();
        }
        if let Some(status) = body.status {
            session.status = status;
        }
        if let Some(end_time) = body.end_time {
            session.end_time = Some(end_time);
        }
        updated.push(session.clone());
    }
    Json(updated).into_response()
}

async fn delete_session(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let Some(id) = eq_uuid(&params, "session_id") else {
        return (StatusCode::BAD_REQUEST, "missing filter").into_response();
    };
    state.sessions.retain(|s| s.session_id != id);
    state.participants.retain(|p| p.session_id != id);
    state.drinks.retain(|d| d.session_id != id);
    StatusCode::NO_CONTENT.into_response()
}

fn username_of(state: &BackendState, user_id: Uuid) -> Option<UserRef> {
    state
        .users
        .iter()
        .find(|u| u.user_id == user_id)
        .map(|u| UserRef {
            username: u.username.clone(),
        })
}

async fn get_participants(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let state = state.lock().unwrap();
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let Some(id) = eq_uuid(&params, "session_id") else {
        return (StatusCode::BAD_REQUEST, "missing filter").into_response();
    };
    let rows: Vec<Participant> = state
        .participants
        .iter()
        .filter(|p| p.session_id == id)
        .cloned()
        .map(|mut p| {
            p.user = username_of(&state, p.user_id);
            p
        })
        .collect();
    Json(rows).into_response()
}

#[derive(Deserialize)]
struct NewParticipantBody {
    session_id: Uuid,
    user_id: Uuid,
}

async fn post_participant(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewParticipantBody>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let duplicate = state
        .participants
        .iter()
        .any(|p| p.session_id == body.session_id && p.user_id == body.user_id);
    if duplicate {
        return (
            StatusCode::CONFLICT,
            "duplicate key value violates unique constraint \"session_participants_session_id_user_id_key\"",
        )
            .into_response();
    }
    state.participants.push(Participant {
        participant_id: Uuid::new_v4(),
        session_id: body.session_id,
        user_id: body.user_id,
        joined_at: Utc::now(),
        user: None,
    });
    StatusCode::CREATED.into_response()
}

async fn get_drinks(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let state = state.lock().unwrap();
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }

    let mut rows: Vec<DrinkRecord> = state
        .drinks
        .iter()
        .filter(|d| {
            if let Some(id) = eq_uuid(&params, "session_id") {
                d.session_id == id
            } else if let Some(id) = eq_uuid(&params, "drink_id") {
                d.drink_id == id
            } else {
                true
            }
        })
        .cloned()
        .collect();

    if params.get("order").map(String::as_str) == Some("consumed_at.asc") {
        rows.sort_by_key(|d| d.consumed_at);
    }

    // Resolve embeddings when requested.
    if params
        .get("select")
        .map(|s| s.contains("drink_types"))
        .unwrap_or(false)
    {
        for row in &mut rows {
            row.drink_type = state
                .drink_types
                .iter()
                .find(|t| t.drink_type_id == row.drink_type_id)
                .cloned();
            row.user = username_of(&state, row.user_id);
        }
    }

    Json(rows).into_response()
}

#[derive(Deserialize)]
struct NewDrinkBody {
    session_id: Uuid,
    user_id: Uuid,
    drink_type_id: i32,
    amount_ml: i64,
    consumed_at: chrono::DateTime<Utc>,
}

async fn post_drink(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewDrinkBody>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let record = DrinkRecord {
        drink_id: Uuid::new_v4(),
        session_id: body.session_id,
        user_id: body.user_id,
        drink_type_id: body.drink_type_id,
        amount_ml: body.amount_ml,
        consumed_at: body.consumed_at,
        drink_type: None,
        user: None,
    };
    state.drinks.push(record.clone());
    (StatusCode::CREATED, Json(vec![record])).into_response()
}

async fn delete_drink(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let Some(id) = eq_uuid(&params, "drink_id") else {
        return (StatusCode::BAD_REQUEST, "missing filter").into_response();
    };
    state.drinks.retain(|d| d.drink_id != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn get_drink_types(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    Json(state.drink_types.clone()).into_response()
}
