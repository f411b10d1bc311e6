//! In-process stand-in for the mdd REST API.
//!
//! Serves a fixed data set on an ephemeral port and records every request's
//! path, query and `Authorization` header so tests can assert what the
//! client sent.

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::{Path, Request, State},
  http::{StatusCode, header::AUTHORIZATION},
  middleware::{self, Next},
  response::{IntoResponse, Response},
  routing::{get, post},
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const VALID_TOKEN: &str = "T";

#[derive(Debug, Clone)]
pub struct Seen {
  pub method: String,
  pub path:   String,
  pub query:  Option<String>,
  pub auth:   Option<String>,
}

pub struct FixtureState {
  pub seen:        Mutex<Vec<Seen>>,
  /// Bearer token the server accepts; change it to simulate revocation.
  pub valid_token: Mutex<String>,
}

impl FixtureState {
  pub fn requests_to(&self, path: &str) -> Vec<Seen> {
    self.seen.lock().iter().filter(|s| s.path == path).cloned().collect()
  }
}

pub struct Fixture {
  pub base_url: String,
  pub state:    Arc<FixtureState>,
}

pub async fn spawn() -> Fixture {
  let state = Arc::new(FixtureState {
    seen:        Mutex::new(Vec::new()),
    valid_token: Mutex::new(VALID_TOKEN.to_owned()),
  });

  let app = Router::new()
    .route("/api/auth/login", post(login))
    .route("/api/auth/register", post(register))
    .route("/api/post", get(list_posts))
    .route("/api/post/{id}", get(get_post))
    .route("/api/post/{id}/comment", get(list_comments))
    .route("/api/subject", get(list_subjects))
    .route(
      "/api/subscriptions/{user}/{subject}",
      post(subscription).delete(subscription),
    )
    .route("/api/user/{id}", get(get_user))
    .layer(middleware::from_fn_with_state(state.clone(), record_and_authorize))
    .with_state(state.clone());

  let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fixture");
  let addr = listener.local_addr().expect("fixture address");
  tokio::spawn(async move {
    axum::serve(listener, app).await.expect("fixture server");
  });

  Fixture {
    base_url: format!("http://{addr}"),
    state,
  }
}

async fn record_and_authorize(
  State(state): State<Arc<FixtureState>>,
  req: Request,
  next: Next,
) -> Response {
  let auth = req
    .headers()
    .get(AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .map(str::to_owned);
  let path = req.uri().path().to_owned();
  state.seen.lock().push(Seen {
    method: req.method().to_string(),
    path:   path.clone(),
    query:  req.uri().query().map(str::to_owned),
    auth:   auth.clone(),
  });

  if !path.starts_with("/api/auth/") {
    let expected = format!("Bearer {}", state.valid_token.lock());
    if auth.as_deref() != Some(expected.as_str()) {
      return StatusCode::UNAUTHORIZED.into_response();
    }
  }
  next.run(req).await
}

async fn login(Json(body): Json<Value>) -> Response {
  if body["email"] == "a@b.com" && body["password"] == "Secret123!" {
    Json(json!({
      "id": 1, "userName": "alice", "email": "a@b.com", "token": VALID_TOKEN
    }))
    .into_response()
  } else {
    StatusCode::BAD_REQUEST.into_response()
  }
}

async fn register(Json(body): Json<Value>) -> Response {
  if body["email"] == "taken@b.com" {
    return StatusCode::BAD_REQUEST.into_response();
  }
  (
    StatusCode::CREATED,
    Json(json!({
      "id": 2,
      "userName": body["userName"],
      "email": body["email"],
      "password": "$2a$10$hash",
      "subscription": []
    })),
  )
    .into_response()
}

async fn list_posts() -> Json<Value> {
  Json(json!([
    { "id": 1, "title": "Ownership", "description": "borrowck", "date": "2024/06/15", "themeId": 1, "userId": 1 },
    { "id": 2, "title": "Async", "description": "futures", "date": "2024/06/14", "themeId": 2, "userId": 2 }
  ]))
}

async fn get_post(Path(id): Path<i64>) -> Response {
  if id != 1 {
    return StatusCode::NOT_FOUND.into_response();
  }
  Json(json!({
    "id": 1, "title": "Ownership", "description": "borrowck", "date": "2024/06/15", "themeId": 1, "userId": 1
  }))
  .into_response()
}

async fn list_comments(Path(_id): Path<i64>) -> Json<Value> {
  Json(json!([
    { "id": 10, "userId": 2, "description": "first", "date": 1718442180000_i64 },
    { "id": 11, "userId": 1, "description": "second", "date": 1718445780000_i64 }
  ]))
}

async fn list_subjects() -> Json<Value> {
  Json(json!({ "subject": [
    { "id": 1, "title": "Rust", "description": "systems", "date": 1718442180000_i64 },
    { "id": 2, "title": "Go", "description": "services", "date": 1718442180000_i64 }
  ]}))
}

async fn subscription(Path((_user, subject)): Path<(i64, i64)>) -> Response {
  if subject == 99 {
    return (StatusCode::INTERNAL_SERVER_ERROR, "subscription failed").into_response();
  }
  Json(json!({ "message": "ok" })).into_response()
}

async fn get_user(Path(id): Path<i64>) -> Response {
  match id {
    1 => Json(json!({ "id": 1, "userName": "alice", "email": "a@b.com", "subscription": [] })),
    2 => Json(json!({ "id": 2, "userName": "bob", "email": "b@b.com", "subscription": [] })),
    _ => return StatusCode::NOT_FOUND.into_response(),
  }
  .into_response()
}
