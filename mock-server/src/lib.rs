//! In-memory stand-in for the remote todo service.
//!
//! Users, bearer tokens and per-user ordered task lists live behind a single
//! lock. `completed` is emitted as a 0/1 integer, the way the real service
//! sometimes does, so clients exercise their tolerant decoding.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize, Serializer};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
pub struct Todo {
    pub id: String,
    pub description: String,
    #[serde(serialize_with = "as_flag")]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct TodoRequest {
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub id: String,
    pub token: String,
}

#[derive(Deserialize)]
struct ApiKeyQuery {
    apikey: Option<String>,
}

#[derive(Clone)]
struct UserId(String);

struct User {
    id: String,
    password: String,
}

#[derive(Default)]
struct Db {
    users: HashMap<String, User>,
    tokens: HashMap<String, String>,
    todos: HashMap<String, Vec<Todo>>,
}

#[derive(Clone)]
pub struct AppState {
    db: Arc<RwLock<Db>>,
    api_key: Option<String>,
}

type Rejection = (StatusCode, String);

fn as_flag<S: Serializer>(completed: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*completed))
}

pub fn app() -> Router {
    app_with_key(None)
}

/// When `api_key` is set every request must carry it as `?apikey=`.
pub fn app_with_key(api_key: Option<String>) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Db::default())),
        api_key,
    };
    let todos = Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/{id}", put(update_todo))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .merge(todos)
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_key(listener: TcpListener, api_key: Option<String>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_key(api_key)).await
}

async fn require_api_key(
    State(state): State<AppState>,
    Query(query): Query<ApiKeyQuery>,
    req: Request,
    next: Next,
) -> Result<Response, Rejection> {
    if let Some(expected) = &state.api_key {
        if query.apikey.as_deref() != Some(expected.as_str()) {
            return Err((StatusCode::UNAUTHORIZED, "invalid api key".to_string()));
        }
    }
    Ok(next.run(req).await)
}

async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Rejection> {
    let unauthorized = || (StatusCode::UNAUTHORIZED, "missing or invalid token".to_string());
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?;
    let user_id = state
        .db
        .read()
        .await
        .tokens
        .get(token)
        .cloned()
        .ok_or_else(unauthorized)?;
    req.extensions_mut().insert(UserId(user_id));
    Ok(next.run(req).await)
}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), Rejection> {
    if [&input.name, &input.email, &input.password]
        .iter()
        .any(|f| f.trim().is_empty())
    {
        return Err((StatusCode::BAD_REQUEST, "name, email and password are required".to_string()));
    }
    let mut db = state.db.write().await;
    if db.users.contains_key(&input.email) {
        return Err((StatusCode::CONFLICT, "email already registered".to_string()));
    }
    let user = User {
        id: Uuid::new_v4().to_string(),
        password: input.password,
    };
    let token = Uuid::new_v4().to_string();
    let id = user.id.clone();
    db.tokens.insert(token.clone(), id.clone());
    db.users.insert(input.email, user);
    info!(user_id = %id, "registered user");
    Ok((StatusCode::CREATED, Json(AuthResponse { id, token })))
}

async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, Rejection> {
    let mut db = state.db.write().await;
    let id = match db.users.get(&input.email) {
        Some(user) if user.password == input.password => user.id.clone(),
        _ => return Err((StatusCode::UNAUTHORIZED, "invalid email or password".to_string())),
    };
    let token = Uuid::new_v4().to_string();
    db.tokens.insert(token.clone(), id.clone());
    Ok(Json(AuthResponse { id, token }))
}

async fn list_todos(
    State(state): State<AppState>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Json<Vec<Todo>> {
    let db = state.db.read().await;
    Json(db.todos.get(&user_id).cloned().unwrap_or_default())
}

async fn create_todo(
    State(state): State<AppState>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(input): Json<TodoRequest>,
) -> Result<(StatusCode, Json<Todo>), Rejection> {
    if input.description.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "description is required".to_string()));
    }
    let todo = Todo {
        id: Uuid::new_v4().to_string(),
        description: input.description,
        completed: input.completed,
    };
    debug!(id = %todo.id, "created todo");
    state
        .db
        .write()
        .await
        .todos
        .entry(user_id)
        .or_default()
        .push(todo.clone());
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(state): State<AppState>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<String>,
    Json(input): Json<TodoRequest>,
) -> Result<Json<Todo>, Rejection> {
    let mut db = state.db.write().await;
    let todo = db
        .todos
        .get_mut(&user_id)
        .and_then(|todos| todos.iter_mut().find(|t| t.id == id))
        .ok_or((StatusCode::NOT_FOUND, "todo not found".to_string()))?;
    todo.description = input.description;
    todo.completed = input.completed;
    Ok(Json(todo.clone()))
}
