use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub is_completed: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "blank_date")]
    pub due_date: Option<NaiveDate>,
}

/// Fields that are present in the body are applied, including explicit
/// nulls for `description` and `due_date`.
#[derive(Deserialize)]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_date")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

fn blank_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn present_date<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    blank_date(deserializer).map(Some)
}

/// Error response carrying a `{"detail": ...}` body.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    detail: String,
}

impl Failure {
    fn not_found(id: i64) -> Self {
        Self::missing(format!("Todo with id {id} not found"))
    }

    /// 404 with a custom detail; also used for state transitions that do not apply.
    fn missing(detail: String) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail,
        }
    }

    fn invalid(detail: &str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: detail.to_string(),
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        tracing::warn!(status = %self.status, detail = %self.detail, "request rejected");
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

#[derive(Default)]
pub struct Store {
    next_id: i64,
    todos: BTreeMap<i64, Todo>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/todos", get(list_todos).post(create_todo).delete(delete_all_todos))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/todos/{id}/complete", patch(complete_todo))
        .route("/todos/{id}/incomplete", patch(incomplete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn clean_title(raw: &str) -> Result<String, Failure> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(Failure::invalid("Title cannot be empty"));
    }
    Ok(title.to_string())
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    let store = db.read().await;
    Json(store.todos.values().cloned().collect())
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<CreateTodo>,
) -> Result<Json<Todo>, Failure> {
    let title = clean_title(&input.title)?;
    let mut store = db.write().await;
    store.next_id += 1;
    let todo = Todo {
        id: store.next_id,
        title,
        description: input.description,
        due_date: input.due_date,
        is_completed: false,
        created_at: Utc::now().naive_utc(),
    };
    store.todos.insert(todo.id, todo.clone());
    tracing::info!(id = todo.id, "todo created");
    Ok(Json(todo))
}

async fn get_todo(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Todo>, Failure> {
    let store = db.read().await;
    store.todos.get(&id).cloned().map(Json).ok_or_else(|| Failure::not_found(id))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, Failure> {
    let mut store = db.write().await;
    let todo = store.todos.get_mut(&id).ok_or_else(|| Failure::not_found(id))?;
    if let Some(title) = input.title {
        todo.title = clean_title(&title)?;
    }
    if let Some(description) = input.description {
        todo.description = description;
    }
    if let Some(due_date) = input.due_date {
        todo.due_date = due_date;
    }
    if let Some(is_completed) = input.is_completed {
        todo.is_completed = is_completed;
    }
    tracing::info!(id, "todo updated");
    Ok(Json(todo.clone()))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    store
        .todos
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| Failure::not_found(id))
}

async fn delete_all_todos(State(db): State<Db>) -> StatusCode {
    db.write().await.todos.clear();
    StatusCode::NO_CONTENT
}

async fn complete_todo(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Todo>, Failure> {
    set_completed(&db, id, true).await
}

async fn incomplete_todo(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Todo>, Failure> {
    set_completed(&db, id, false).await
}

async fn set_completed(db: &Db, id: i64, completed: bool) -> Result<Json<Todo>, Failure> {
    let mut store = db.write().await;
    let todo = store.todos.get_mut(&id).ok_or_else(|| Failure::not_found(id))?;
    if todo.is_completed == completed {
        let state = if completed { "completed" } else { "incomplete" };
        return Err(Failure::missing(format!("Todo with id {id} is already {state}")));
    }
    todo.is_completed = completed;
    Ok(Json(todo.clone()))
}
