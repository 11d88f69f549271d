//! In-memory task service speaking the same JSON envelope as the real backend.
//!
//! Used by the client's integration tests and for running the terminal UI
//! locally. State lives in an `Arc<RwLock<Store>>` and is lost on exit.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

pub const VALID_STATUSES: [&str; 3] = ["pending", "in_progress", "completed"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskStats {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub completion_percentage: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> Envelope<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            count: None,
        }
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// Task table plus the id sequence. Ids are never reused.
#[derive(Debug, Default)]
pub struct Store {
    tasks: BTreeMap<i64, Task>,
    last_id: i64,
}

impl Store {
    pub fn insert(&mut self, title: String, description: String, status: String) -> Task {
        self.last_id += 1;
        let now = Utc::now().naive_utc();
        let task = Task {
            id: self.last_id,
            title,
            description,
            status,
            created_at: now,
            updated_at: now,
        };
        self.tasks.insert(task.id, task.clone());
        task
    }

    /// Newest first.
    pub fn list(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        tasks
    }

    pub fn remove(&mut self, id: i64) -> Option<Task> {
        self.tasks.remove(&id)
    }

    pub fn stats(&self) -> TaskStats {
        let count = |status: &str| self.tasks.values().filter(|t| t.status == status).count() as u64;
        let total = self.tasks.len() as u64;
        let completed = count("completed");
        let completion_percentage = if total == 0 {
            0.0
        } else {
            (completed as f64 / total as f64 * 100.0).round()
        };
        TaskStats {
            total,
            pending: count("pending"),
            in_progress: count("in_progress"),
            completed,
            completion_percentage,
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Handler failure rendered as a `success: false` envelope.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    error: String,
}

impl Failure {
    fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
        }
    }

    /// A path whose id segment is not an integer matches no task route.
    fn no_route() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: "Not Found".to_string(),
        }
    }

    fn not_found(id: i64) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: format!("Task with id {id} not found"),
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = Envelope::<()> {
            success: false,
            data: None,
            error: Some(self.error),
            message: None,
            count: None,
        };
        (self.status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    router(Db::default())
}

/// Router over an existing store, so tests can seed or inspect it.
pub fn router(db: Db) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/stats", get(task_stats))
        .route("/tasks/{id}", put(update_task).delete(delete_task))
        .with_state(db)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "To-Do List API",
        "endpoints": {
            "GET /tasks": "Get all tasks",
            "POST /tasks": "Create a new task",
            "PUT /tasks/<id>": "Update a task",
            "DELETE /tasks/<id>": "Delete a task",
            "GET /tasks/stats": "Get task statistics"
        }
    }))
}

async fn list_tasks(State(db): State<Db>) -> Json<Envelope<Vec<Task>>> {
    let tasks = db.read().await.list();
    let count = tasks.len();
    Json(Envelope {
        count: Some(count),
        ..Envelope::ok(tasks)
    })
}

async fn create_task(
    State(db): State<Db>,
    payload: Result<Json<CreateTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Task>>), Failure> {
    let Json(input) = payload.map_err(|_| Failure::bad_request("No data provided"))?;
    if input.title.is_none() && input.description.is_none() && input.status.is_none() {
        return Err(Failure::bad_request("No data provided"));
    }
    let title = input
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Failure::bad_request("Title is required"))?
        .to_string();
    let status = match input.status {
        Some(status) => validate_status(status)?,
        None => "pending".to_string(),
    };
    let description = input.description.unwrap_or_default().trim().to_string();

    let task = db.write().await.insert(title, description, status);
    tracing::debug!(id = task.id, "task created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(task).with_message("Task created successfully")),
    ))
}

async fn update_task(
    State(db): State<Db>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTask>, JsonRejection>,
) -> Result<Json<Envelope<Task>>, Failure> {
    let id = task_id(path)?;
    let Json(input) = payload.map_err(|_| Failure::bad_request("No data provided"))?;
    if input.title.is_none() && input.description.is_none() && input.status.is_none() {
        return Err(Failure::bad_request("No data provided"));
    }

    let mut store = db.write().await;
    let task = store.tasks.get_mut(&id).ok_or(Failure::not_found(id))?;

    // Validate everything before touching the record.
    let title = match input.title {
        Some(title) if title.trim().is_empty() => {
            return Err(Failure::bad_request("Title cannot be empty"));
        }
        Some(title) => Some(title.trim().to_string()),
        None => None,
    };
    let status = input.status.map(validate_status).transpose()?;

    if let Some(title) = title {
        task.title = title;
    }
    if let Some(description) = input.description {
        task.description = description.trim().to_string();
    }
    if let Some(status) = status {
        task.status = status;
    }
    task.updated_at = Utc::now().naive_utc();

    Ok(Json(Envelope::ok(task.clone()).with_message("Task updated successfully")))
}

async fn delete_task(
    State(db): State<Db>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Envelope<()>>, Failure> {
    let id = task_id(path)?;
    let mut store = db.write().await;
    store.remove(id).ok_or(Failure::not_found(id))?;
    Ok(Json(Envelope {
        success: true,
        data: None,
        error: None,
        message: Some(format!("Task {id} deleted successfully")),
        count: None,
    }))
}

async fn task_stats(State(db): State<Db>) -> Json<Envelope<TaskStats>> {
    Json(Envelope::ok(db.read().await.stats()))
}

fn task_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, Failure> {
    path.map(|Path(id)| id).map_err(|_| Failure::no_route())
}

fn validate_status(status: String) -> Result<String, Failure> {
    if VALID_STATUSES.contains(&status.as_str()) {
        Ok(status)
    } else {
        Err(Failure::bad_request(format!(
            "Invalid status. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}
