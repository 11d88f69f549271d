//! Drive `App` against the mock service's router in-process.
//!
//! Requests built by the client are replayed through `tower::ServiceExt::oneshot`
//! on a private runtime, so no port is bound. Switches on the transport
//! simulate a lost network or a failing list or stats endpoint.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axum::{body::Body, http::Request, Router};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use http_body_util::BodyExt;
use mock_server::{router, Db};
use pretty_assertions::assert_eq;
use task_core::{ApiError, HttpRequest, HttpResponse, TaskApi, TaskClient, TaskStatus, Transport};
use task_tui::{App, Modal, StatusFilter, View};
use tokio::runtime::Runtime;
use tower::ServiceExt;

const BASE_URL: &str = "http://mock";

struct RouterTransport {
    rt: Runtime,
    router: Router,
    offline: AtomicBool,
    tasks_broken: AtomicBool,
    stats_broken: AtomicBool,
    requests: AtomicUsize,
}

impl RouterTransport {
    fn new(db: Db) -> Self {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        Self {
            rt,
            router: router(db),
            offline: AtomicBool::new(false),
            tasks_broken: AtomicBool::new(false),
            stats_broken: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        }
    }
}

impl Transport for RouterTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        self.requests.fetch_add(1, Ordering::SeqCst);

        let broken = (self.tasks_broken.load(Ordering::SeqCst) && request.url.ends_with("/tasks"))
            || (self.stats_broken.load(Ordering::SeqCst) && request.url.ends_with("/tasks/stats"));
        if broken {
            return Ok(HttpResponse {
                status: 500,
                headers: Vec::new(),
                body: r#"{"success":false,"error":"Database unavailable"}"#.to_string(),
            });
        }

        let mut builder = Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let req = builder
            .body(Body::from(request.body.unwrap_or_default()))
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        self.rt.block_on(async {
            let resp = self
                .router
                .clone()
                .oneshot(req)
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            let status = resp.status().as_u16();
            let headers = resp
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
                .collect();
            let bytes = resp
                .into_body()
                .collect()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?
                .to_bytes();
            Ok(HttpResponse {
                status,
                headers,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            })
        })
    }
}

fn app_over(db: &Db) -> App<RouterTransport> {
    let api = TaskApi::new(TaskClient::new(BASE_URL), RouterTransport::new(db.clone()));
    App::new(api)
}

fn seed(db: &Db, tasks: &[(&str, &str)]) {
    let mut store = db.blocking_write();
    for (title, status) in tasks {
        store.insert(title.to_string(), String::new(), status.to_string());
    }
}

fn press(app: &mut App<RouterTransport>, code: KeyCode) {
    app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
}

fn type_text(app: &mut App<RouterTransport>, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

fn transport(app: &App<RouterTransport>) -> &RouterTransport {
    app.api().transport()
}

#[test]
fn initial_load_without_network_shows_banner() {
    let db = Db::default();
    let mut app = app_over(&db);
    transport(&app).offline.store(true, Ordering::SeqCst);

    app.refresh();

    assert!(!app.loading);
    assert!(app.tasks.is_empty());
    assert!(app.stats.is_none());
    let error = app.error.clone().unwrap();
    assert!(error.starts_with("Failed to fetch"), "{error}");
}

#[test]
fn retry_after_recovery_clears_banner() {
    let db = Db::default();
    seed(&db, &[("Write report", "pending"), ("Ship it", "completed")]);
    let mut app = app_over(&db);
    transport(&app).offline.store(true, Ordering::SeqCst);
    app.refresh();
    assert!(app.error.is_some());

    transport(&app).offline.store(false, Ordering::SeqCst);
    press(&mut app, KeyCode::Char('r'));

    assert_eq!(app.error, None);
    assert_eq!(app.tasks.len(), 2);
    let stats = app.stats.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.completion_percentage, 50.0);
}

#[test]
fn stats_failure_keeps_loaded_tasks() {
    let db = Db::default();
    seed(&db, &[("Only task", "pending")]);
    let mut app = app_over(&db);
    transport(&app).stats_broken.store(true, Ordering::SeqCst);

    app.refresh();

    assert_eq!(app.tasks.len(), 1);
    assert!(app.stats.is_none());
    assert_eq!(
        app.error.as_deref(),
        Some("Failed to fetch stats: HTTP 500: Database unavailable")
    );
}

#[test]
fn tasks_failure_still_fills_stats() {
    let db = Db::default();
    seed(&db, &[("a", "completed"), ("b", "pending")]);
    let mut app = app_over(&db);
    transport(&app).tasks_broken.store(true, Ordering::SeqCst);

    app.refresh();

    assert!(app.tasks.is_empty());
    assert_eq!(app.stats.map(|s| s.total), Some(2));
    assert_eq!(
        app.error.as_deref(),
        Some("Failed to fetch tasks: HTTP 500: Database unavailable")
    );
}

#[test]
fn failed_refresh_keeps_previously_loaded_data() {
    let db = Db::default();
    seed(&db, &[("kept", "pending")]);
    let mut app = app_over(&db);
    app.refresh();
    assert_eq!(app.error, None);
    let tasks = app.tasks.clone();
    let stats = app.stats;

    // New work lands on the server, but the list endpoint is down.
    seed(&db, &[("unseen", "completed")]);
    transport(&app).tasks_broken.store(true, Ordering::SeqCst);
    app.refresh();
    assert_eq!(app.tasks, tasks);
    assert_eq!(app.stats.map(|s| s.total), Some(2));
    assert!(app.error.as_deref().unwrap().starts_with("Failed to fetch tasks:"));

    let stats_after_tasks_failure = app.stats;
    transport(&app).tasks_broken.store(false, Ordering::SeqCst);
    transport(&app).stats_broken.store(true, Ordering::SeqCst);
    app.refresh();
    assert_eq!(app.tasks.len(), 2);
    assert_eq!(app.stats, stats_after_tasks_failure);
    assert!(app.error.as_deref().unwrap().starts_with("Failed to fetch stats:"));

    transport(&app).offline.store(true, Ordering::SeqCst);
    let tasks = app.tasks.clone();
    app.refresh();
    assert_eq!(app.tasks, tasks);
    assert_eq!(app.stats, stats_after_tasks_failure);
    assert_ne!(app.stats, stats);
}

#[test]
fn create_from_form_adds_one_pending_task() {
    let db = Db::default();
    let mut app = app_over(&db);
    app.refresh();
    press(&mut app, KeyCode::Char('2'));
    press(&mut app, KeyCode::Char('a'));
    type_text(&mut app, "  Buy milk ");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "two litres");
    press(&mut app, KeyCode::Enter);

    assert!(app.form.is_none());
    assert!(app.modal.is_none());
    assert_eq!(app.tasks.len(), 1);
    let task = &app.tasks[0];
    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.description, "two litres");
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(app.stats.map(|s| s.pending), Some(1));
}

#[test]
fn blank_title_sends_no_request() {
    let db = Db::default();
    let mut app = app_over(&db);
    app.refresh();
    let before = transport(&app).requests.load(Ordering::SeqCst);

    app.view = View::Tasks;
    press(&mut app, KeyCode::Char('a'));
    type_text(&mut app, "   ");
    press(&mut app, KeyCode::Enter);

    assert_eq!(transport(&app).requests.load(Ordering::SeqCst), before);
    assert!(app.form.is_some());
    assert!(app.tasks.is_empty());
}

#[test]
fn status_change_refetches_tasks_and_stats() {
    let db = Db::default();
    seed(&db, &[("Draft", "pending")]);
    let mut app = app_over(&db);
    app.refresh();
    app.view = View::Tasks;

    press(&mut app, KeyCode::Char('c'));

    assert_eq!(app.tasks[0].status, TaskStatus::Completed);
    let stats = app.stats.unwrap();
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.completion_percentage, 100.0);

    app.set_filter(StatusFilter::Only(TaskStatus::Pending));
    assert!(app.filtered_tasks().is_empty());
    assert_eq!(app.empty_message(), "No pending tasks found.");
}

#[test]
fn delete_requires_confirmation_and_removes_only_that_task() {
    let db = Db::default();
    seed(&db, &[("first", "pending"), ("second", "pending"), ("third", "in_progress")]);
    let mut app = app_over(&db);
    app.refresh();
    app.view = View::Tasks;
    press(&mut app, KeyCode::Down);
    let target = app.selected_task().unwrap().id;

    press(&mut app, KeyCode::Char('d'));
    assert!(matches!(app.modal, Some(Modal::ConfirmDelete { id, .. }) if id == target));
    assert_eq!(app.tasks.len(), 3);

    press(&mut app, KeyCode::Char('y'));

    assert!(app.modal.is_none());
    assert_eq!(app.tasks.len(), 2);
    assert!(app.tasks.iter().all(|t| t.id != target));
    assert_eq!(app.stats.map(|s| s.total), Some(2));
}

#[test]
fn failed_delete_raises_alert() {
    let db = Db::default();
    seed(&db, &[("doomed", "pending")]);
    let mut app = app_over(&db);
    app.refresh();
    app.view = View::Tasks;

    // Removed behind the client's back.
    db.blocking_write().remove(app.tasks[0].id);
    press(&mut app, KeyCode::Char('d'));
    press(&mut app, KeyCode::Char('y'));

    let expected = format!("Error deleting task: HTTP 404: Task with id {} not found", app.tasks[0].id);
    assert_eq!(app.modal, Some(Modal::Alert(expected)));
    assert_eq!(app.tasks.len(), 1);
}

#[test]
fn completion_percentage_matches_counts() {
    let db = Db::default();
    seed(
        &db,
        &[
            ("a", "completed"),
            ("b", "pending"),
            ("c", "in_progress"),
        ],
    );
    let mut app = app_over(&db);
    app.refresh();

    let stats = app.stats.unwrap();
    assert_eq!(stats.total, stats.pending + stats.in_progress + stats.completed);
    assert_eq!(stats.completion_percentage, 33.0);
    assert_eq!(stats.remaining(), 2);
}
