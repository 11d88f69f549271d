//! Stateless HTTP request builder and response parser for the task API.
//!
//! # Design
//! `TaskClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The round-trip in between belongs to a [`Transport`](crate::Transport).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ApiResponse, CreateTask, Task, TaskStats, UpdateTask};

/// Synchronous, stateless client for the task API.
#[derive(Debug, Clone)]
pub struct TaskClient {
    base_url: String,
}

impl TaskClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_tasks(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/tasks", None)
    }

    pub fn build_create_task(&self, input: &CreateTask) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(self.request(HttpMethod::Post, "/tasks", Some(body)))
    }

    pub fn build_update_task(&self, id: i64, input: &UpdateTask) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(self.request(HttpMethod::Put, &format!("/tasks/{id}"), Some(body)))
    }

    pub fn build_delete_task(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/tasks/{id}"), None)
    }

    pub fn build_get_stats(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/tasks/stats", None)
    }

    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<ApiResponse<Vec<Task>>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<ApiResponse<Task>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<ApiResponse<Task>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<ApiResponse<()>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_get_stats(&self, response: HttpResponse) -> Result<ApiResponse<TaskStats>, ApiError> {
        parse_envelope(response)
    }

    // Every request carries the JSON content type, bodiless ones included.
    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        }
    }
}

fn to_json<T: Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn parse_envelope<T: DeserializeOwned>(response: HttpResponse) -> Result<ApiResponse<T>, ApiError> {
    check_status(&response)?;
    let envelope: ApiResponse<T> =
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))?;
    Ok(envelope.normalized())
}

/// The part of a failure envelope worth surfacing.
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let detail = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.error);
    if response.status == 404 {
        return Err(ApiError::NotFound { detail });
    }
    Err(ApiError::HttpStatus {
        status: response.status,
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskStatus;

    fn client() -> TaskClient {
        TaskClient::new("http://localhost:5000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn json_header() -> Vec<(String, String)> {
        vec![("content-type".to_string(), "application/json".to_string())]
    }

    #[test]
    fn build_list_tasks_produces_correct_request() {
        let req = client().build_list_tasks();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:5000/tasks");
        assert!(req.body.is_none());
        assert_eq!(req.headers, json_header());
    }

    #[test]
    fn build_get_stats_targets_stats_endpoint() {
        let req = client().build_get_stats();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:5000/tasks/stats");
    }

    #[test]
    fn build_create_task_produces_correct_request() {
        let input = CreateTask::new("Buy milk").with_description("2 litres");
        let req = client().build_create_task(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:5000/tasks");
        assert_eq!(req.headers, json_header());
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Buy milk");
        assert_eq!(body["description"], "2 litres");
        assert!(body.get("status").is_none());
    }

    #[test]
    fn build_update_task_sends_only_present_fields() {
        let req = client()
            .build_update_task(7, &UpdateTask::status(TaskStatus::InProgress))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:5000/tasks/7");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "status": "in_progress" }));
    }

    #[test]
    fn build_delete_task_produces_correct_request() {
        let req = client().build_delete_task(12);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:5000/tasks/12");
        assert!(req.body.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TaskClient::new("http://localhost:5000/");
        assert_eq!(client.build_list_tasks().url, "http://localhost:5000/tasks");
    }

    #[test]
    fn parse_list_tasks_success() {
        let body = r#"{"success":true,"count":1,"data":[{"id":1,"title":"Test","description":"",
            "status":"pending","created_at":"2025-01-01T00:00:00","updated_at":"2025-01-01T00:00:00"}]}"#;
        let envelope = client().parse_list_tasks(response(200, body)).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.count, Some(1));
        let tasks = envelope.into_data().unwrap();
        assert_eq!(tasks[0].title, "Test");
    }

    #[test]
    fn parse_create_task_accepts_201() {
        let body = r#"{"success":true,"message":"Task created successfully","data":{"id":2,"title":"New",
            "description":"","status":"pending","created_at":"2025-01-01T00:00:00","updated_at":"2025-01-01T00:00:00"}}"#;
        let envelope = client().parse_create_task(response(201, body)).unwrap();
        assert_eq!(envelope.into_data().unwrap().title, "New");
    }

    #[test]
    fn parse_create_task_surfaces_server_validation_error() {
        let err = client()
            .parse_create_task(response(400, r#"{"success":false,"error":"Title is required"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus { status: 400, .. }));
        assert_eq!(err.to_string(), "HTTP 400: Title is required");
    }

    #[test]
    fn parse_delete_task_success_has_no_data() {
        let envelope = client()
            .parse_delete_task(response(200, r#"{"success":true,"message":"Task 3 deleted successfully"}"#))
            .unwrap();
        assert!(envelope.success);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn parse_delete_task_not_found() {
        let err = client()
            .parse_delete_task(response(404, r#"{"success":false,"error":"Task with id 9 not found"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { detail: Some(_) }));
    }

    #[test]
    fn parse_update_task_non_json_error_body() {
        let err = client()
            .parse_update_task(response(502, "<html>bad gateway</html>"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus { status: 502, detail: None }));
    }

    #[test]
    fn parse_get_stats_success() {
        let body = r#"{"success":true,"data":{"total":4,"pending":1,"in_progress":1,"completed":2,
            "completion_percentage":50}}"#;
        let stats = client().parse_get_stats(response(200, body)).unwrap().into_data().unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completion_percentage, 50.0);
    }

    #[test]
    fn parse_list_tasks_bad_json() {
        let err = client().parse_list_tasks(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_success_false_with_2xx_is_passed_through_without_data() {
        let envelope = client()
            .parse_list_tasks(response(200, r#"{"success":false,"error":"Database error","data":[]}"#))
            .unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.error_text(), "Database error");
    }
}
