//! Envelope boundary: build, execute, parse, and never fail.
//!
//! Every `TaskApi` operation returns an `ApiResponse`. Serialization errors,
//! transport errors, unexpected statuses and undecodable bodies all become
//! `success: false` envelopes here, after being logged. Nothing is retried;
//! retrying is the caller's decision.

use tracing::{debug, warn};

use crate::client::TaskClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{ApiResponse, CreateTask, Task, TaskStats, UpdateTask};

/// Task service client that performs I/O through a [`Transport`].
#[derive(Debug, Clone)]
pub struct TaskApi<T> {
    client: TaskClient,
    transport: T,
}

impl TaskApi<UreqTransport> {
    /// Client for `base_url` over a fresh `ureq` agent.
    pub fn connect(base_url: &str) -> Self {
        Self::new(TaskClient::new(base_url), UreqTransport::new())
    }
}

impl<T: Transport> TaskApi<T> {
    pub fn new(client: TaskClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &TaskClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn get_tasks(&self) -> ApiResponse<Vec<Task>> {
        self.request(Ok(self.client.build_list_tasks()), |c, r| c.parse_list_tasks(r))
    }

    pub fn create_task(&self, input: &CreateTask) -> ApiResponse<Task> {
        self.request(self.client.build_create_task(input), |c, r| c.parse_create_task(r))
    }

    pub fn update_task(&self, id: i64, input: &UpdateTask) -> ApiResponse<Task> {
        self.request(self.client.build_update_task(id, input), |c, r| c.parse_update_task(r))
    }

    pub fn delete_task(&self, id: i64) -> ApiResponse<()> {
        self.request(Ok(self.client.build_delete_task(id)), |c, r| c.parse_delete_task(r))
    }

    pub fn get_stats(&self) -> ApiResponse<TaskStats> {
        self.request(Ok(self.client.build_get_stats()), |c, r| c.parse_get_stats(r))
    }

    fn request<R>(
        &self,
        request: Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&TaskClient, HttpResponse) -> Result<ApiResponse<R>, ApiError>,
    ) -> ApiResponse<R> {
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "API request could not be built");
                return ApiResponse::failure(err.to_string());
            }
        };
        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, "API request");

        match self
            .transport
            .execute(request)
            .and_then(|response| parse(&self.client, response))
        {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(%method, %url, error = %err, "API request failed");
                ApiResponse::failure(err.to_string())
            }
        }
    }
}
