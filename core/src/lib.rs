//! Synchronous API client core for the task service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), then wraps the round-trip in
//! [`TaskApi`], which turns every outcome into an [`ApiResponse`] envelope.
//!
//! # Design
//! - `TaskClient` is stateless: it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `Transport` is the single I/O seam; `UreqTransport` is the production
//!   implementation and tests substitute their own.
//! - `TaskApi` never returns an error. Failures come back as
//!   `success: false` envelopes.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use api::TaskApi;
pub use client::TaskClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{ApiResponse, CreateTask, Task, TaskStats, TaskStatus, UpdateTask};
