//! Request construction and response decoding for every todo endpoint.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and the fallback message used for
//! error responses without a `detail` field. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. The caller executes the actual HTTP
//! round-trip, keeping the core deterministic and free of I/O dependencies.

use serde::de::DeserializeOwned;

use crate::error::{ApiError, DEFAULT_ERROR_MESSAGE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Todo, TodoCreate, TodoUpdate};

/// Knows the endpoints and payloads of the todo API; performs no I/O.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    fallback_message: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            fallback_message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }

    /// Replace the message used when a failed response has no `detail`.
    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    pub fn fallback_message(&self) -> &str {
        &self.fallback_message
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        self.bare(HttpMethod::Get, "/todos".to_string())
    }

    pub fn build_get_todo(&self, id: i64) -> HttpRequest {
        self.bare(HttpMethod::Get, format!("/todos/{id}"))
    }

    pub fn build_create_todo(&self, input: &TodoCreate) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, "/todos".to_string(), input)
    }

    pub fn build_update_todo(&self, id: i64, input: &TodoUpdate) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Put, format!("/todos/{id}"), input)
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        self.bare(HttpMethod::Delete, format!("/todos/{id}"))
    }

    pub fn build_delete_all_todos(&self) -> HttpRequest {
        self.bare(HttpMethod::Delete, "/todos".to_string())
    }

    pub fn build_complete_todo(&self, id: i64) -> HttpRequest {
        self.bare(HttpMethod::Patch, format!("/todos/{id}/complete"))
    }

    pub fn build_incomplete_todo(&self, id: i64) -> HttpRequest {
        self.bare(HttpMethod::Patch, format!("/todos/{id}/incomplete"))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        self.json_body(response)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        self.json_body(response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        self.json_body(response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        self.json_body(response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        self.check_status(&response)
    }

    pub fn parse_delete_all_todos(&self, response: HttpResponse) -> Result<(), ApiError> {
        self.check_status(&response)
    }

    pub fn parse_complete_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        self.json_body(response)
    }

    pub fn parse_incomplete_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        self.json_body(response)
    }

    fn bare(&self, method: HttpMethod, endpoint: String) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{endpoint}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_json<B: serde::Serialize>(
        &self,
        method: HttpMethod,
        endpoint: String,
        input: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: format!("{}{endpoint}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    fn json_body<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        self.check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Map non-success status codes to the appropriate `ApiError` variant.
    fn check_status(&self, response: &HttpResponse) -> Result<(), ApiError> {
        if response.is_success() {
            return Ok(());
        }
        Err(ApiError::from_response(
            response.status,
            &response.body,
            &self.fallback_message,
        ))
    }
}
