//! Async facade over the core client: build, execute, parse.

use tracing::{debug, warn};
use todo_core::{ApiError, HttpRequest, HttpResponse, Todo, TodoClient, TodoCreate, TodoUpdate};

use crate::transport::Transport;

/// One method per endpoint. Every failure comes back as an `ApiError`
/// immediately; nothing is retried.
pub struct TodoApi<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> TodoApi<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub async fn get_todos(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self.round_trip(self.client.build_list_todos()).await?;
        self.client.parse_list_todos(response)
    }

    pub async fn get_todo(&self, id: i64) -> Result<Todo, ApiError> {
        let response = self.round_trip(self.client.build_get_todo(id)).await?;
        self.client.parse_get_todo(response)
    }

    pub async fn create_todo(&self, input: &TodoCreate) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(input)?;
        let response = self.round_trip(request).await?;
        self.client.parse_create_todo(response)
    }

    pub async fn update_todo(&self, id: i64, input: &TodoUpdate) -> Result<Todo, ApiError> {
        let request = self.client.build_update_todo(id, input)?;
        let response = self.round_trip(request).await?;
        self.client.parse_update_todo(response)
    }

    pub async fn delete_todo(&self, id: i64) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }

    pub async fn delete_all_todos(&self) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_delete_all_todos()).await?;
        self.client.parse_delete_all_todos(response)
    }

    pub async fn complete_todo(&self, id: i64) -> Result<Todo, ApiError> {
        let response = self.round_trip(self.client.build_complete_todo(id)).await?;
        self.client.parse_complete_todo(response)
    }

    pub async fn incomplete_todo(&self, id: i64) -> Result<Todo, ApiError> {
        let response = self.round_trip(self.client.build_incomplete_todo(id)).await?;
        self.client.parse_incomplete_todo(response)
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        debug!(%method, %path, "sending request");

        match self.transport.execute(request).await {
            Ok(response) => {
                debug!(%method, %path, status = response.status, "received response");
                Ok(response)
            }
            Err(e) => {
                warn!(%method, %path, error = %e, "request failed without a response");
                Err(ApiError::Transport {
                    message: self.client.fallback_message().to_string(),
                    cause: e.to_string(),
                })
            }
        }
    }
}
