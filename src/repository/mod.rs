pub mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::RepositoryResult,
    models::{Todo, TodoDraft, TodoId},
};

pub use http::HttpTodoRepository;

/// The todo backend as the console sees it: five calls, no state of its own.
///
/// Mutating calls return the backend's answer untouched; the console only
/// echoes it and then reloads the list.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// `GET /todos`
    async fn list(&self) -> RepositoryResult<Vec<Todo>>;

    /// `POST /input?text=..`, interpreted by the backend's language parser.
    async fn submit_text(&self, text: &str) -> RepositoryResult<Value>;

    /// `POST /todos`
    async fn create(&self, draft: &TodoDraft) -> RepositoryResult<Value>;

    /// `PUT /todos/{id}`
    async fn update(&self, id: &TodoId, draft: &TodoDraft) -> RepositoryResult<Value>;

    /// `POST /todos/{id}/complete`
    async fn complete(&self, id: &TodoId) -> RepositoryResult<Value>;
}
