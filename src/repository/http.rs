use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::TodoRepository;
use crate::{
    config::Config,
    error::{RepositoryError, RepositoryResult},
    models::{Todo, TodoDraft, TodoId},
};

#[derive(Debug, Clone)]
pub struct HttpTodoRepository {
    client: Client,
    base_url: String,
}
impl HttpTodoRepository {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.api_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let url = self.url(path);
        let request = self.client.request(method, &url);
        (url, request)
    }

    // Sends the request and decodes the JSON answer. Transport errors,
    // non-success statuses and bad bodies all come back as errors.
    async fn send<T: DeserializeOwned>(url: String, request: RequestBuilder) -> RepositoryResult<T> {
        tracing::debug!(%url, "calling backend");
        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => return Err(RepositoryError::Transport { url, source }),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(RepositoryError::Status { url, status });
        }

        response
            .json()
            .await
            .map_err(|source| RepositoryError::Decode { url, source })
    }
}

#[async_trait]
impl TodoRepository for HttpTodoRepository {
    async fn list(&self) -> RepositoryResult<Vec<Todo>> {
        let (url, request) = self.request(Method::GET, "/todos");
        Self::send(url, request).await
    }

    async fn submit_text(&self, text: &str) -> RepositoryResult<Value> {
        let (url, request) = self.request(Method::POST, "/input");
        Self::send(url, request.query(&[("text", text)])).await
    }

    async fn create(&self, draft: &TodoDraft) -> RepositoryResult<Value> {
        let (url, request) = self.request(Method::POST, "/todos");
        Self::send(url, request.json(draft)).await
    }

    async fn update(&self, id: &TodoId, draft: &TodoDraft) -> RepositoryResult<Value> {
        let (url, request) = self.request(Method::PUT, &format!("/todos/{id}"));
        Self::send(url, request.json(draft)).await
    }

    async fn complete(&self, id: &TodoId) -> RepositoryResult<Value> {
        let (url, request) = self.request(Method::POST, &format!("/todos/{id}/complete"));
        Self::send(url, request).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn repository_at(api_base_url: String) -> HttpTodoRepository {
        let config = Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            api_base_url,
            api_timeout: Duration::from_secs(5),
            session_idle: Duration::from_secs(60),
        };
        HttpTodoRepository::new(&config).unwrap()
    }

    fn repository(server: &MockServer) -> HttpTodoRepository {
        repository_at(server.uri())
    }

    #[tokio::test]
    async fn test_list_keeps_backend_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 2, "title": "second", "completed": true, "due_date": null },
                { "id": 1, "title": "first", "completed": false, "due_date": "2025-03-01" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let todos = repository(&server).list().await.unwrap();
        let ids: Vec<&str> = todos.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
        assert!(todos[0].completed);
        assert_eq!(todos[1].due_date.as_deref(), Some("2025-03-01"));
    }

    #[tokio::test]
    async fn test_submit_text_goes_in_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/input"))
            .and(query_param("text", "Remind me to call mom tomorrow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "unknown" })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = repository(&server)
            .submit_text("Remind me to call mom tomorrow")
            .await
            .unwrap();
        assert_eq!(answer, json!({ "result": "unknown" }));
    }

    #[tokio::test]
    async fn test_create_posts_draft() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todos"))
            .and(body_json(json!({ "title": "Buy milk", "due_date": null })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": "added",
                "todo": { "id": 1, "title": "Buy milk", "completed": false, "due_date": null }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = repository(&server)
            .create(&TodoDraft::new("Buy milk", ""))
            .await
            .unwrap();
        assert_eq!(answer["result"], "added");
    }

    #[tokio::test]
    async fn test_update_puts_draft() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/todos/4"))
            .and(body_json(json!({ "title": "renamed", "due_date": "2025-04-01" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "updated" })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = repository(&server)
            .update(&TodoId::new("4"), &TodoDraft::new("renamed", "2025-04-01"))
            .await
            .unwrap();
        assert_eq!(answer["result"], "updated");
    }

    #[tokio::test]
    async fn test_complete_posts_to_dedicated_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todos/9/complete"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "completed" })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = repository(&server).complete(&TodoId::new("9")).await.unwrap();
        assert_eq!(answer["result"], "completed");
    }

    #[tokio::test]
    async fn test_error_status_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = repository(&server).list().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Status { status, .. } if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn test_non_json_body_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todos/1/complete"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let err = repository(&server)
            .complete(&TodoId::new("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // grab a free port, then close it again
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let repository = repository_at(format!("http://127.0.0.1:{port}"));

        let err = repository.list().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Transport { .. }));
    }
}
