//! The remote API boundary.
//!
//! # Design
//! `Gateway` is the typed contract the session and task store depend on. It
//! is injected at construction (usually as `Arc<dyn Gateway>`) so tests can
//! substitute a scripted double. `HttpGateway` is the production
//! implementation: it asks `TodoClient` for a plain-data request, executes it
//! with reqwest, and hands the plain-data response back to `TodoClient` for
//! status classification and decoding. No retries, no caching.

use async_trait::async_trait;
use tracing::debug;

use crate::client::TodoClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AuthResponse, Credentials, Registration, TaskDraft, TaskItem};

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn register(&self, input: &Registration) -> Result<AuthResponse, ApiError>;

    async fn login(&self, input: &Credentials) -> Result<AuthResponse, ApiError>;

    async fn list_tasks(&self, token: &str) -> Result<Vec<TaskItem>, ApiError>;

    async fn create_task(&self, token: &str, input: &TaskDraft) -> Result<TaskItem, ApiError>;

    async fn update_task(
        &self,
        token: &str,
        id: &str,
        input: &TaskDraft,
    ) -> Result<TaskItem, ApiError>;
}

/// `Gateway` over real HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    client: TodoClient,
}

impl HttpGateway {
    pub fn new(client: TodoClient) -> Self {
        Self {
            http: reqwest::Client::new(),
            client,
        }
    }

    /// Build a gateway from configuration, applying the request timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            client: config.todo_client(),
        })
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        // The query string carries the API key; keep it out of the logs.
        let endpoint = request.path.split('?').next().unwrap_or_default();
        debug!(method = request.method.as_str(), endpoint, "sending request");

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
        };
        let mut builder = self.http.request(method, &request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        debug!(status, endpoint, "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn register(&self, input: &Registration) -> Result<AuthResponse, ApiError> {
        let request = self.client.build_register(input)?;
        self.client.parse_auth(self.execute(request).await?)
    }

    async fn login(&self, input: &Credentials) -> Result<AuthResponse, ApiError> {
        let request = self.client.build_login(input)?;
        self.client.parse_auth(self.execute(request).await?)
    }

    async fn list_tasks(&self, token: &str) -> Result<Vec<TaskItem>, ApiError> {
        let request = self.client.build_list_tasks(token);
        self.client.parse_list_tasks(self.execute(request).await?)
    }

    async fn create_task(&self, token: &str, input: &TaskDraft) -> Result<TaskItem, ApiError> {
        let request = self.client.build_create_task(token, input)?;
        self.client.parse_task(self.execute(request).await?)
    }

    async fn update_task(
        &self,
        token: &str,
        id: &str,
        input: &TaskDraft,
    ) -> Result<TaskItem, ApiError> {
        let request = self.client.build_update_task(token, id, input)?;
        self.client.parse_task(self.execute(request).await?)
    }
}
