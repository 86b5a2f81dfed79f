//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only the base URL and the optional API key and carries
//! no mutable state between calls. Each endpoint is split into a `build_*`
//! method that produces a fully resolved `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. A `Gateway` executes the round-trip in
//! between, so this module stays deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AuthResponse, Credentials, Registration, TaskDraft, TaskItem};

/// Synchronous, stateless codec for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    api_key: Option<String>,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Append `?apikey=<key>` to every endpoint URL.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn build_register(&self, input: &Registration) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/users/register", None, input)
    }

    pub fn build_login(&self, input: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/users/login", None, input)
    }

    pub fn build_list_tasks(&self, token: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url("/api/todos"),
            headers: vec![bearer(token)],
            body: None,
        }
    }

    pub fn build_create_task(&self, token: &str, input: &TaskDraft) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/todos", Some(token), input)
    }

    pub fn build_update_task(
        &self,
        token: &str,
        id: &str,
        input: &TaskDraft,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/api/todos/{id}"), Some(token), input)
    }

    pub fn parse_auth(&self, response: HttpResponse) -> Result<AuthResponse, ApiError> {
        decode(response)
    }

    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<Vec<TaskItem>, ApiError> {
        decode(response)
    }

    pub fn parse_task(&self, response: HttpResponse) -> Result<TaskItem, ApiError> {
        decode(response)
    }

    fn url(&self, path: &str) -> String {
        match &self.api_key {
            Some(key) => format!("{}{path}?apikey={key}", self.base_url),
            None => format!("{}{path}", self.base_url),
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Encode(e.to_string()))?;
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        if let Some(token) = token {
            headers.push(bearer(token));
        }
        Ok(HttpRequest {
            method,
            path: self.url(path),
            headers,
            body: Some(body),
        })
    }
}

fn bearer(token: &str) -> (String, String) {
    ("authorization".to_string(), format!("Bearer {token}"))
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
pub fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    let status = response.status;
    let body = || response.body.clone();
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(ApiError::Unauthorized { status, body: body() }),
        400..=499 => Err(ApiError::ClientRejected { status, body: body() }),
        _ => Err(ApiError::ServerError { status, body: body() }),
    }
}
