//! A scripted in-memory `Gateway` double.
//!
//! Behaves like a tiny server (ids are assigned sequentially, updates apply
//! to the stored list) and records every call so tests can assert on the
//! number and order of network round-trips. Failures are injected per
//! operation with `fail_next`.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use todo_sync::{ApiError, AuthResponse, Credentials, Gateway, Registration, TaskDraft, TaskItem};

#[derive(Default)]
struct State {
    tasks: Vec<TaskItem>,
    next_id: u64,
    auth: Option<AuthResponse>,
    failures: HashMap<&'static str, VecDeque<ApiError>>,
    calls: Vec<&'static str>,
    tokens: Vec<String>,
    drafts: Vec<TaskDraft>,
}

#[derive(Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<State>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        let gateway = Self::default();
        {
            let mut state = gateway.state.lock().unwrap();
            state.next_id = 1;
            state.auth = Some(AuthResponse {
                user_id: "1".to_string(),
                token: "tok".to_string(),
            });
        }
        gateway
    }

    pub fn task(id: &str, description: &str, completed: bool) -> TaskItem {
        TaskItem {
            id: id.to_string(),
            description: description.to_string(),
            completed,
        }
    }

    pub fn with_tasks(self, tasks: Vec<TaskItem>) -> Self {
        self.set_server_tasks(tasks);
        self
    }

    pub fn with_next_id(self, next_id: u64) -> Self {
        self.state.lock().unwrap().next_id = next_id;
        self
    }

    pub fn with_auth(self, user_id: &str, token: &str) -> Self {
        self.state.lock().unwrap().auth = Some(AuthResponse {
            user_id: user_id.to_string(),
            token: token.to_string(),
        });
        self
    }

    /// Replace the server-side list, as another client would.
    pub fn set_server_tasks(&self, tasks: Vec<TaskItem>) {
        self.state.lock().unwrap().tasks = tasks;
    }

    pub fn server_tasks(&self) -> Vec<TaskItem> {
        self.state.lock().unwrap().tasks.clone()
    }

    /// Make the next call to `operation` fail with `err`.
    pub fn fail_next(&self, operation: &'static str, err: ApiError) {
        self.state
            .lock()
            .unwrap()
            .failures
            .entry(operation)
            .or_default()
            .push_back(err);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| **c == operation).count()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.state.lock().unwrap().tokens.clone()
    }

    pub fn drafts(&self) -> Vec<TaskDraft> {
        self.state.lock().unwrap().drafts.clone()
    }

    fn begin(&self, operation: &'static str, token: Option<&str>) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation);
        if let Some(token) = token {
            state.tokens.push(token.to_string());
        }
        match state.failures.get_mut(operation).and_then(|q| q.pop_front()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn auth(&self) -> Result<AuthResponse, ApiError> {
        self.state
            .lock()
            .unwrap()
            .auth
            .clone()
            .ok_or_else(|| ApiError::Decode("no auth configured".to_string()))
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn register(&self, _input: &Registration) -> Result<AuthResponse, ApiError> {
        self.begin("register", None)?;
        self.auth()
    }

    async fn login(&self, _input: &Credentials) -> Result<AuthResponse, ApiError> {
        self.begin("login", None)?;
        self.auth()
    }

    async fn list_tasks(&self, token: &str) -> Result<Vec<TaskItem>, ApiError> {
        self.begin("list_tasks", Some(token))?;
        Ok(self.server_tasks())
    }

    async fn create_task(&self, token: &str, input: &TaskDraft) -> Result<TaskItem, ApiError> {
        self.begin("create_task", Some(token))?;
        let mut state = self.state.lock().unwrap();
        state.drafts.push(input.clone());
        let id = state.next_id.to_string();
        state.next_id += 1;
        let created = TaskItem {
            id,
            description: input.description.clone(),
            completed: input.completed,
        };
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(
        &self,
        token: &str,
        id: &str,
        input: &TaskDraft,
    ) -> Result<TaskItem, ApiError> {
        self.begin("update_task", Some(token))?;
        let mut state = self.state.lock().unwrap();
        state.drafts.push(input.clone());
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::ClientRejected {
                status: 404,
                body: "todo not found".to_string(),
            })?;
        task.description = input.description.clone();
        task.completed = input.completed;
        Ok(task.clone())
    }
}
