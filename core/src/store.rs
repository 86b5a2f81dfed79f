//! The local mirror of the remote task collection.
//!
//! # Design
//! `TaskStore` exclusively owns the collection and publishes it through a
//! `watch` channel, so the presentation layer reads snapshots (or awaits
//! changes) but can never mutate it. Dropping a receiver mid-operation is
//! harmless; publishing to no one is not an error.
//!
//! Nothing is applied optimistically before the server confirms it, so a
//! failed operation always leaves the collection exactly as it was.
//!
//! Reconciliation is deliberately asymmetric:
//! - `refresh` replaces the whole collection with the server's list.
//! - `add_task` appends the created item, then runs a full refresh so the
//!   server's ordering wins.
//! - `set_completed` swaps the returned item in at its current index and
//!   does not refresh.
//!
//! Operations are serialized by an async mutex held across the gateway call,
//! so an update can never land on an index a concurrent refresh has since
//! reshuffled.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{watch, Mutex, RwLock};
use tracing::{info, warn};

use crate::error::{classify, Operation, SyncError};
use crate::gateway::Gateway;
use crate::session::Session;
use crate::types::{TaskDraft, TaskItem};

pub struct TaskStore {
    gateway: Arc<dyn Gateway>,
    session: RwLock<Option<Session>>,
    tasks: watch::Sender<Vec<TaskItem>>,
    op: Mutex<()>,
}

impl TaskStore {
    /// A store with no session; every operation fails with `NotAuthenticated`
    /// until `sign_in` is called.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let (tasks, _) = watch::channel(Vec::new());
        Self {
            gateway,
            session: RwLock::new(None),
            tasks,
            op: Mutex::new(()),
        }
    }

    pub fn with_session(gateway: Arc<dyn Gateway>, session: Session) -> Self {
        let store = Self::new(gateway);
        Self {
            session: RwLock::new(Some(session)),
            ..store
        }
    }

    /// Start a new session. The collection starts empty.
    pub async fn sign_in(&self, session: Session) {
        let _op = self.op.lock().await;
        info!(user_id = session.user_id(), "session started");
        *self.session.write().await = Some(session);
        self.tasks.send_replace(Vec::new());
    }

    /// Destroy the session and clear the collection.
    pub async fn sign_out(&self) {
        let _op = self.op.lock().await;
        if let Some(session) = self.session.write().await.take() {
            info!(user_id = session.user_id(), "session ended");
        }
        self.tasks.send_replace(Vec::new());
    }

    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// A snapshot of the collection in its current order.
    pub fn tasks(&self) -> Vec<TaskItem> {
        self.tasks.borrow().clone()
    }

    /// Observe the collection; the receiver sees every published change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<TaskItem>> {
        self.tasks.subscribe()
    }

    /// Replace the collection with the server's list.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        let _op = self.op.lock().await;
        let session = self.require_session().await?;
        self.refresh_locked(&session).await
    }

    /// Create a task on the server, append it, then refresh.
    ///
    /// If the create succeeds but the follow-up refresh fails, the appended
    /// item stays and the refresh failure is reported.
    pub async fn add_task(&self, description: &str) -> Result<(), SyncError> {
        if let Some(err) = SyncError::missing_fields(&[("description", description)]) {
            return Err(err);
        }
        let _op = self.op.lock().await;
        let session = self.require_session().await?;

        let draft = TaskDraft {
            description: description.to_string(),
            completed: false,
        };
        let created = match self.gateway.create_task(session.token(), &draft).await {
            Ok(created) => created,
            Err(err) => {
                warn!(error = %err, "create task failed");
                return Err(classify(Operation::Add, &err));
            }
        };

        info!(id = %created.id, "task created");
        self.tasks.send_modify(|tasks| {
            match tasks.iter().position(|t| t.id == created.id) {
                Some(i) => tasks[i] = created,
                None => tasks.push(created),
            }
        });

        self.refresh_locked(&session).await
    }

    /// Set the completed flag of the task with `id`, keeping its description.
    pub async fn set_completed(&self, id: &str, completed: bool) -> Result<(), SyncError> {
        let _op = self.op.lock().await;
        let session = self.require_session().await?;

        let current = self.tasks.borrow().iter().find(|t| t.id == id).cloned();
        let Some(current) = current else {
            return Err(SyncError::NotFound(format!(
                "task {id} is not in the local collection"
            )));
        };

        let draft = TaskDraft {
            description: current.description,
            completed,
        };
        let updated = match self.gateway.update_task(session.token(), id, &draft).await {
            Ok(updated) => updated,
            Err(err) => {
                warn!(id, error = %err, "update task failed");
                return Err(classify(Operation::Update, &err));
            }
        };

        let replaced = self.tasks.send_if_modified(|tasks| {
            match tasks.iter().position(|t| t.id == id) {
                Some(i) => {
                    tasks[i] = updated;
                    true
                }
                None => false,
            }
        });
        if !replaced {
            warn!(id, "task disappeared while its update was in flight");
        }
        Ok(())
    }

    async fn require_session(&self) -> Result<Session, SyncError> {
        self.session
            .read()
            .await
            .clone()
            .ok_or_else(|| SyncError::NotAuthenticated("not signed in".to_string()))
    }

    /// Caller must hold `op`.
    async fn refresh_locked(&self, session: &Session) -> Result<(), SyncError> {
        let listed = match self.gateway.list_tasks(session.token()).await {
            Ok(listed) => listed,
            Err(err) => {
                warn!(error = %err, "fetch tasks failed");
                return Err(classify(Operation::Fetch, &err));
            }
        };

        let mut seen = HashSet::new();
        let total = listed.len();
        let tasks: Vec<TaskItem> = listed
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .collect();
        if tasks.len() != total {
            warn!(dropped = total - tasks.len(), "server listed duplicate task ids");
        }

        info!(count = tasks.len(), "task collection replaced");
        self.tasks.send_replace(tasks);
        Ok(())
    }
}
