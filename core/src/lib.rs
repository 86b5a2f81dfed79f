//! Client-side sync layer for the todo service.
//!
//! # Overview
//! Authenticates a user, then keeps an in-memory, ordered collection of
//! tasks consistent with the remote store through create/read/update calls.
//! Every failure reaches the caller as a single `SyncError` with a
//! displayable detail string.
//!
//! # Design
//! - `TodoClient` is a stateless codec: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse` (host-does-IO).
//! - `Gateway` is the async boundary; `HttpGateway` runs the codec over
//!   reqwest. Sessions and stores receive a gateway explicitly, so tests
//!   inject a double instead of touching global state.
//! - `Authenticator` turns credentials into a `Session`; `TaskStore` owns
//!   the collection for that session.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod session;
pub mod store;
pub mod types;

pub use client::TodoClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{classify, ApiError, Operation, SyncError};
pub use gateway::{Gateway, HttpGateway};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{Authenticator, Session};
pub use store::TaskStore;
pub use types::{AuthResponse, Credentials, Registration, TaskDraft, TaskItem};
