//! Wire DTOs for the todo API.
//!
//! # Design
//! The remote service is inconsistent about how it encodes `completed`: some
//! responses carry a JSON boolean, others a 0/1 number. `TaskItem` accepts
//! both on input and always emits a boolean. Anything else (strings, null,
//! objects) is rejected so the gateway reports a decode failure.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single task as stored by the server. `id` is server-assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub description: String,
    #[serde(deserialize_with = "bool_or_number")]
    pub completed: bool,
}

/// Request body for both create and update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskDraft {
    pub description: String,
    #[serde(deserialize_with = "bool_or_number")]
    pub completed: bool,
}

/// Login payload.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration payload.
#[derive(Clone, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body returned by both register and login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    #[serde(rename = "id")]
    pub user_id: String,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Numbers are truthy when their integer part is non-zero.
fn bool_or_number<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i != 0)
            } else if let Some(u) = n.as_u64() {
                Ok(u != 0)
            } else {
                Ok(n.as_f64().map(|f| f.trunc() != 0.0).unwrap_or(false))
            }
        }
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean or number for `completed`, got {other}"
        ))),
    }
}
