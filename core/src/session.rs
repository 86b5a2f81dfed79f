//! Authentication flows and the resulting `Session`.
//!
//! Both flows validate locally before any network call and are single-shot:
//! no retry, no token refresh.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{classify, Operation, SyncError};
use crate::gateway::Gateway;
use crate::types::{AuthResponse, Credentials, Registration};

/// The authenticated identity scoping every task operation. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: String,
    token: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl From<AuthResponse> for Session {
    fn from(auth: AuthResponse) -> Self {
        Self::new(auth.user_id, auth.token)
    }
}

/// Turns credentials into a `Session` through the injected gateway.
#[derive(Clone)]
pub struct Authenticator {
    gateway: Arc<dyn Gateway>,
}

impl Authenticator {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Session, SyncError> {
        if let Some(err) =
            SyncError::missing_fields(&[("name", name), ("email", email), ("password", password)])
        {
            return Err(err);
        }

        let input = Registration {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.gateway.register(&input).await {
            Ok(auth) => {
                info!(user_id = %auth.user_id, "registered");
                Ok(auth.into())
            }
            Err(err) => {
                warn!(error = %err, "registration failed");
                Err(classify(Operation::Register, &err))
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, SyncError> {
        if let Some(err) = SyncError::missing_fields(&[("email", email), ("password", password)]) {
            return Err(err);
        }

        let input = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.gateway.login(&input).await {
            Ok(auth) => {
                info!(user_id = %auth.user_id, "logged in");
                Ok(auth.into())
            }
            Err(err) => {
                warn!(error = %err, "login failed");
                Err(classify(Operation::Login, &err))
            }
        }
    }
}
