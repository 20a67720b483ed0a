//! Sign-in gate for transcript saving
//!
//! Saving to the library requires a signed-in user. The gate is a trait so
//! deployments can plug in a real identity provider; the built-ins cover
//! the single-user cases: open access and a shared token.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credential")]
    InvalidCredential,
}

pub trait AuthGate: Send + Sync {
    fn current_user(&self) -> Option<User>;
    fn login(&self, credential: &str) -> Result<User, AuthError>;
    fn logout(&self);
}

/// No sign-in required; every request acts as the local user.
pub struct OpenAccess;

impl OpenAccess {
    fn local_user() -> User {
        User {
            id: "local".to_string(),
            name: "Local User".to_string(),
        }
    }
}

impl AuthGate for OpenAccess {
    fn current_user(&self) -> Option<User> {
        Some(Self::local_user())
    }

    fn login(&self, _credential: &str) -> Result<User, AuthError> {
        Ok(Self::local_user())
    }

    fn logout(&self) {}
}

/// Single shared token; login stores the session, logout clears it.
pub struct TokenAuth {
    token: String,
    user: RwLock<Option<User>>,
}

impl TokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: RwLock::new(None),
        }
    }
}

impl AuthGate for TokenAuth {
    fn current_user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn login(&self, credential: &str) -> Result<User, AuthError> {
        if credential != self.token {
            warn!("Rejected login with invalid token");
            return Err(AuthError::InvalidCredential);
        }

        let user = User {
            id: "token-user".to_string(),
            name: "Operator".to_string(),
        };
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = Some(user.clone());
        info!("User {} signed in", user.name);
        Ok(user)
    }

    fn logout(&self) {
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = None;
        info!("User signed out");
    }
}
