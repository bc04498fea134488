//! Admin dashboard sessions.
//!
//! The dashboard used to be unlocked by a flag the browser set for itself.
//! Here the server issues an opaque token after checking the passcode, and
//! every admin request presents it back. Tokens live in memory only; a
//! restart logs everyone out.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Result, RsvpError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionStore {
    passcode_digest: Option<blake3::Hash>,
    ttl: Duration,
    sessions: Mutex<HashMap<String, AdminSession>>,
}

impl SessionStore {
    /// `None` passcode disables the dashboard entirely.
    pub fn new(passcode: Option<&str>, ttl_minutes: i64) -> Self {
        Self {
            passcode_digest: passcode.map(|p| blake3::hash(p.as_bytes())),
            ttl: Duration::minutes(ttl_minutes.max(1)),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn enabled(&self) -> bool {
        self.passcode_digest.is_some()
    }

    pub async fn issue(&self, passcode: &str) -> Result<AdminSession> {
        self.issue_at(passcode, Utc::now()).await
    }

    pub async fn issue_at(&self, passcode: &str, now: DateTime<Utc>) -> Result<AdminSession> {
        let Some(expected) = self.passcode_digest else {
            return Err(RsvpError::FeatureDisabled {
                message: "Admin dashboard is disabled".into(),
            });
        };
        // blake3::Hash equality is constant-time.
        if blake3::hash(passcode.as_bytes()) != expected {
            tracing::warn!("admin login rejected");
            return Err(RsvpError::Unauthorized {
                message: "Invalid passcode".into(),
            });
        }

        let session = AdminSession {
            token: Uuid::new_v4().to_string(),
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session.token.clone(), session.clone());
        tracing::info!(expires_at = %session.expires_at, "admin session issued");
        Ok(session)
    }

    pub async fn validate(&self, token: &str) -> Result<AdminSession> {
        self.validate_at(token, Utc::now()).await
    }

    pub async fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<AdminSession> {
        if !self.enabled() {
            return Err(RsvpError::FeatureDisabled {
                message: "Admin dashboard is disabled".into(),
            });
        }
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions
            .get(token)
            .cloned()
            .ok_or_else(|| RsvpError::Unauthorized {
                message: "Session expired or invalid".into(),
            })
    }

    /// Returns whether a live session was removed.
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.lock().await.remove(token).is_some()
    }
}
