use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::templates::find_template;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Short lowercase base36 token drawn from a v4 uuid.
pub fn random_token(len: usize) -> String {
    let mut bits = Uuid::new_v4().as_u128();
    (0..len)
        .map(|_| {
            let digit = (bits % 36) as usize;
            bits /= 36;
            BASE36[digit] as char
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSession {
    pub user_id: String,
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub expiry_time: DateTime<Utc>,
    pub template_id: String,
    pub report_instance_id: String,
}

impl UserSession {
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.expiry_time - now).to_std().ok().filter(|d| !d.is_zero())
    }
}

/// Formats a countdown as `"{h}h {m}m {s}s"`.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// In-memory store of user sessions. Entries disappear once their TTL has
/// elapsed; nothing is written to disk.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, UserSession>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();
        Self { sessions, ttl }
    }

    pub fn create(&self, user_id: &str, template_id: &str) -> Result<UserSession, AppError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::InvalidInput("Please enter a User ID".to_string()));
        }
        let template = find_template(template_id)?;

        let start_time = Utc::now();
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| AppError::Internal(format!("Session TTL out of range: {}", e)))?;
        let millis = start_time.timestamp_millis();

        let session = UserSession {
            user_id: user_id.to_string(),
            session_id: format!("session_{}_{}", millis, random_token(9)),
            start_time,
            expiry_time: start_time + ttl,
            template_id: template.id.to_string(),
            report_instance_id: format!("instance_{}_{}_{}", user_id, template.id, millis),
        };

        tracing::info!(
            "Created session {} for user {} with template {}",
            session.session_id,
            session.user_id,
            session.template_id
        );
        self.sessions.insert(session.session_id.clone(), session.clone());
        Ok(session)
    }

    /// Returns the live session and its remaining lifetime.
    pub fn get(&self, session_id: &str) -> Result<(UserSession, Duration), AppError> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| AppError::NotFound(format!("Session not found or expired: {}", session_id)))?;

        match session.remaining(Utc::now()) {
            Some(remaining) => Ok((session, remaining)),
            None => {
                tracing::info!("Session {} expired", session_id);
                self.sessions.invalidate(session_id);
                Err(AppError::NotFound(format!("Session not found or expired: {}", session_id)))
            }
        }
    }

    pub fn end(&self, session_id: &str) -> Result<(), AppError> {
        match self.sessions.remove(session_id) {
            Some(session) => {
                tracing::info!("Ended session {} for user {}", session.session_id, session.user_id);
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Session not found or expired: {}", session_id))),
        }
    }
}
