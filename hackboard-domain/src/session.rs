use std::{sync::Arc, time::Duration};

use moka::sync::Cache;
use serde::Serialize;
use uuid::Uuid;

use crate::{admin::AdminId, user::UserId};

pub type SessionToken = String;

/// Sessions expire after four hours of inactivity.
const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 4);

const SESSION_CAPACITY: u64 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Clone, Debug, Serialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

/// Server-side session state. A session carries at most one bound principal:
/// binding a user clears any admin binding and vice versa.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub user_id: Option<UserId>,
    pub admin_id: Option<AdminId>,
    flashes: Vec<Flash>,
}

pub type ArcSessionService = Arc<SessionService>;

pub struct SessionService {
    sessions: Cache<SessionToken, Session>,
}

impl SessionService {
    pub fn new() -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(SESSION_CAPACITY)
                .time_to_idle(SESSION_TTL)
                .build(),
        }
    }

    pub fn create(&self) -> SessionToken {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), Session::default());
        token
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        self.sessions.get(token)
    }

    /// Replaces the whole session with a user binding, dropping any admin
    /// identity and pending flashes.
    pub fn bind_user(&self, token: &str, user_id: UserId) {
        self.sessions.insert(
            token.to_string(),
            Session {
                user_id: Some(user_id),
                admin_id: None,
                flashes: Vec::new(),
            },
        );
    }

    /// Replaces the whole session with an admin binding.
    pub fn bind_admin(&self, token: &str, admin_id: AdminId) {
        self.sessions.insert(
            token.to_string(),
            Session {
                user_id: None,
                admin_id: Some(admin_id),
                flashes: Vec::new(),
            },
        );
    }

    /// Full teardown: every binding and all pending flashes are dropped. The
    /// token itself stays valid so a farewell flash can still be attached.
    pub fn clear(&self, token: &str) {
        self.sessions.insert(token.to_string(), Session::default());
    }

    /// Removes only the admin binding, leaving any user identity and pending
    /// flashes untouched.
    pub fn clear_admin(&self, token: &str) {
        if let Some(mut session) = self.sessions.get(token) {
            session.admin_id = None;
            self.sessions.insert(token.to_string(), session);
        }
    }

    pub fn push_flash(&self, token: &str, category: FlashCategory, message: impl Into<String>) {
        let mut session = self.sessions.get(token).unwrap_or_default();
        session.flashes.push(Flash {
            category,
            message: message.into(),
        });
        self.sessions.insert(token.to_string(), session);
    }

    /// Drains the pending flashes; a message is shown exactly once.
    pub fn take_flashes(&self, token: &str) -> Vec<Flash> {
        let Some(mut session) = self.sessions.get(token) else {
            return Vec::new();
        };
        let flashes = std::mem::take(&mut session.flashes);
        self.sessions.insert(token.to_string(), session);
        flashes
    }
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}
