//! Rows of the backend tables and the auth token payload.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A product whose `name` is searched for in Telegram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id:         String,
    pub title:      String,
    pub name:       String,
    pub created_at: String,
    pub updated_at: String,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "🛒 {} ({}) - ID: {}", self.title, self.name, self.id)
    }
}

/// A scheduled search session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id:            String,
    pub cron_schedule: String,
    #[serde(default)]
    pub provider_ids:  Vec<String>,
    #[serde(default)]
    pub product_ids:   Vec<String>,
    pub created_at:    String,
    pub updated_at:    String,
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "🗓 {} [{}] - {} provider(s), {} product(s)",
            self.id,
            self.cron_schedule,
            self.provider_ids.len(),
            self.product_ids.len(),
        )
    }
}

/// Body of a successful `/auth/v1/token` call.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token:  String,
    pub refresh_token: String,
    /// Lifetime in seconds.
    pub expires_in:    i64,
    /// Absolute expiry as Unix time; preferred over `expires_in` when present.
    #[serde(default)]
    pub expires_at:    Option<i64>,
}

impl TokenResponse {
    pub(crate) fn expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.expires_at
            .and_then(|t| DateTime::from_timestamp(t, 0))
            .unwrap_or_else(|| now + TimeDelta::seconds(self.expires_in))
    }
}

/// Error body of the auth endpoint. Field names vary between server versions.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AuthErrorBody {
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub msg:               Option<String>,
    #[serde(default)]
    pub error:             Option<String>,
}

impl AuthErrorBody {
    pub(crate) fn message(self) -> Option<String> {
        self.error_description.or(self.msg).or(self.error)
    }
}
