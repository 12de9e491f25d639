use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity only. Credentials live with whatever authenticates the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
            created_at: Utc::now(),
        }
    }
}
