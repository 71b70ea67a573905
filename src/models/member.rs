use serde::{Deserialize, Serialize};

use super::MemberIdentity;

/// Member row as read from the `members` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl Member {
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        format!("{} {}", first, last).trim().to_string()
    }

    pub fn identity(&self) -> MemberIdentity {
        MemberIdentity {
            id: self.id.clone(),
            name: self.display_name(),
            email: self.email.clone().unwrap_or_default(),
        }
    }
}

/// Fields written when a default password is assigned
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PasswordUpdate {
    pub password_hash: String,
    pub password_reset_required: bool,
    pub password_last_changed: String,
}

/// Authenticated caller resolved from an access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}
