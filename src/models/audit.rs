use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::repo::Record;

/// What an audited caller did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Login,
    Logout,
    ViewPatient,
    UpdatePatient,
    CreatePatient,
    DeletePatient,
    ViewUser,
    UpdateUser,
    CreateUser,
    DeleteUser,
    SystemError,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::ViewPatient => "VIEW_PATIENT",
            Self::UpdatePatient => "UPDATE_PATIENT",
            Self::CreatePatient => "CREATE_PATIENT",
            Self::DeletePatient => "DELETE_PATIENT",
            Self::ViewUser => "VIEW_USER",
            Self::UpdateUser => "UPDATE_USER",
            Self::CreateUser => "CREATE_USER",
            Self::DeleteUser => "DELETE_USER",
            Self::SystemError => "SYSTEM_ERROR",
        };
        f.write_str(name)
    }
}

/// A stored audit entry. Entries are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
    pub action: AuditAction,
    #[serde(default)]
    pub details: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// An event to append; id and timestamp are assigned by the sink.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewAuditLog {
    #[validate(length(min = 1, message = "userId must not be empty"))]
    pub user_id: String,
    pub user_name: String,
    pub action: AuditAction,
    #[serde(default)]
    pub details: Map<String, Value>,
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl NewAuditLog {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>, action: AuditAction) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            action,
            details: Map::new(),
            ip_address: None,
        }
    }

    pub fn detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn ip_address(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }
}

impl Record for AuditLog {
    const KIND: &'static str = "Audit log";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_wire_name_matches_display() {
        for action in [AuditAction::Login, AuditAction::UpdatePatient, AuditAction::SystemError] {
            let wire = serde_json::to_value(action).unwrap();
            assert_eq!(wire, Value::String(action.to_string()));
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        let json = r#"{"userId":"u1","userName":"n","action":"HACK","details":{}}"#;
        assert!(serde_json::from_str::<NewAuditLog>(json).is_err());
    }
}
