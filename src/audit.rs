//! Append-only audit trail
//!
//! The sink exposes appends and reads only; nothing in its interface can
//! edit or drop an existing entry.

use chrono::Utc;
use tracing::{instrument, warn};

use crate::db::DocumentStore;
use crate::error::AppResult;
use crate::models::{new_id, AuditLog, NewAuditLog};
use crate::repo::{AuditLogs, Repository};

#[derive(Clone)]
pub struct AuditSink {
    logs: Repository<AuditLogs>,
}

impl AuditSink {
    pub fn new(store: DocumentStore) -> Self {
        Self { logs: Repository::new(store) }
    }

    /// Append `event` with a server-assigned id and timestamp.
    #[instrument(skip(self, event), fields(action = %event.action, user_id = %event.user_id))]
    pub async fn record(&self, event: NewAuditLog) -> AppResult<AuditLog> {
        let entry = AuditLog {
            id: new_id(),
            timestamp: Utc::now(),
            user_id: event.user_id,
            user_name: event.user_name,
            action: event.action,
            details: event.details,
            ip_address: event.ip_address,
        };
        self.logs.insert(entry).await
    }

    /// Append `event`, logging instead of returning a failure.
    ///
    /// Used after a primary action has already succeeded.
    pub async fn record_best_effort(&self, event: NewAuditLog) {
        let action = event.action;
        if let Err(error) = self.record(event).await {
            warn!(%action, %error, "failed to append audit log");
        }
    }

    /// All entries in append order.
    pub async fn list(&self) -> AppResult<Vec<AuditLog>> {
        self.logs.list().await
    }
}
