//! On-disk document shapes, one per resource.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Collection;
use crate::models::{AuditLog, Caregiver, Patient, User};

macro_rules! collection {
    ($name:ident, $resource:literal, $field:ident, $record:ty) => {
        #[derive(Debug, Clone, Default, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(default)]
            pub $field: Vec<$record>,
            /// Other top-level keys (counters and the like), written back as read.
            #[serde(flatten)]
            pub extra: Map<String, Value>,
        }

        impl Collection for $name {
            type Record = $record;

            const RESOURCE: &'static str = $resource;

            fn records(&self) -> &[$record] {
                &self.$field
            }

            fn records_mut(&mut self) -> &mut Vec<$record> {
                &mut self.$field
            }

            fn into_records(self) -> Vec<$record> {
                self.$field
            }
        }
    };
}

collection!(Users, "users", users, User);
collection!(Caregivers, "duties", caregivers, Caregiver);
collection!(Patients, "patients", patients, Patient);
collection!(AuditLogs, "auditLogs", audit_logs, AuditLog);
