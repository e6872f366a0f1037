use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::repo::{Child, Owner, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Day,
    Night,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Duty {
    pub id: String,
    pub date: NaiveDate,
    pub shift: Shift,
    pub is_active: bool,
}

/// Duty as submitted by a client; the id is assigned if absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DutyInput {
    #[serde(default)]
    pub id: Option<String>,
    pub date: NaiveDate,
    pub shift: Shift,
    pub is_active: bool,
}

impl From<DutyInput> for Duty {
    fn from(input: DutyInput) -> Self {
        Self {
            id: input.id.unwrap_or_else(super::new_id),
            date: input.date,
            shift: input.shift,
            is_active: input.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caregiver {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub duties: Vec<Duty>,
}

impl Record for Caregiver {
    const KIND: &'static str = "Caregiver";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Child for Duty {
    type Key = NaiveDate;

    const KIND: &'static str = "Duty";

    fn key(&self) -> &NaiveDate {
        &self.date
    }

    // The stored duty keeps its id; only the schedule is replaced.
    fn replace_with(&mut self, incoming: Self) {
        self.shift = incoming.shift;
        self.is_active = incoming.is_active;
    }
}

impl Owner for Caregiver {
    type Child = Duty;

    fn children(&self) -> &[Duty] {
        &self.duties
    }

    fn children_mut(&mut self) -> &mut Vec<Duty> {
        &mut self.duties
    }
}
