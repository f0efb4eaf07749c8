use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time::duration_hours;

/// A completed work interval. Field names are camelCase on disk so exports from the browser
/// version of the tracker load as is.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntity {
    pub tap_in: DateTime<Utc>,
    pub tap_out: DateTime<Utc>,
}

impl SessionEntity {
    /// Worked hours. A session whose end precedes its start (the clock was moved back) counts as
    /// zero.
    pub fn hours(&self) -> f64 {
        duration_hours(&self.tap_in, &self.tap_out).max(0.)
    }
}

/// The session the user is currently tapped into.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionEntity {
    pub tap_in: DateTime<Utc>,
}

impl OpenSessionEntity {
    pub fn elapsed_hours(&self, now: &DateTime<Utc>) -> f64 {
        duration_hours(&self.tap_in, now).max(0.)
    }

    pub fn close(self, tap_out: DateTime<Utc>) -> SessionEntity {
        SessionEntity {
            tap_in: self.tap_in,
            tap_out,
        }
    }
}

/// Everything the store persists: the session log in creation order plus the open session.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct SessionState {
    pub sessions: Vec<SessionEntity>,
    pub open: Option<OpenSessionEntity>,
}

impl SessionState {
    pub fn is_tapped_in(&self) -> bool {
        self.open.is_some()
    }
}

/// Layout of an export file.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntity {
    pub sessions: Vec<SessionEntity>,
    pub export_date: DateTime<Utc>,
}
