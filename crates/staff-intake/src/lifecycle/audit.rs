use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::ApplicationId;
use super::store::{StoreError, StoreSession};

/// Identifier wrapper for audit log entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditLogId(pub String);

/// What happened. Lifecycle events use the two fixed actions; events
/// reported from outside the engine carry whatever action label the caller
/// supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum AuditAction {
    ApplicationSubmitted,
    StatusChanged,
    Other(String),
}

impl AuditAction {
    pub fn as_str(&self) -> &str {
        match self {
            AuditAction::ApplicationSubmitted => "APPLICATION_SUBMITTED",
            AuditAction::StatusChanged => "STATUS_CHANGE",
            AuditAction::Other(action) => action,
        }
    }
}

impl From<AuditAction> for String {
    fn from(action: AuditAction) -> Self {
        action.as_str().to_string()
    }
}

impl From<String> for AuditAction {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "APPLICATION_SUBMITTED" => AuditAction::ApplicationSubmitted,
            "STATUS_CHANGE" => AuditAction::StatusChanged,
            _ => AuditAction::Other(raw),
        }
    }
}

/// One immutable record of a lifecycle or externally reported event. Never
/// updated or deleted after the transaction that wrote it commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: AuditLogId,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub username: Option<String>,
    pub applicant_name: Option<String>,
    pub applicant_position: Option<String>,
    pub application_id: Option<ApplicationId>,
    pub source_address: Option<String>,
    pub details: String,
}

/// Event payload handed to the recorder before an id and timestamp exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub action: AuditAction,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub applicant_name: Option<String>,
    #[serde(default)]
    pub applicant_position: Option<String>,
    #[serde(default)]
    pub application_id: Option<ApplicationId>,
    #[serde(default)]
    pub source_address: Option<String>,
    pub details: String,
    /// Honored when the reporting side already stamped the event.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

static LOG_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_log_id() -> AuditLogId {
    let id = LOG_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AuditLogId(format!("log-{id:06}"))
}

/// Appends audit entries inside the caller's transaction scope. Assigns a
/// fresh id and, when the event was not pre-stamped, a timestamp that never
/// moves backwards for this writer.
pub struct AuditRecorder {
    last_timestamp: Mutex<DateTime<Utc>>,
}

impl AuditRecorder {
    pub fn new() -> Self {
        Self {
            last_timestamp: Mutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    pub fn record(
        &self,
        session: &mut dyn StoreSession,
        event: AuditEvent,
    ) -> Result<AuditLogId, StoreError> {
        let entry = self.entry_from(event)?;
        let id = entry.id.clone();
        session.append_audit(entry)?;
        Ok(id)
    }

    fn entry_from(&self, event: AuditEvent) -> Result<AuditLogEntry, StoreError> {
        let timestamp = match event.timestamp {
            Some(stamped) => stamped,
            None => self.next_timestamp()?,
        };

        Ok(AuditLogEntry {
            id: next_log_id(),
            timestamp,
            action: event.action,
            username: event.username,
            applicant_name: event.applicant_name,
            applicant_position: event.applicant_position,
            application_id: event.application_id,
            source_address: event.source_address,
            details: event.details,
        })
    }

    fn next_timestamp(&self) -> Result<DateTime<Utc>, StoreError> {
        let mut last = self
            .last_timestamp
            .lock()
            .map_err(|_| StoreError::Unavailable("recorder clock mutex poisoned".to_string()))?;
        let now = Utc::now().max(*last);
        *last = now;
        Ok(now)
    }
}

impl Default for AuditRecorder {
    fn default() -> Self {
        Self::new()
    }
}
