use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Review state of a staff application. Every application starts under
/// review; all three states remain mutually reachable so a decision can be
/// reversed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "Under Review")]
    UnderReview,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::UnderReview => "Under Review",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

/// A persisted staff application. `status` is only ever changed through the
/// lifecycle engine; `submitted_at` and `source_address` are set once at
/// intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffApplication {
    pub id: ApplicationId,
    pub name: String,
    pub email: String,
    pub contact_handle: String,
    pub position: String,
    pub experience: String,
    pub playtime_availability: String,
    pub message: Option<String>,
    /// Free-text answers, positionally aligned with the position's question
    /// set as it stood at submission time.
    pub answers: Vec<String>,
    pub status: ApplicationStatus,
    pub submitted_at: NaiveDate,
    pub source_address: String,
}

impl StaffApplication {
    /// Listing projection used by administrative views.
    pub fn summary(&self) -> ApplicationSummary {
        ApplicationSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            position: self.position.clone(),
            status: self.status,
            submitted_at: self.submitted_at,
            source_address: Some(self.source_address.clone()),
        }
    }

    /// Listing projection for applicant-facing lookups, with the network
    /// origin withheld.
    pub fn public_summary(&self) -> ApplicationSummary {
        ApplicationSummary {
            source_address: None,
            ..self.summary()
        }
    }
}

/// Summary fields exposed by the listing queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub name: String,
    pub email: String,
    pub position: String,
    pub status: ApplicationStatus,
    pub submitted_at: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_address: Option<String>,
}

/// Intake command for a new application. The id is normally absent and
/// assigned by the engine; transport fills `source_address` best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ApplicationId>,
    pub name: String,
    pub email: String,
    pub contact_handle: String,
    pub position: String,
    pub experience: String,
    pub playtime_availability: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub source_address: Option<String>,
}

/// Review command moving an application to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatus {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub actor_username: Option<String>,
}

/// The denormalized singleton row summarizing applications by status and by
/// requested position. Counters are signed: transitions are never clamped,
/// so replaying them out of order can transiently dip below zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStatistics {
    pub total_applications: i64,
    pub accepted: i64,
    pub rejected: i64,
    pub under_review: i64,
    pub by_position: BTreeMap<String, i64>,
}

impl AggregateStatistics {
    /// Counter tracking the given status. Exhaustive over the closed status
    /// set so a new status cannot silently bypass the aggregate.
    pub fn counter(&self, status: ApplicationStatus) -> i64 {
        match status {
            ApplicationStatus::UnderReview => self.under_review,
            ApplicationStatus::Accepted => self.accepted,
            ApplicationStatus::Rejected => self.rejected,
        }
    }

    pub(crate) fn counter_mut(&mut self, status: ApplicationStatus) -> &mut i64 {
        match status {
            ApplicationStatus::UnderReview => &mut self.under_review,
            ApplicationStatus::Accepted => &mut self.accepted,
            ApplicationStatus::Rejected => &mut self.rejected,
        }
    }

    /// True when the cross-entity invariant holds: the total equals the sum
    /// of the per-status counters and the sum of the per-position counts.
    pub fn is_balanced(&self) -> bool {
        let by_status = self.accepted + self.rejected + self.under_review;
        let by_position: i64 = self.by_position.values().sum();
        self.total_applications == by_status && self.total_applications == by_position
    }
}

/// Ordered question sets keyed by position name. Replaced wholesale by
/// administrative action, never touched by the lifecycle engine.
pub type PositionQuestions = BTreeMap<String, Vec<String>>;

/// Open/closed state of the intake window, owned by the configuration
/// collaborator and consumed read-only by the intake surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWindow {
    pub is_open: bool,
    pub open_positions: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
