use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};

use super::audit::{AuditAction, AuditEvent, AuditLogEntry, AuditLogId, AuditRecorder};
use super::domain::{
    AggregateStatistics, ApplicationId, ApplicationStatus, ApplicationSummary, ApplicationWindow,
    ChangeStatus, PositionQuestions, StaffApplication, SubmitApplication,
};
use super::stats::{apply_delta, StatisticsDelta};
use super::store::{RecordStore, StoreError, StoreSession};

/// Error raised by the lifecycle engine. Storage details stay behind the
/// source chain; the display form is deliberately opaque.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("required field missing: {field}")]
    Validation { field: &'static str },
    #[error("application not found")]
    NotFound,
    #[error("storage failure")]
    Storage(#[from] StoreError),
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Orchestrates the application lifecycle: every mutating use case runs as
/// one transaction covering the record write, the statistics adjustment, and
/// the audit entry, so the aggregate row can never drift from the records it
/// summarizes.
pub struct LifecycleEngine<S> {
    store: Arc<S>,
    recorder: AuditRecorder,
}

impl<S> LifecycleEngine<S>
where
    S: RecordStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            recorder: AuditRecorder::new(),
        }
    }

    /// Record a new application, returning its assigned id.
    pub fn submit(&self, command: SubmitApplication) -> Result<ApplicationId, LifecycleError> {
        validate_submission(&command)?;

        let id = command.id.clone().unwrap_or_else(next_application_id);
        let application = StaffApplication {
            id: id.clone(),
            name: command.name,
            email: command.email,
            contact_handle: command.contact_handle,
            position: command.position,
            experience: command.experience,
            playtime_availability: command.playtime_availability,
            message: command.message,
            answers: command.answers,
            status: ApplicationStatus::UnderReview,
            submitted_at: Local::now().date_naive(),
            source_address: command
                .source_address
                .unwrap_or_else(|| "Unknown".to_string()),
        };

        self.store.with_transaction(|tx| -> Result<(), LifecycleError> {
            tx.insert_application(application.clone())?;
            self.apply_statistics(tx, &StatisticsDelta::submission(&application.position))?;
            self.recorder.record(
                tx,
                AuditEvent {
                    action: AuditAction::ApplicationSubmitted,
                    username: None,
                    applicant_name: Some(application.name.clone()),
                    applicant_position: Some(application.position.clone()),
                    application_id: Some(application.id.clone()),
                    source_address: Some(application.source_address.clone()),
                    details: format!(
                        "New application submitted for {} position",
                        application.position
                    ),
                    timestamp: None,
                },
            )?;
            Ok(())
        })?;

        info!(id = %id.0, "application submitted");
        Ok(id)
    }

    /// Move an application to a new review status. A transition to the
    /// status the application already holds leaves the counters alone but is
    /// still audited.
    pub fn change_status(
        &self,
        id: &ApplicationId,
        command: ChangeStatus,
    ) -> Result<(), LifecycleError> {
        let new_status = command.status;
        let actor = command
            .actor_username
            .unwrap_or_else(|| "admin".to_string());

        let old_status = self
            .store
            .with_transaction(|tx| -> Result<ApplicationStatus, LifecycleError> {
                let application = tx.application(id)?.ok_or(LifecycleError::NotFound)?;
                let old_status = application.status;

                tx.set_status(id, new_status)?;
                self.apply_statistics(
                    tx,
                    &StatisticsDelta::status_change(old_status, new_status),
                )?;
                self.recorder.record(
                    tx,
                    AuditEvent {
                        action: AuditAction::StatusChanged,
                        username: Some(actor.clone()),
                        applicant_name: Some(application.name.clone()),
                        applicant_position: Some(application.position.clone()),
                        application_id: Some(application.id.clone()),
                        source_address: None,
                        details: format!(
                            "Status changed from {} to {}",
                            old_status.label(),
                            new_status.label()
                        ),
                        timestamp: None,
                    },
                )?;
                Ok(old_status)
            })?;

        info!(
            id = %id.0,
            from = old_status.label(),
            to = new_status.label(),
            "application status changed"
        );
        Ok(())
    }

    /// Append an audit entry for an event that originated outside the
    /// lifecycle engine.
    pub fn record_event(&self, event: AuditEvent) -> Result<AuditLogId, LifecycleError> {
        self.store
            .with_transaction(|tx| -> Result<AuditLogId, LifecycleError> {
                Ok(self.recorder.record(tx, event)?)
            })
    }

    fn apply_statistics(
        &self,
        tx: &mut dyn StoreSession,
        delta: &StatisticsDelta,
    ) -> Result<(), LifecycleError> {
        if delta.is_empty() {
            return Ok(());
        }

        match tx.statistics()? {
            Some(current) => tx.put_statistics(apply_delta(current, delta))?,
            None => warn!("aggregate statistics row missing; skipping counter update"),
        }
        Ok(())
    }

    /// Summary listing of every application.
    pub fn applications(&self) -> Result<Vec<ApplicationSummary>, LifecycleError> {
        self.store
            .read(|reader| -> Result<Vec<ApplicationSummary>, LifecycleError> {
                let applications = reader.applications()?;
                Ok(applications
                    .iter()
                    .map(StaffApplication::summary)
                    .collect())
            })
    }

    /// Full detail for one application.
    pub fn application(&self, id: &ApplicationId) -> Result<StaffApplication, LifecycleError> {
        self.store
            .read(|reader| -> Result<StaffApplication, LifecycleError> {
                reader.application(id)?.ok_or(LifecycleError::NotFound)
            })
    }

    /// Summaries of the applications submitted under the given email, with
    /// the network origin withheld.
    pub fn applications_by_email(
        &self,
        email: &str,
    ) -> Result<Vec<ApplicationSummary>, LifecycleError> {
        self.store
            .read(|reader| -> Result<Vec<ApplicationSummary>, LifecycleError> {
                let applications = reader.applications_by_email(email)?;
                Ok(applications
                    .iter()
                    .map(StaffApplication::public_summary)
                    .collect())
            })
    }

    /// Current aggregate row, zeroed when the store was never seeded.
    pub fn statistics(&self) -> Result<AggregateStatistics, LifecycleError> {
        self.store
            .read(|reader| -> Result<AggregateStatistics, LifecycleError> {
                Ok(reader.statistics()?.unwrap_or_default())
            })
    }

    /// Audit trail, newest first.
    pub fn audit_log(&self) -> Result<Vec<AuditLogEntry>, LifecycleError> {
        self.store
            .read(|reader| -> Result<Vec<AuditLogEntry>, LifecycleError> {
                Ok(reader.audit_log()?)
            })
    }

    pub fn position_questions(&self) -> Result<PositionQuestions, LifecycleError> {
        self.store
            .read(|reader| -> Result<PositionQuestions, LifecycleError> {
                Ok(reader.position_questions()?)
            })
    }

    /// Replace every question set in one transaction.
    pub fn replace_position_questions(
        &self,
        questions: PositionQuestions,
    ) -> Result<(), LifecycleError> {
        self.store
            .with_transaction(|tx| -> Result<(), LifecycleError> {
                tx.replace_position_questions(questions)?;
                Ok(())
            })
    }

    /// Open-applications window, closed and empty when never configured.
    pub fn application_window(&self) -> Result<ApplicationWindow, LifecycleError> {
        self.store
            .read(|reader| -> Result<ApplicationWindow, LifecycleError> {
                Ok(reader.application_window()?.unwrap_or_default())
            })
    }

    pub fn update_application_window(
        &self,
        window: ApplicationWindow,
    ) -> Result<(), LifecycleError> {
        self.store
            .with_transaction(|tx| -> Result<(), LifecycleError> {
                tx.put_application_window(window)?;
                Ok(())
            })
    }
}

fn validate_submission(command: &SubmitApplication) -> Result<(), LifecycleError> {
    let required = [
        ("name", &command.name),
        ("email", &command.email),
        ("contactHandle", &command.contact_handle),
        ("position", &command.position),
        ("experience", &command.experience),
        ("playtimeAvailability", &command.playtime_availability),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(LifecycleError::Validation { field });
        }
    }

    Ok(())
}
