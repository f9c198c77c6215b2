use std::sync::{Arc, Mutex};

use super::audit::AuditLogEntry;
use super::domain::{
    AggregateStatistics, ApplicationId, ApplicationStatus, ApplicationWindow, PositionQuestions,
    StaffApplication,
};
use super::store::{RecordStore, StoreError, StoreReader, StoreSession};

/// In-memory record store with copy-on-write transactions. A transaction
/// clones the current state, lets the work mutate the clone, and writes it
/// back only on success; the state mutex is held for the whole scope, which
/// serializes concurrent writers of the statistics singleton.
#[derive(Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

#[derive(Default, Clone)]
struct StoreState {
    applications: Vec<StaffApplication>,
    statistics: Option<AggregateStatistics>,
    audit_log: Vec<AuditLogEntry>,
    position_questions: PositionQuestions,
    window: Option<ApplicationWindow>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn with_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn StoreSession) -> Result<T, E>,
    {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;

        let mut session = MemorySession {
            working: guard.clone(),
        };
        // An Err from `work` drops the working copy: nothing is committed.
        let value = work(&mut session)?;
        *guard = session.working;
        Ok(value)
    }

    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&dyn StoreReader) -> Result<T, E>,
    {
        let guard = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        work(&*guard)
    }
}

/// Working copy of the store state staged by an open transaction.
struct MemorySession {
    working: StoreState,
}

impl StoreReader for MemorySession {
    fn application(&self, id: &ApplicationId) -> Result<Option<StaffApplication>, StoreError> {
        self.working.application(id)
    }

    fn applications(&self) -> Result<Vec<StaffApplication>, StoreError> {
        self.working.applications()
    }

    fn applications_by_email(&self, email: &str) -> Result<Vec<StaffApplication>, StoreError> {
        self.working.applications_by_email(email)
    }

    fn statistics(&self) -> Result<Option<AggregateStatistics>, StoreError> {
        self.working.statistics()
    }

    fn audit_log(&self) -> Result<Vec<AuditLogEntry>, StoreError> {
        self.working.audit_log()
    }

    fn position_questions(&self) -> Result<PositionQuestions, StoreError> {
        self.working.position_questions()
    }

    fn application_window(&self) -> Result<Option<ApplicationWindow>, StoreError> {
        self.working.application_window()
    }
}

impl StoreSession for MemorySession {
    fn insert_application(&mut self, application: StaffApplication) -> Result<(), StoreError> {
        if self
            .working
            .applications
            .iter()
            .any(|existing| existing.id == application.id)
        {
            return Err(StoreError::Conflict);
        }
        self.working.applications.push(application);
        Ok(())
    }

    fn set_status(
        &mut self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), StoreError> {
        let application = self
            .working
            .applications
            .iter_mut()
            .find(|application| &application.id == id)
            .ok_or(StoreError::NotFound)?;
        application.status = status;
        Ok(())
    }

    fn put_statistics(&mut self, statistics: AggregateStatistics) -> Result<(), StoreError> {
        self.working.statistics = Some(statistics);
        Ok(())
    }

    fn append_audit(&mut self, entry: AuditLogEntry) -> Result<(), StoreError> {
        self.working.audit_log.push(entry);
        Ok(())
    }

    fn replace_position_questions(
        &mut self,
        questions: PositionQuestions,
    ) -> Result<(), StoreError> {
        self.working.position_questions = questions;
        Ok(())
    }

    fn put_application_window(&mut self, window: ApplicationWindow) -> Result<(), StoreError> {
        self.working.window = Some(window);
        Ok(())
    }
}

impl StoreReader for StoreState {
    fn application(&self, id: &ApplicationId) -> Result<Option<StaffApplication>, StoreError> {
        Ok(self
            .applications
            .iter()
            .find(|application| &application.id == id)
            .cloned())
    }

    fn applications(&self) -> Result<Vec<StaffApplication>, StoreError> {
        Ok(self.applications.clone())
    }

    fn applications_by_email(&self, email: &str) -> Result<Vec<StaffApplication>, StoreError> {
        Ok(self
            .applications
            .iter()
            .filter(|application| application.email == email)
            .cloned()
            .collect())
    }

    fn statistics(&self) -> Result<Option<AggregateStatistics>, StoreError> {
        Ok(self.statistics.clone())
    }

    fn audit_log(&self) -> Result<Vec<AuditLogEntry>, StoreError> {
        // Newest first; insertion order breaks timestamp ties.
        let mut entries: Vec<_> = self.audit_log.iter().rev().cloned().collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    fn position_questions(&self) -> Result<PositionQuestions, StoreError> {
        Ok(self.position_questions.clone())
    }

    fn application_window(&self) -> Result<Option<ApplicationWindow>, StoreError> {
        Ok(self.window.clone())
    }
}
