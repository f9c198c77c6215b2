use super::audit::AuditLogEntry;
use super::domain::{
    AggregateStatistics, ApplicationId, ApplicationStatus, ApplicationWindow, PositionQuestions,
    StaffApplication,
};

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read operations available both inside a transaction and standalone for
/// single-step queries.
pub trait StoreReader {
    fn application(&self, id: &ApplicationId) -> Result<Option<StaffApplication>, StoreError>;
    fn applications(&self) -> Result<Vec<StaffApplication>, StoreError>;
    fn applications_by_email(&self, email: &str) -> Result<Vec<StaffApplication>, StoreError>;
    fn statistics(&self) -> Result<Option<AggregateStatistics>, StoreError>;
    /// Entries ordered newest first.
    fn audit_log(&self) -> Result<Vec<AuditLogEntry>, StoreError>;
    fn position_questions(&self) -> Result<PositionQuestions, StoreError>;
    fn application_window(&self) -> Result<Option<ApplicationWindow>, StoreError>;
}

/// Keyed write operations, usable only inside an active transaction scope.
pub trait StoreSession: StoreReader {
    /// Inserts a new application; a duplicate id is a `Conflict`.
    fn insert_application(&mut self, application: StaffApplication) -> Result<(), StoreError>;
    fn set_status(
        &mut self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), StoreError>;
    fn put_statistics(&mut self, statistics: AggregateStatistics) -> Result<(), StoreError>;
    fn append_audit(&mut self, entry: AuditLogEntry) -> Result<(), StoreError>;
    fn replace_position_questions(
        &mut self,
        questions: PositionQuestions,
    ) -> Result<(), StoreError>;
    fn put_application_window(&mut self, window: ApplicationWindow) -> Result<(), StoreError>;
}

/// Scoped access to the four persisted collections. Implementations must
/// guarantee that `with_transaction` commits only when `work` returns `Ok`,
/// rolls back every staged write otherwise, and releases the underlying
/// session on both paths. Concurrent transactions must serialize their
/// read-modify-write of the statistics singleton.
pub trait RecordStore: Send + Sync {
    fn with_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn StoreSession) -> Result<T, E>;

    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&dyn StoreReader) -> Result<T, E>;
}
