use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::lifecycle::audit::AuditLogEntry;
use crate::lifecycle::domain::{
    AggregateStatistics, ApplicationId, ApplicationStatus, ApplicationWindow, PositionQuestions,
    StaffApplication, SubmitApplication,
};
use crate::lifecycle::memory::MemoryStore;
use crate::lifecycle::router::application_router;
use crate::lifecycle::service::LifecycleEngine;
use crate::lifecycle::store::{RecordStore, StoreError, StoreReader, StoreSession};

pub(super) fn submission() -> SubmitApplication {
    SubmitApplication {
        id: None,
        name: "Avery Stone".to_string(),
        email: "avery@example.com".to_string(),
        contact_handle: "avery#0001".to_string(),
        position: "Builder".to_string(),
        experience: "Three years of large terrain and interior builds".to_string(),
        playtime_availability: "Weekday evenings, most weekends".to_string(),
        message: Some("Portfolio links available on request".to_string()),
        answers: vec![
            "https://imgur.com/gallery/builds".to_string(),
            "Medieval and organic styles".to_string(),
            "Split the project into zones and sync daily".to_string(),
            "Yes, WorldEdit and VoxelSniper".to_string(),
        ],
        source_address: Some("203.0.113.7".to_string()),
    }
}

pub(super) fn moderator_submission() -> SubmitApplication {
    SubmitApplication {
        name: "Kai Rivers".to_string(),
        email: "kai@example.com".to_string(),
        contact_handle: "kai#2042".to_string(),
        position: "Moderator".to_string(),
        experience: "Moderated a 2k-member community for a year".to_string(),
        playtime_availability: "Daily, two to four hours".to_string(),
        message: None,
        answers: Vec::new(),
        source_address: None,
        ..submission()
    }
}

pub(super) fn application_record(id: &str) -> StaffApplication {
    StaffApplication {
        id: ApplicationId(id.to_string()),
        name: "Avery Stone".to_string(),
        email: "avery@example.com".to_string(),
        contact_handle: "avery#0001".to_string(),
        position: "Builder".to_string(),
        experience: "Three years of large terrain and interior builds".to_string(),
        playtime_availability: "Weekday evenings, most weekends".to_string(),
        message: None,
        answers: Vec::new(),
        status: ApplicationStatus::UnderReview,
        submitted_at: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"),
        source_address: "203.0.113.7".to_string(),
    }
}

pub(super) fn seed_statistics(store: &MemoryStore) {
    store
        .with_transaction(|tx| -> Result<(), StoreError> {
            tx.put_statistics(AggregateStatistics::default())
        })
        .expect("statistics row seeds");
}

/// Engine over a memory store with the statistics row seeded.
pub(super) fn build_engine() -> (LifecycleEngine<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    seed_statistics(&store);
    (LifecycleEngine::new(store.clone()), store)
}

/// Engine over a memory store with no statistics row at all.
pub(super) fn unseeded_engine() -> (LifecycleEngine<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (LifecycleEngine::new(store.clone()), store)
}

pub(super) fn stored_statistics(store: &MemoryStore) -> AggregateStatistics {
    store
        .read(|reader| -> Result<_, StoreError> { reader.statistics() })
        .expect("statistics read")
        .unwrap_or_default()
}

pub(super) fn stored_applications(store: &MemoryStore) -> Vec<StaffApplication> {
    store
        .read(|reader| -> Result<_, StoreError> { reader.applications() })
        .expect("applications read")
}

pub(super) fn stored_audit_log(store: &MemoryStore) -> Vec<AuditLogEntry> {
    store
        .read(|reader| -> Result<_, StoreError> { reader.audit_log() })
        .expect("audit log read")
}

pub(super) fn router_with_engine(
    engine: LifecycleEngine<MemoryStore>,
) -> axum::Router {
    application_router(Arc::new(engine))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose sessions fail at a chosen write, for exercising rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FailurePoint {
    InsertApplication,
    PutStatistics,
    AppendAudit,
}

pub(super) struct FlakyStore {
    pub(super) inner: MemoryStore,
    fail_on: FailurePoint,
}

impl FlakyStore {
    pub(super) fn failing_at(fail_on: FailurePoint) -> Self {
        let inner = MemoryStore::new();
        seed_statistics(&inner);
        Self { inner, fail_on }
    }
}

impl RecordStore for FlakyStore {
    fn with_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn StoreSession) -> Result<T, E>,
    {
        let fail_on = self.fail_on;
        self.inner.with_transaction(|tx| {
            let mut session = FlakySession { inner: tx, fail_on };
            work(&mut session)
        })
    }

    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&dyn StoreReader) -> Result<T, E>,
    {
        self.inner.read(work)
    }
}

struct FlakySession<'a> {
    inner: &'a mut dyn StoreSession,
    fail_on: FailurePoint,
}

impl FlakySession<'_> {
    fn injected(&self) -> StoreError {
        StoreError::Unavailable("injected failure".to_string())
    }
}

impl StoreReader for FlakySession<'_> {
    fn application(&self, id: &ApplicationId) -> Result<Option<StaffApplication>, StoreError> {
        self.inner.application(id)
    }

    fn applications(&self) -> Result<Vec<StaffApplication>, StoreError> {
        self.inner.applications()
    }

    fn applications_by_email(&self, email: &str) -> Result<Vec<StaffApplication>, StoreError> {
        self.inner.applications_by_email(email)
    }

    fn statistics(&self) -> Result<Option<AggregateStatistics>, StoreError> {
        self.inner.statistics()
    }

    fn audit_log(&self) -> Result<Vec<AuditLogEntry>, StoreError> {
        self.inner.audit_log()
    }

    fn position_questions(&self) -> Result<PositionQuestions, StoreError> {
        self.inner.position_questions()
    }

    fn application_window(&self) -> Result<Option<ApplicationWindow>, StoreError> {
        self.inner.application_window()
    }
}

impl StoreSession for FlakySession<'_> {
    fn insert_application(&mut self, application: StaffApplication) -> Result<(), StoreError> {
        if self.fail_on == FailurePoint::InsertApplication {
            return Err(self.injected());
        }
        self.inner.insert_application(application)
    }

    fn set_status(
        &mut self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), StoreError> {
        self.inner.set_status(id, status)
    }

    fn put_statistics(&mut self, statistics: AggregateStatistics) -> Result<(), StoreError> {
        if self.fail_on == FailurePoint::PutStatistics {
            return Err(self.injected());
        }
        self.inner.put_statistics(statistics)
    }

    fn append_audit(&mut self, entry: AuditLogEntry) -> Result<(), StoreError> {
        if self.fail_on == FailurePoint::AppendAudit {
            return Err(self.injected());
        }
        self.inner.append_audit(entry)
    }

    fn replace_position_questions(
        &mut self,
        questions: PositionQuestions,
    ) -> Result<(), StoreError> {
        self.inner.replace_position_questions(questions)
    }

    fn put_application_window(&mut self, window: ApplicationWindow) -> Result<(), StoreError> {
        self.inner.put_application_window(window)
    }
}

/// Store that refuses every session, as when the backing service is down.
pub(super) struct UnavailableStore;

impl RecordStore for UnavailableStore {
    fn with_transaction<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn StoreSession) -> Result<T, E>,
    {
        Err(E::from(StoreError::Unavailable(
            "store offline".to_string(),
        )))
    }

    fn read<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&dyn StoreReader) -> Result<T, E>,
    {
        Err(E::from(StoreError::Unavailable(
            "store offline".to_string(),
        )))
    }
}
