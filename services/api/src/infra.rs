use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use staff_intake::lifecycle::{
    AggregateStatistics, ApplicationWindow, MemoryStore, PositionQuestions, RecordStore,
    StoreError,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stock reference data: an open window for the four staff positions and
/// their question sets.
pub(crate) fn default_application_window() -> ApplicationWindow {
    ApplicationWindow {
        is_open: true,
        open_positions: vec![
            "Moderator".to_string(),
            "Builder".to_string(),
            "Developer".to_string(),
            "Event Manager".to_string(),
        ],
        start_date: NaiveDate::from_ymd_opt(2023, 11, 1),
        end_date: NaiveDate::from_ymd_opt(2025, 12, 31),
    }
}

pub(crate) fn default_position_questions() -> PositionQuestions {
    let mut questions = PositionQuestions::new();
    questions.insert(
        "Moderator".to_string(),
        vec![
            "Why do you want to be a moderator?".to_string(),
            "How would you handle a situation with two players arguing?".to_string(),
            "Have you had any previous moderator experience on other servers?".to_string(),
            "How many hours a week can you dedicate to moderating?".to_string(),
        ],
    );
    questions.insert(
        "Builder".to_string(),
        vec![
            "Please provide links to screenshots of your previous builds".to_string(),
            "What building styles are you most comfortable with?".to_string(),
            "How would you approach a collaborative build project?".to_string(),
            "Do you have experience with WorldEdit or similar tools?".to_string(),
        ],
    );
    questions.insert(
        "Developer".to_string(),
        vec![
            "What programming languages are you proficient in?".to_string(),
            "Have you developed Minecraft plugins before? If so, please share examples"
                .to_string(),
            "How would you approach optimizing server performance?".to_string(),
            "What IDE do you use for development?".to_string(),
        ],
    );
    questions.insert(
        "Event Manager".to_string(),
        vec![
            "What type of events would you like to organize?".to_string(),
            "How often do you think events should be held?".to_string(),
            "Describe an event you would implement if accepted".to_string(),
            "How would you encourage player participation in events?".to_string(),
        ],
    );
    questions
}

/// Populate an empty store with the default reference data. Collections
/// that already hold data are left alone, so restarts are safe.
pub(crate) fn seed_defaults(store: &MemoryStore) -> Result<(), StoreError> {
    store.with_transaction(|tx| -> Result<(), StoreError> {
        if tx.statistics()?.is_none() {
            tx.put_statistics(AggregateStatistics::default())?;
        }
        if tx.application_window()?.is_none() {
            tx.put_application_window(default_application_window())?;
        }
        if tx.position_questions()?.is_empty() {
            tx.replace_position_questions(default_position_questions())?;
        }
        Ok(())
    })
}
