use super::domain::{AggregateStatistics, ApplicationStatus};

/// Signed adjustment implied by one lifecycle event. A submission bumps the
/// total, one status counter, and one position count; a status transition
/// shifts a single unit between two status counters and leaves the total and
/// positions alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticsDelta {
    pub total: i64,
    pub statuses: Vec<(ApplicationStatus, i64)>,
    pub position: Option<(String, i64)>,
}

impl StatisticsDelta {
    /// Delta for a freshly submitted application requesting `position`.
    pub fn submission(position: &str) -> Self {
        Self {
            total: 1,
            statuses: vec![(ApplicationStatus::UnderReview, 1)],
            position: Some((position.to_string(), 1)),
        }
    }

    /// Delta for a review moving an application from `old` to `new`. A
    /// same-status transition yields an empty delta: the counters must not
    /// be double-adjusted even though the event itself is still audited.
    pub fn status_change(old: ApplicationStatus, new: ApplicationStatus) -> Self {
        if old == new {
            return Self::default();
        }

        Self {
            total: 0,
            statuses: vec![(old, -1), (new, 1)],
            position: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0 && self.statuses.is_empty() && self.position.is_none()
    }
}

/// Apply `delta` to the current aggregate row, returning the row to persist.
/// Pure: callers are responsible for reading and writing the row inside the
/// same transaction as the event that produced the delta.
pub fn apply_delta(current: AggregateStatistics, delta: &StatisticsDelta) -> AggregateStatistics {
    let mut next = current;
    next.total_applications += delta.total;

    for (status, adjustment) in &delta.statuses {
        *next.counter_mut(*status) += adjustment;
    }

    if let Some((position, adjustment)) = &delta.position {
        *next.by_position.entry(position.clone()).or_insert(0) += adjustment;
    }

    next
}
