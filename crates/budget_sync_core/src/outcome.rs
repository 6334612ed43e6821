use crate::error::SyncError;
use crate::extract::SkipReason;

/// Final state of one change event after the handler is done with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Written {
        event_id: Option<String>,
        account_id: String,
        budget_value: String,
    },
    Skipped {
        event_id: Option<String>,
        reason: SkipReason,
    },
    Failed {
        event_id: Option<String>,
        account_id: Option<String>,
        error: SyncError,
    },
}

impl EventOutcome {
    pub fn event_id(&self) -> Option<&str> {
        match self {
            Self::Written { event_id, .. }
            | Self::Skipped { event_id, .. }
            | Self::Failed { event_id, .. } => event_id.as_deref(),
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Outcomes of one invocation, in delivery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    outcomes: Vec<EventOutcome>,
}

impl BatchReport {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, outcome: EventOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[EventOutcome] {
        &self.outcomes
    }

    pub fn summary(&self) -> BatchSummary {
        self.outcomes
            .iter()
            .fold(BatchSummary::default(), |mut summary, outcome| {
                summary.total += 1;
                match outcome {
                    EventOutcome::Written { .. } => summary.written += 1,
                    EventOutcome::Skipped { .. } => summary.skipped += 1,
                    EventOutcome::Failed { .. } => summary.failed += 1,
                }
                summary
            })
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(EventOutcome::is_failed)
    }

    /// Accounts whose parameter was not updated because of a failure. Failures
    /// that happened before an account id was known are not listed.
    pub fn failed_accounts(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                EventOutcome::Failed {
                    account_id: Some(account_id),
                    ..
                } => Some(account_id.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl FromIterator<EventOutcome> for BatchReport {
    fn from_iter<T: IntoIterator<Item = EventOutcome>>(iter: T) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;

    fn sample_report() -> BatchReport {
        [
            EventOutcome::Written {
                event_id: Some("evt-1".to_string()),
                account_id: "111122223333".to_string(),
                budget_value: "500".to_string(),
            },
            EventOutcome::Skipped {
                event_id: Some("evt-2".to_string()),
                reason: SkipReason::UnsupportedEventKind("REMOVE".to_string()),
            },
            EventOutcome::Failed {
                event_id: Some("evt-3".to_string()),
                account_id: Some("444455556666".to_string()),
                error: SyncError::from(ExtractError::NonNumericBudgetValue("x".to_string())),
            },
            EventOutcome::Failed {
                event_id: None,
                account_id: None,
                error: SyncError::from(ExtractError::MissingAccountId),
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn summary_counts_each_outcome_kind() {
        let summary = sample_report().summary();
        assert_eq!(
            summary,
            BatchSummary {
                total: 4,
                written: 1,
                skipped: 1,
                failed: 2,
            }
        );
    }

    #[test]
    fn failed_accounts_lists_only_known_accounts() {
        let report = sample_report();
        assert!(report.has_failures());
        assert_eq!(report.failed_accounts(), vec!["444455556666"]);
    }

    #[test]
    fn preserves_delivery_order() {
        let report = sample_report();
        let ids: Vec<Option<&str>> = report.outcomes().iter().map(EventOutcome::event_id).collect();
        assert_eq!(ids, vec![Some("evt-1"), Some("evt-2"), Some("evt-3"), None]);
    }

    #[test]
    fn empty_report_has_no_failures() {
        let report = BatchReport::default();
        assert!(!report.has_failures());
        assert_eq!(report.summary().total, 0);
    }
}
