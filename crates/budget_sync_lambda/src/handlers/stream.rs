use budget_sync_core::error::SyncError;
use budget_sync_core::extract::{plan_record, BudgetUpdate, RecordPlan, SkipReason};
use budget_sync_core::outcome::{BatchReport, EventOutcome};
use budget_sync_core::stream::{batch_records, raw_event_id, raw_event_kind, StreamRecord};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::credentials::CredentialBroker;
use crate::adapters::parameter_store::ParameterStore;
use crate::config::SyncConfig;

pub const ACK_STATUS_CODE: u16 = 200;
pub const ACK_MESSAGE: &str = "Budget values propagated to spoke accounts";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

/// Processes one stream batch and acknowledges it.
///
/// The response is the same fixed acknowledgment whatever happened to the
/// individual events, so the stream never redelivers a batch because of a
/// per-event failure. Failures are visible only through the logged report.
pub async fn handle_stream_event(
    payload: &Value,
    config: &SyncConfig,
    broker: &dyn CredentialBroker,
    store: &dyn ParameterStore,
) -> InvocationResponse {
    let report = process_batch(payload, config, broker, store).await;
    log_report(&report);
    acknowledgment()
}

/// Processes every record of the batch sequentially, in delivery order.
pub async fn process_batch(
    payload: &Value,
    config: &SyncConfig,
    broker: &dyn CredentialBroker,
    store: &dyn ParameterStore,
) -> BatchReport {
    let records = match batch_records(payload) {
        Ok(records) => records,
        Err(error) => {
            tracing::error!(error = %error, "stream payload rejected");
            return BatchReport::default();
        }
    };

    let mut report = BatchReport::with_capacity(records.len());
    for raw_record in records {
        let outcome = process_record(raw_record, config, broker, store).await;
        log_outcome(&outcome);
        report.push(outcome);
    }
    report
}

pub async fn process_record(
    raw_record: &Value,
    config: &SyncConfig,
    broker: &dyn CredentialBroker,
    store: &dyn ParameterStore,
) -> EventOutcome {
    // Kinds that are never propagated are skipped before the rest of the
    // record is decoded.
    let kind = raw_event_kind(raw_record);
    if !kind.is_upsert() {
        return EventOutcome::Skipped {
            event_id: raw_event_id(raw_record),
            reason: SkipReason::for_kind(&kind),
        };
    }

    let record = match StreamRecord::from_value(raw_record) {
        Ok(record) => record,
        Err(error) => {
            return EventOutcome::Failed {
                event_id: raw_event_id(raw_record),
                account_id: None,
                error: error.into(),
            }
        }
    };
    let event_id = record.event_id.clone();

    match plan_record(&record) {
        RecordPlan::Skip(reason) => EventOutcome::Skipped { event_id, reason },
        RecordPlan::Reject { account_id, error } => EventOutcome::Failed {
            event_id,
            account_id,
            error: error.into(),
        },
        RecordPlan::Write(update) => match write_update(&update, config, broker, store).await {
            Ok(()) => EventOutcome::Written {
                event_id,
                account_id: update.account_id,
                budget_value: update.budget_value,
            },
            Err(error) => EventOutcome::Failed {
                event_id,
                account_id: Some(update.account_id),
                error,
            },
        },
    }
}

async fn write_update(
    update: &BudgetUpdate,
    config: &SyncConfig,
    broker: &dyn CredentialBroker,
    store: &dyn ParameterStore,
) -> Result<(), SyncError> {
    let role_arn = config.role_arn(&update.account_id);
    let credentials = broker
        .assume_role(&role_arn, &config.session_name)
        .await
        .map_err(|message| SyncError::AssumeRole {
            role_arn: role_arn.clone(),
            message,
        })?;

    store
        .put_parameter(&credentials, &config.parameter_name, &update.budget_value)
        .await
        .map_err(|message| SyncError::ParameterWrite {
            parameter: config.parameter_name.clone(),
            message,
        })
}

pub fn acknowledgment() -> InvocationResponse {
    InvocationResponse {
        status_code: ACK_STATUS_CODE,
        headers: json!({"Content-Type": "application/json"}),
        body: Value::String(ACK_MESSAGE.to_string()).to_string(),
    }
}

fn log_outcome(outcome: &EventOutcome) {
    match outcome {
        EventOutcome::Written {
            event_id,
            account_id,
            budget_value,
        } => tracing::info!(
            event_id = event_id.as_deref().unwrap_or_default(),
            account_id = %account_id,
            budget_value = %budget_value,
            "budget parameter updated"
        ),
        EventOutcome::Skipped { event_id, reason } => tracing::debug!(
            event_id = event_id.as_deref().unwrap_or_default(),
            reason = %reason,
            "event skipped"
        ),
        EventOutcome::Failed {
            event_id,
            account_id,
            error,
        } => tracing::error!(
            event_id = event_id.as_deref().unwrap_or_default(),
            account_id = account_id.as_deref().unwrap_or("unknown"),
            error_code = error.code(),
            error = %error,
            "failed to propagate budget value"
        ),
    }
}

fn log_report(report: &BatchReport) {
    let summary = report.summary();
    if report.has_failures() {
        tracing::warn!(
            total = summary.total,
            written = summary.written,
            skipped = summary.skipped,
            failed = summary.failed,
            failed_accounts = ?report.failed_accounts(),
            "batch processed with failures"
        );
    } else {
        tracing::info!(
            total = summary.total,
            written = summary.written,
            skipped = summary.skipped,
            failed = summary.failed,
            "batch processed"
        );
    }
}
