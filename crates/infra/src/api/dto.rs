//! Wire shapes of the payroll REST backend
//!
//! The backend is looser than the domain: decimals may arrive as strings,
//! dates as full timestamps, and `zenegy_sync_status` sometimes carries
//! values that are not sync states at all. These DTOs absorb that and
//! convert into domain types.

use chrono::{DateTime, NaiveDate, Utc};
use cranepay_domain::types::serde_helpers::flexible_date;
use cranepay_domain::{
    BatchId, BatchNumber, BulkOperationResult, FailureReason, PayrollBatch, PayrollBatchStatus,
    PayrollError, RawWorkEntry, Result, UserId, WorkEntryAction, WorkEntryId, ZenegySyncStatus,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Error payload: `{ error, message?, details? }`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.trim().is_empty())
    }
}

/// Maps the backend's sync column onto a sync state; `None` when the value
/// is not one.
pub(crate) fn parse_sync_status(raw: &str) -> Option<ZenegySyncStatus> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "not_started" | "pending" | "skipped" => Some(ZenegySyncStatus::NotStarted),
        "syncing" | "sent" | "in_progress" => Some(ZenegySyncStatus::Syncing),
        "completed" | "success" => Some(ZenegySyncStatus::Completed),
        "failed" | "error" => Some(ZenegySyncStatus::Failed),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BatchDto {
    id: BatchId,
    batch_number: String,
    #[serde(with = "flexible_date")]
    period_start: NaiveDate,
    #[serde(with = "flexible_date")]
    period_end: NaiveDate,
    year: i32,
    period_number: u32,
    #[serde(default)]
    total_employees: u32,
    #[serde(default)]
    total_hours: Decimal,
    #[serde(default)]
    total_amount: Decimal,
    status: PayrollBatchStatus,
    created_by: UserId,
    created_at: DateTime<Utc>,
    #[serde(default)]
    approved_by: Option<UserId>,
    #[serde(default)]
    approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    sent_to_zenegy_at: Option<DateTime<Utc>>,
    #[serde(default)]
    zenegy_sync_status: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<BatchDto> for PayrollBatch {
    type Error = PayrollError;

    fn try_from(dto: BatchDto) -> Result<Self> {
        let batch_number = BatchNumber::parse(&dto.batch_number).map_err(|_| {
            PayrollError::InvalidResponse(format!(
                "batch {} has malformed batch number '{}'",
                dto.id, dto.batch_number
            ))
        })?;

        let zenegy_sync_status = dto.zenegy_sync_status.as_deref().and_then(|raw| {
            let parsed = parse_sync_status(raw);
            if parsed.is_none() {
                warn!(batch_id = dto.id, value = raw, "Ignoring unrecognised zenegy_sync_status");
            }
            parsed
        });

        Ok(Self {
            id: dto.id,
            batch_number,
            period_start: dto.period_start,
            period_end: dto.period_end,
            year: dto.year,
            period_number: dto.period_number,
            total_employees: dto.total_employees,
            total_hours: dto.total_hours,
            total_amount: dto.total_amount,
            status: dto.status,
            created_by: dto.created_by,
            created_at: dto.created_at,
            approved_by: dto.approved_by,
            approved_at: dto.approved_at,
            sent_to_zenegy_at: dto.sent_to_zenegy_at,
            zenegy_sync_status,
            notes: dto.notes,
        })
    }
}

/// Body of `POST /batches/{id}/approve`
#[derive(Debug, Serialize)]
pub(crate) struct ApproveRequest<'a> {
    pub approved_by: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<&'a str>,
}

/// Body of `POST /zenegy/sync-batch`
#[derive(Debug, Serialize)]
pub(crate) struct SyncBatchRequest {
    pub batch_id: BatchId,
}

/// Provider status poll. Older deployments name the field `status`.
#[derive(Debug, Deserialize)]
pub(crate) struct ZenegyStatusDto {
    #[serde(default, alias = "status")]
    zenegy_sync_status: Option<String>,
}

impl ZenegyStatusDto {
    /// Missing or unrecognised values count as still syncing.
    pub(crate) fn into_status(self) -> ZenegySyncStatus {
        self.zenegy_sync_status
            .as_deref()
            .and_then(parse_sync_status)
            .unwrap_or(ZenegySyncStatus::Syncing)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfirmedEntriesPage {
    #[serde(default)]
    pub data: Vec<ConfirmedEntryDto>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Pagination {
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfirmedEntryDto {
    entry_id: WorkEntryId,
    #[serde(with = "flexible_date")]
    work_date: NaiveDate,
    #[serde(default)]
    start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pause_minutes: Option<i64>,
    #[serde(default)]
    employee: Option<EmployeeRef>,
    #[serde(default)]
    task: Option<TaskRef>,
}

#[derive(Debug, Deserialize)]
struct EmployeeRef {
    employee_id: i64,
}

#[derive(Debug, Deserialize)]
struct TaskRef {
    task_id: i64,
    #[serde(default)]
    project: Option<ProjectRef>,
}

#[derive(Debug, Deserialize)]
struct ProjectRef {
    project_id: i64,
}

impl ConfirmedEntryDto {
    pub(crate) fn entry_id(&self) -> WorkEntryId {
        self.entry_id
    }

    /// `None` when the entry is not attached to an employee or a task.
    pub(crate) fn into_raw(self) -> Option<RawWorkEntry> {
        let employee_id = self.employee?.employee_id;
        let task = self.task?;
        Some(RawWorkEntry {
            id: self.entry_id,
            employee_id,
            project_id: task.project.map(|p| p.project_id).unwrap_or_default(),
            task_id: task.task_id,
            date: self.work_date,
            clock_in: self.start_time,
            clock_out: self.end_time,
            pause_minutes: self.pause_minutes,
            supervisor_confirmation: None,
        })
    }
}

/// Body of `PATCH /work-entries/confirmed`
#[derive(Debug, Serialize)]
pub(crate) struct BulkActionRequest<'a> {
    pub entry_ids: &'a [WorkEntryId],
    pub action: WorkEntryAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<&'a str>,
}

/// Response to a bulk action, 200 or 207
#[derive(Debug, Deserialize)]
pub(crate) struct BulkActionResponse {
    #[serde(default)]
    successful: Vec<WorkEntryId>,
    #[serde(default)]
    failed: Vec<BulkFailureDto>,
}

#[derive(Debug, Deserialize)]
struct BulkFailureDto {
    id: WorkEntryId,
    #[serde(default)]
    error: Option<String>,
}

impl BulkActionResponse {
    /// Convert to a per-id result. Ids the backend reported in both lists
    /// count as failed.
    pub(crate) fn into_result(self) -> BulkOperationResult {
        let failed: Vec<(WorkEntryId, std::result::Result<(), FailureReason>)> = self
            .failed
            .into_iter()
            .map(|f| {
                let message = f.error.unwrap_or_else(|| "Entry was not updated".to_string());
                (f.id, Err(FailureReason::Server(message)))
            })
            .collect();

        let successful = self
            .successful
            .into_iter()
            .filter(|id| !failed.iter().any(|(failed_id, _)| failed_id == id))
            .map(|id| (id, Ok(())))
            .collect::<Vec<_>>();

        BulkOperationResult::from_outcomes(successful.into_iter().chain(failed).collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn batch_json(sync: serde_json::Value) -> serde_json::Value {
        json!({
            "id": 12,
            "batch_number": "2024-07",
            "period_start": "2024-04-01T00:00:00.000Z",
            "period_end": "2024-04-14",
            "year": 2024,
            "period_number": 7,
            "total_employees": 2,
            "total_hours": "120.00",
            "total_amount": 54000,
            "status": "sent_to_zenegy",
            "created_by": 3,
            "created_at": "2024-04-15T08:00:00Z",
            "zenegy_sync_status": sync
        })
    }

    #[test]
    fn test_batch_dto_accepts_loose_wire_values() {
        let dto: BatchDto = serde_json::from_value(batch_json(json!("pending"))).unwrap();
        let batch = PayrollBatch::try_from(dto).unwrap();
        assert_eq!(batch.period_start, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(batch.total_hours, dec!(120));
        assert_eq!(batch.total_amount, dec!(54000));
        assert_eq!(batch.zenegy_sync_status, Some(ZenegySyncStatus::NotStarted));
    }

    #[test]
    fn test_unknown_sync_status_is_dropped() {
        let dto: BatchDto = serde_json::from_value(batch_json(json!("approved"))).unwrap();
        assert_eq!(PayrollBatch::try_from(dto).unwrap().zenegy_sync_status, None);

        let dto: BatchDto = serde_json::from_value(batch_json(json!("sent"))).unwrap();
        assert_eq!(PayrollBatch::try_from(dto).unwrap().zenegy_sync_status, Some(ZenegySyncStatus::Syncing));
    }

    #[test]
    fn test_malformed_batch_number_is_invalid_response() {
        let mut value = batch_json(serde_json::Value::Null);
        value["batch_number"] = json!("BATCH-7");
        let dto: BatchDto = serde_json::from_value(value).unwrap();
        assert!(matches!(PayrollBatch::try_from(dto), Err(PayrollError::InvalidResponse(_))));
    }

    #[test]
    fn test_confirmed_entry_without_employee_is_skipped() {
        let page: ConfirmedEntriesPage = serde_json::from_value(json!({
            "success": true,
            "data": [
                {
                    "entry_id": 1,
                    "work_date": "2024-04-02T00:00:00.000Z",
                    "start_time": "2024-04-02T07:00:00.000Z",
                    "end_time": "2024-04-02T15:30:00.000Z",
                    "pause_minutes": 30,
                    "employee": { "employee_id": 5, "name": "Lars" },
                    "task": { "task_id": 9, "title": "Lift", "project": { "project_id": 4 } }
                },
                {
                    "entry_id": 2,
                    "work_date": "2024-04-02",
                    "employee": null,
                    "task": { "task_id": 9, "project": null }
                }
            ],
            "pagination": { "limit": 50, "offset": 0, "total": 2, "has_more": false }
        }))
        .unwrap();

        let mut entries = page.data.into_iter();
        let first = entries.next().unwrap().into_raw().unwrap();
        assert_eq!((first.employee_id, first.project_id, first.task_id), (5, 4, 9));
        assert_eq!(first.worked_hours(), dec!(8));
        assert!(entries.next().unwrap().into_raw().is_none());
        assert!(!page.pagination.unwrap().has_more);
    }

    #[test]
    fn test_bulk_response_conversion() {
        let response: BulkActionResponse = serde_json::from_value(json!({
            "success": false,
            "successful": [3, 1],
            "failed": [{ "id": 2, "error": "Entry already rejected" }]
        }))
        .unwrap();
        let result = response.into_result();
        assert_eq!(result.successful, vec![1, 3]);
        assert_eq!(result.reason_for(2), Some(&FailureReason::Server("Entry already rejected".into())));
        assert_eq!(result.total_requested, 3);
    }

    #[test]
    fn test_status_poll_defaults_to_syncing() {
        let dto: ZenegyStatusDto = serde_json::from_value(json!({ "status": "completed" })).unwrap();
        assert_eq!(dto.into_status(), ZenegySyncStatus::Completed);
        let dto: ZenegyStatusDto = serde_json::from_value(json!({})).unwrap();
        assert_eq!(dto.into_status(), ZenegySyncStatus::Syncing);
    }

    #[test]
    fn test_error_body_prefers_message() {
        let body: ErrorBody = serde_json::from_value(json!({ "error": "Bad", "message": "Detailed" })).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Detailed"));
        let body: ErrorBody = serde_json::from_value(json!({ "error": "  " })).unwrap();
        assert_eq!(body.into_message(), None);
    }
}
