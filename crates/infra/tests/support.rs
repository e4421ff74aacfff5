//! Shared fixtures for payroll REST adapter tests

use std::sync::Arc;

use cranepay_infra::{ApiClient, ApiClientConfig, PayrollApi, StaticTokenProvider};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TOKEN: &str = "chef-token";
pub const APPROVER_ID: i64 = 42;

/// Adapter pointed at `server`, with retries on reads disabled so request
/// counts stay exact.
pub fn payroll_api(server: &MockServer) -> PayrollApi {
    let config = ApiClientConfig { base_url: server.uri(), read_attempts: 1, ..Default::default() };
    let client = ApiClient::new(config, Arc::new(StaticTokenProvider::new(TOKEN)))
        .expect("api client should build");
    PayrollApi::new(client, APPROVER_ID)
}

/// Batch for period 07/2024 as the backend serialises it
pub fn batch_json(id: i64, status: &str, sync_status: Option<&str>) -> Value {
    json!({
        "id": id,
        "batch_number": "2024-07",
        "period_start": "2024-04-01T00:00:00.000Z",
        "period_end": "2024-04-14T00:00:00.000Z",
        "year": 2024,
        "period_number": 7,
        "total_employees": 2,
        "total_hours": "120",
        "total_amount": "54000",
        "status": status,
        "created_by": 3,
        "created_at": "2024-04-15T08:00:00.000Z",
        "approved_by": if status == "draft" || status == "ready_for_approval" { Value::Null } else { json!(APPROVER_ID) },
        "approved_at": Value::Null,
        "sent_to_zenegy_at": Value::Null,
        "zenegy_sync_status": sync_status,
        "notes": Value::Null
    })
}

/// One confirmed entry from `/api/app/work-entries/confirmed`
pub fn confirmed_entry(entry_id: i64, employee_id: Option<i64>, day: u32) -> Value {
    json!({
        "entry_id": entry_id,
        "work_date": format!("2024-04-{day:02}T00:00:00.000Z"),
        "start_time": format!("2024-04-{day:02}T07:00:00.000Z"),
        "end_time": format!("2024-04-{day:02}T15:30:00.000Z"),
        "pause_minutes": 30,
        "worked_hours": 8.0,
        "status": "completed",
        "confirmation_status": "confirmed",
        "employee": employee_id.map(|id| json!({ "employee_id": id, "name": format!("Operator {id}") })),
        "task": { "task_id": 70, "title": "Tower crane", "project": { "project_id": 7, "title": "Harbour" } }
    })
}
