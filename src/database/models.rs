use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

/// Evening status written by a successful check-out.
pub const EVENING_STATUS_DONE: &str = "已完成工作";

/// Canonical "all normal" progress label; anything else renders red.
pub const PROGRESS_ALL_NORMAL: &str = "一切正常";

/// Task label attached to card-button check-ins.
pub const DEFAULT_TASK: &str = "日常工作";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub user_name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub user_id: String,
    pub user_name: String,
    pub date: NaiveDate,
    pub check_in_time: Option<NaiveTime>,
    pub check_out_time: Option<NaiveTime>,
    pub morning_status: Option<String>,
    pub evening_status: Option<String>,
    pub location: Option<String>,
    pub task: Option<String>,
    pub tasks_json: Option<String>,
    pub completion: i64,
    pub progress_status: Option<String>,
    pub work_summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One user's slice of today's ledger, as consumed by the daily report.
#[derive(Debug, Clone)]
pub struct TodayStatus {
    pub user_id: String,
    pub name: String,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub morning_status: Option<String>,
    pub evening_status: Option<String>,
    pub task: Option<String>,
    pub location: Option<String>,
    pub completion: i64,
    pub progress_status: Option<String>,
    pub work_summary: Option<String>,
    pub tasks: Vec<String>,
}

/// Snapshot returned for a single user's 状态 query.
#[derive(Debug, Clone)]
pub struct UserStatus {
    pub name: String,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub status: Option<String>,
    pub task: Option<String>,
    pub completion: i64,
    pub progress_status: Option<String>,
}

/// Result of a check-in attempt. A duplicate check-in is a user-facing
/// condition, not a fault, so it travels in the Ok branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInOutcome {
    Created,
    AlreadyCheckedIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutOutcome {
    Completed,
    NotCheckedIn,
}

/// A settings value after best-effort JSON decode: structured when the
/// stored text parses as JSON, otherwise the raw string.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Json(serde_json::Value),
    Raw(String),
}

impl SettingValue {
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => SettingValue::Json(value),
            Err(_) => SettingValue::Raw(raw.to_string()),
        }
    }
}

/// All settings keyed by name, hydrated once per request where needed.
#[derive(Debug, Clone, Default)]
pub struct SettingsMap {
    values: HashMap<String, SettingValue>,
}

impl SettingsMap {
    pub fn from_rows(rows: Vec<(String, String)>) -> Self {
        let values = rows
            .into_iter()
            .map(|(key, value)| (key, SettingValue::decode(&value)))
            .collect();
        SettingsMap { values }
    }

    /// Display form of a value; JSON scalars render unquoted.
    pub fn text(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(SettingValue::Raw(s)) => s.clone(),
            Some(SettingValue::Json(serde_json::Value::String(s))) => s.clone(),
            Some(SettingValue::Json(value)) => value.to_string(),
            None => default.to_string(),
        }
    }

    /// JSON array of strings, or empty when the key is absent or not a list.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.values.get(key) {
            Some(SettingValue::Json(serde_json::Value::Array(items))) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(SettingValue::Json(serde_json::Value::Bool(b))) => *b,
            Some(SettingValue::Raw(s)) => s == "true",
            _ => default,
        }
    }
}
