//! Typed mirrors of the records the detection service owns.
//!
//! The proxy forwards upstream JSON untouched; these types are only used by
//! the view layer, which needs to read status, files and report entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Absent and `null` both read as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    Active,
    Inactive,
    Expired,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_file_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stored_file_name: String,
    /// Megabytes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_size: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_type: String,
    pub file_reference: Option<String>,
    #[serde(rename = "eTag")]
    pub e_tag: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffInfo {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub report_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub report_e_tag: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSet {
    pub ai: Option<ReportInfo>,
    pub plagiarism: Option<ReportInfo>,
}

impl ReportSet {
    pub fn get(&self, kind: ReportKind) -> Option<&ReportInfo> {
        match kind {
            ReportKind::Ai => self.ai.as_ref(),
            ReportKind::Plagiarism => self.plagiarism.as_ref(),
        }
    }

    /// An entry only counts once it carries a report URL.
    pub fn has(&self, kind: ReportKind) -> bool {
        self.get(kind).is_some_and(|r| !r.report_url.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetails {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub check_id: String,
    pub staff_id: Option<StaffInfo>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reports: ReportSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDetails {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    pub check_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_id: FileInfo,
    pub report_id: Option<ReportDetails>,
    pub status: CheckStatus,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub plan_type: String,
    pub delivery_time: DateTime<Utc>,
    pub checked_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CheckDetails {
    pub fn has_report(&self, kind: ReportKind) -> bool {
        self.report_id
            .as_ref()
            .is_some_and(|r| r.reports.has(kind))
    }

    pub fn staff(&self) -> Option<&StaffInfo> {
        self.report_id.as_ref().and_then(|r| r.staff_id.as_ref())
    }
}

/// The reduced record returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSummary {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    pub check_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_id: FileInfo,
    pub status: CheckStatus,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub plan_type: String,
    pub delivery_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl CheckSummary {
    /// Decode list entries one at a time; entries that do not decode are
    /// skipped so one bad record cannot hide the rest.
    pub fn decode_all(entries: Vec<Value>) -> Vec<Self> {
        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Self>(entry) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    tracing::warn!("Skipping unreadable check in list: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyDetails {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub total_checks: u64,
    pub checks_used: u64,
    pub checks_remaining: u64,
    pub status: KeyStatus,
    pub expires_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApiKeyDetails {
    /// `checksUsed + checksRemaining == totalChecks` as reported upstream.
    pub fn usage_is_consistent(&self) -> bool {
        self.checks_used.checked_add(self.checks_remaining) == Some(self.total_checks)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCheckResponse {
    pub check_id: String,
    pub delivery_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Ai,
    Plagiarism,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::Ai, ReportKind::Plagiarism];

    /// Path segment on the detection API (`/api/report/<segment>`).
    pub fn upstream_segment(self) -> &'static str {
        match self {
            ReportKind::Ai => "ai",
            ReportKind::Plagiarism => "plag",
        }
    }

    /// Path segment on the local API (`/api/report/<segment>/{checkId}`).
    pub fn route_segment(self) -> &'static str {
        match self {
            ReportKind::Ai => "ai",
            ReportKind::Plagiarism => "plagiarism",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Ai => "AI Detection Report",
            ReportKind::Plagiarism => "Plagiarism Report",
        }
    }

    pub fn attachment_name(self, check_id: &str) -> String {
        format!("{}_report_{}.pdf", self.route_segment(), check_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{check_json, key_json, summary_json};

    #[test]
    fn check_details_decode_with_partial_reports() {
        let mut value = check_json("abc123", "completed");
        value["reportId"] = serde_json::json!({
            "_id": "r1",
            "checkId": "abc123",
            "reports": { "ai": { "reportUrl": "https://files/ai.pdf", "reportETag": "e1" } }
        });
        let check: CheckDetails = serde_json::from_value(value).unwrap();
        assert_eq!(check.status, CheckStatus::Completed);
        assert!(check.has_report(ReportKind::Ai));
        assert!(!check.has_report(ReportKind::Plagiarism));
        assert!(check.staff().is_none());
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let mut value = check_json("abc123", "completed");
        value["fileId"] = Value::Null;
        value["planType"] = Value::Null;
        value["userId"] = Value::Null;
        value["reportId"] = serde_json::json!({ "_id": "r1", "checkId": null, "reports": null });
        let check: CheckDetails = serde_json::from_value(value).unwrap();
        assert_eq!(check.file_id.original_file_name, "");
        assert_eq!(check.plan_type, "");
        assert!(!check.has_report(ReportKind::Ai));
        assert!(!check.has_report(ReportKind::Plagiarism));
    }

    #[test]
    fn empty_report_entry_is_not_available() {
        let mut value = check_json("abc123", "completed");
        value["reportId"] = serde_json::json!({
            "reports": { "ai": {}, "plagiarism": { "reportUrl": null } }
        });
        let check: CheckDetails = serde_json::from_value(value).unwrap();
        assert!(!check.has_report(ReportKind::Ai));
        assert!(!check.has_report(ReportKind::Plagiarism));
    }

    #[test]
    fn file_fields_may_be_null() {
        let mut value = check_json("abc123", "pending");
        value["fileId"] = serde_json::json!({
            "originalFileName": null,
            "fileSize": null,
            "fileType": null
        });
        let check: CheckDetails = serde_json::from_value(value).unwrap();
        assert_eq!(check.file_id.file_size, 0.0);
        assert_eq!(check.file_id.file_type, "");
    }

    #[test]
    fn list_decoding_skips_unreadable_entries() {
        let mut null_file = summary_json("nulls", "pending", "2024-02-01T00:00:00Z");
        null_file["fileId"] = Value::Null;
        null_file["planType"] = Value::Null;
        let entries = vec![
            summary_json("good", "completed", "2024-01-01T00:00:00Z"),
            null_file,
            summary_json("odd", "archived", "2024-03-01T00:00:00Z"),
        ];
        let ids: Vec<_> = CheckSummary::decode_all(entries)
            .into_iter()
            .map(|c| c.check_id)
            .collect();
        assert_eq!(ids, vec!["good", "nulls"]);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let value = check_json("abc123", "archived");
        assert!(serde_json::from_value::<CheckDetails>(value).is_err());
    }

    #[test]
    fn empty_report_url_does_not_count() {
        let set = ReportSet {
            ai: Some(ReportInfo {
                report_url: String::new(),
                report_e_tag: String::new(),
            }),
            plagiarism: None,
        };
        assert!(!set.has(ReportKind::Ai));
    }

    #[test]
    fn key_usage_invariant() {
        let key: ApiKeyDetails = serde_json::from_value(key_json(100, 40, 60)).unwrap();
        assert!(key.usage_is_consistent());
        let key: ApiKeyDetails = serde_json::from_value(key_json(100, 40, 50)).unwrap();
        assert!(!key.usage_is_consistent());
    }

    #[test]
    fn attachment_names_follow_report_kind() {
        assert_eq!(ReportKind::Ai.attachment_name("x1"), "ai_report_x1.pdf");
        assert_eq!(
            ReportKind::Plagiarism.attachment_name("x1"),
            "plagiarism_report_x1.pdf"
        );
    }
}
