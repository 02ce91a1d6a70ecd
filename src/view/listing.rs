use serde::{Deserialize, Serialize};

use crate::models::{ApiKeyDetails, CheckStatus, CheckSummary, KeyStatus, Priority};
use crate::view::detail::priority_label;
use crate::view::format;
use crate::view::status::StatusDisplay;

/// How many checks the dashboard shows.
pub const RECENT_LIMIT: usize = 5;

/// The list endpoint makes no ordering promise; newest first is ours.
pub fn sort_recent_first(checks: &mut [CheckSummary]) {
    checks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    /// Includes `processing`.
    Pending,
    Completed,
    Failed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Pending,
        StatusFilter::Completed,
        StatusFilter::Failed,
    ];

    pub fn matches(self, status: CheckStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status.is_in_progress(),
            StatusFilter::Completed => status == CheckStatus::Completed,
            StatusFilter::Failed => status == CheckStatus::Failed,
        }
    }

    /// Unknown names fall back to `All`.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == name)
            .unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => "pending",
            StatusFilter::Completed => "completed",
            StatusFilter::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub all: usize,
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn tally(checks: &[CheckSummary]) -> Self {
        let count = |filter: StatusFilter| checks.iter().filter(|c| filter.matches(c.status)).count();
        Self {
            all: checks.len(),
            pending: count(StatusFilter::Pending),
            completed: count(StatusFilter::Completed),
            failed: count(StatusFilter::Failed),
        }
    }

    pub fn get(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.all,
            StatusFilter::Pending => self.pending,
            StatusFilter::Completed => self.completed,
            StatusFilter::Failed => self.failed,
        }
    }
}

/// A check card in a list.
#[derive(Debug, Clone, Serialize)]
pub struct CheckRow {
    pub check_id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: String,
    pub created: String,
    pub plan_type: String,
    pub priority: Option<&'static str>,
    pub high_priority: bool,
    pub badge: StatusDisplay,
}

impl From<&CheckSummary> for CheckRow {
    fn from(check: &CheckSummary) -> Self {
        let file = &check.file_id;
        Self {
            check_id: check.check_id.clone(),
            file_name: if file.original_file_name.is_empty() {
                "Unknown File".to_string()
            } else {
                file.original_file_name.clone()
            },
            file_type: if file.file_type.is_empty() {
                "FILE".to_string()
            } else {
                file.file_type.to_uppercase()
            },
            file_size: format::file_size_mb(file.file_size),
            created: format::short_timestamp(&check.created_at),
            plan_type: if check.plan_type.is_empty() {
                "standard".to_string()
            } else {
                check.plan_type.clone()
            },
            priority: check.priority.map(priority_label),
            high_priority: check.priority == Some(Priority::High),
            badge: check.status.display(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterTab {
    pub name: &'static str,
    pub count: usize,
    pub active: bool,
}

/// Check history: every check, newest first, with a status filter.
#[derive(Debug, Clone, Default)]
pub struct HistoryView {
    checks: Vec<CheckSummary>,
    pub filter: StatusFilter,
    pub error: Option<String>,
}

impl HistoryView {
    pub fn from_outcome(outcome: Result<Vec<CheckSummary>, String>, filter: StatusFilter) -> Self {
        match outcome {
            Ok(mut checks) => {
                sort_recent_first(&mut checks);
                Self {
                    checks,
                    filter,
                    error: None,
                }
            }
            Err(message) => Self {
                checks: Vec::new(),
                filter,
                error: Some(message),
            },
        }
    }

    pub fn checks(&self) -> &[CheckSummary] {
        &self.checks
    }

    pub fn filtered(&self) -> impl Iterator<Item = &CheckSummary> {
        let filter = self.filter;
        self.checks.iter().filter(move |c| filter.matches(c.status))
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(&self.checks)
    }

    pub fn tabs(&self) -> Vec<FilterTab> {
        let counts = self.counts();
        StatusFilter::ALL
            .iter()
            .map(|&f| FilterTab {
                name: f.as_str(),
                count: counts.get(f),
                active: f == self.filter,
            })
            .collect()
    }

    pub fn rows(&self) -> Vec<CheckRow> {
        self.filtered().map(CheckRow::from).collect()
    }

    /// Mirror a successful delete-all locally.
    pub fn clear(&mut self) {
        self.checks.clear();
        self.error = None;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyPanel {
    pub status: &'static str,
    pub active: bool,
    pub name: String,
    pub expires: String,
    pub total_checks: u64,
    pub checks_used: u64,
    pub checks_remaining: u64,
}

impl From<&ApiKeyDetails> for KeyPanel {
    fn from(key: &ApiKeyDetails) -> Self {
        Self {
            status: match key.status {
                KeyStatus::Active => "active",
                KeyStatus::Inactive => "inactive",
                KeyStatus::Expired => "expired",
            },
            active: key.status == KeyStatus::Active,
            name: if key.name.is_empty() {
                "Default Key".to_string()
            } else {
                key.name.clone()
            },
            expires: format::long_date(&key.expires_at),
            total_checks: key.total_checks,
            checks_used: key.checks_used,
            checks_remaining: key.checks_remaining,
        }
    }
}

/// Dashboard: key usage plus the most recent checks.
///
/// The two sources fail independently; whichever succeeded is still shown.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub key: Option<ApiKeyDetails>,
    pub recent: Vec<CheckSummary>,
    pub error: Option<String>,
}

impl DashboardView {
    pub fn from_outcomes(
        key: Result<ApiKeyDetails, String>,
        checks: Result<Vec<CheckSummary>, String>,
    ) -> Self {
        let key = key
            .map_err(|e| tracing::warn!("API key details unavailable: {}", e))
            .ok();
        if let Some(k) = key.as_ref().filter(|k| !k.usage_is_consistent()) {
            tracing::warn!(
                "Key usage does not add up: {} used + {} remaining != {} total",
                k.checks_used,
                k.checks_remaining,
                k.total_checks
            );
        }
        let (recent, error) = match checks {
            Ok(mut checks) => {
                sort_recent_first(&mut checks);
                checks.truncate(RECENT_LIMIT);
                (checks, None)
            }
            Err(message) => (Vec::new(), Some(message)),
        };
        Self { key, recent, error }
    }

    pub fn completed_count(&self) -> usize {
        StatusCounts::tally(&self.recent).completed
    }

    pub fn in_progress_count(&self) -> usize {
        StatusCounts::tally(&self.recent).pending
    }

    pub fn key_panel(&self) -> Option<KeyPanel> {
        self.key.as_ref().map(KeyPanel::from)
    }

    pub fn rows(&self) -> Vec<CheckRow> {
        self.recent.iter().map(CheckRow::from).collect()
    }
}
