use serde::Serialize;

use crate::models::{CheckDetails, CheckStatus, Priority, ReportKind};
use crate::view::format;
use crate::view::status::StatusDisplay;

pub const REPORT_NOT_AVAILABLE: &str = "Report not available";

/// One download button in the report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportAction {
    pub kind: &'static str,
    pub title: &'static str,
    pub enabled: bool,
    pub caption: &'static str,
    pub href: String,
    /// Name the browser saves the PDF under.
    pub filename: String,
}

/// Download buttons, or `None` while the check has not completed.
///
/// A button is enabled only when its report kind has an entry; the two kinds
/// are independent.
pub fn report_actions(check: &CheckDetails) -> Option<Vec<ReportAction>> {
    if check.status != CheckStatus::Completed {
        return None;
    }

    let actions = ReportKind::ALL
        .iter()
        .map(|&kind| {
            let enabled = check.has_report(kind);
            let caption = match (kind, enabled) {
                (_, false) => REPORT_NOT_AVAILABLE,
                (ReportKind::Ai, true) => "Download AI content analysis",
                (ReportKind::Plagiarism, true) => "Download plagiarism analysis",
            };
            ReportAction {
                kind: kind.route_segment(),
                title: kind.title(),
                enabled,
                caption,
                href: format!("/api/report/{}/{}", kind.route_segment(), check.check_id),
                filename: kind.attachment_name(&check.check_id),
            }
        })
        .collect();
    Some(actions)
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffCard {
    pub name: String,
    pub email: String,
    pub initial: String,
}

/// Everything the detail page renders for one fetched check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckSnapshot {
    pub check_id: String,
    pub status: &'static str,
    pub banner: StatusDisplay,
    pub file_name: String,
    pub file_type: String,
    pub file_size: String,
    pub submitted: String,
    pub delivery: String,
    pub priority: Option<&'static str>,
    pub high_priority: bool,
    pub plan_type: Option<String>,
    pub downloads: Option<Vec<ReportAction>>,
    pub staff: Option<StaffCard>,
    pub in_progress: bool,
}

impl CheckSnapshot {
    pub fn new(check: &CheckDetails) -> Self {
        let file = &check.file_id;
        let staff = check.staff().map(|s| StaffCard {
            name: s.name.clone(),
            email: s.email.clone(),
            initial: s
                .name
                .chars()
                .next()
                .map(|c| c.to_uppercase().to_string())
                .unwrap_or_else(|| "S".to_string()),
        });

        Self {
            check_id: check.check_id.clone(),
            status: check.status.as_str(),
            banner: check.status.display(),
            file_name: non_empty(&file.original_file_name).unwrap_or_else(|| "Unknown".into()),
            file_type: non_empty(&file.file_type)
                .map(|t| t.to_uppercase())
                .unwrap_or_else(|| "Unknown".into()),
            file_size: format::file_size_mb(file.file_size),
            submitted: format::long_timestamp(&check.created_at),
            delivery: format::long_timestamp(&check.delivery_time),
            priority: check.priority.map(priority_label),
            high_priority: check.priority == Some(Priority::High),
            plan_type: non_empty(&check.plan_type),
            downloads: report_actions(check),
            staff,
            in_progress: check.status.is_in_progress(),
        }
    }

    /// Single-line rendering for terminal output.
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "{} [{}] {}: {}",
            self.check_id, self.banner.label, self.file_name, self.banner.description
        );
        if let Some(ref downloads) = self.downloads {
            for action in downloads {
                line.push_str(&format!(
                    " | {}: {}",
                    action.title,
                    if action.enabled {
                        action.href.as_str()
                    } else {
                        action.caption
                    }
                ));
            }
        }
        line
    }
}

pub fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Normal => "normal",
        Priority::High => "high",
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// What the detail view shows right now.
#[derive(Debug)]
pub enum DetailPhase<'a> {
    Loading,
    Failed(&'a str),
    Ready(&'a CheckDetails),
}

/// State of a mounted check detail view.
///
/// Status is never validated for monotonicity: whatever the most recently
/// resolved fetch says is what gets rendered.
#[derive(Debug, Clone)]
pub struct CheckDetailView {
    pub check_id: String,
    loading: bool,
    check: Option<CheckDetails>,
    error: Option<String>,
}

impl CheckDetailView {
    pub fn new(check_id: impl Into<String>) -> Self {
        Self {
            check_id: check_id.into(),
            loading: true,
            check: None,
            error: None,
        }
    }

    pub fn apply(&mut self, outcome: Result<CheckDetails, String>) {
        self.loading = false;
        match outcome {
            Ok(check) => {
                self.check = Some(check);
                self.error = None;
            }
            Err(message) => self.error = Some(message),
        }
    }

    pub fn phase(&self) -> DetailPhase<'_> {
        if self.loading {
            return DetailPhase::Loading;
        }
        match (&self.error, &self.check) {
            (Some(message), _) => DetailPhase::Failed(message),
            (None, Some(check)) => DetailPhase::Ready(check),
            (None, None) => DetailPhase::Failed("The requested check could not be found."),
        }
    }

    pub fn snapshot(&self) -> Option<CheckSnapshot> {
        match self.phase() {
            DetailPhase::Ready(check) => Some(CheckSnapshot::new(check)),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<CheckStatus> {
        match self.phase() {
            DetailPhase::Ready(check) => Some(check.status),
            _ => None,
        }
    }
}
