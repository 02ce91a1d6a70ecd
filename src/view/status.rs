use serde::Serialize;

use crate::models::CheckStatus;

/// How a status is presented: banner/badge label, colour tone, one-line text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusDisplay {
    pub label: &'static str,
    pub tone: &'static str,
    pub description: &'static str,
}

impl CheckStatus {
    pub fn display(self) -> StatusDisplay {
        match self {
            CheckStatus::Pending => StatusDisplay {
                label: "Pending",
                tone: "amber",
                description: "Your document is queued for analysis.",
            },
            CheckStatus::Processing => StatusDisplay {
                label: "Processing",
                tone: "blue",
                description: "Your document is being analyzed.",
            },
            CheckStatus::Completed => StatusDisplay {
                label: "Completed",
                tone: "emerald",
                description: "Analysis complete. Download your reports below.",
            },
            CheckStatus::Failed => StatusDisplay {
                label: "Failed",
                tone: "rose",
                description: "An error occurred during analysis.",
            },
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CheckStatus::Completed | CheckStatus::Failed)
    }

    pub fn is_in_progress(self) -> bool {
        matches!(self, CheckStatus::Pending | CheckStatus::Processing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Pending => "pending",
            CheckStatus::Processing => "processing",
            CheckStatus::Completed => "completed",
            CheckStatus::Failed => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CheckStatus; 4] = [
        CheckStatus::Pending,
        CheckStatus::Processing,
        CheckStatus::Completed,
        CheckStatus::Failed,
    ];

    #[test]
    fn terminal_and_in_progress_partition_the_states() {
        for status in ALL {
            assert_ne!(status.is_terminal(), status.is_in_progress(), "{status:?}");
        }
        assert!(CheckStatus::Completed.is_terminal());
        assert!(CheckStatus::Failed.is_terminal());
    }

    #[test]
    fn every_state_has_a_distinct_label() {
        let labels: std::collections::HashSet<_> = ALL.iter().map(|s| s.display().label).collect();
        assert_eq!(labels.len(), 4);
        assert_eq!(CheckStatus::Pending.display().tone, "amber");
    }

    #[test]
    fn wire_names_round_trip() {
        for status in ALL {
            let decoded: CheckStatus =
                serde_json::from_value(serde_json::json!(status.as_str())).unwrap();
            assert_eq!(decoded, status);
        }
    }
}
