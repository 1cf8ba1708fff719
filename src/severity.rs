use serde::{Deserialize, Serialize};
use std::fmt;

/// Monitoring-plugin state. The discriminants are the process exit codes the supervisor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

pub const OK_STATUSES: [&str; 7] = [
    "Completed",
    "Succeeded",
    "SucceededWithExceptions",
    "Active",
    "Ready",
    "Scheduled",
    "Linked",
];

pub const WARNING_STATUSES: [&str; 10] = [
    "OnHold",
    "Recovered",
    "Resumed",
    "Disabled",
    "Superseded",
    "RuleBlocked",
    "Unknown",
    "Dispatched",
    "Queued",
    "ToBeScheduled",
];

pub const CRITICAL_STATUSES: [&str; 8] = [
    "Canceled",
    "Error",
    "Missed",
    "ThresholdAbort",
    "DispatchFailed",
    "InvalidSchedule",
    "InvalidTimeWindow",
    "NotInTimeWindow",
];

impl Severity {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a job's terminal status token to a severity. Matching is exact; anything outside the
/// three sets, the empty "never ran" status included, is `Unknown`.
pub fn classify(job_status: &str) -> Severity {
    if OK_STATUSES.contains(&job_status) {
        Severity::Ok
    } else if WARNING_STATUSES.contains(&job_status) {
        Severity::Warning
    } else if CRITICAL_STATUSES.contains(&job_status) {
        Severity::Critical
    } else {
        Severity::Unknown
    }
}
