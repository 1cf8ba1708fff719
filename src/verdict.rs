use crate::{
    report::{JobRecord, ZERO_TIME},
    severity::{classify, Severity},
};
use serde::Serialize;
use std::{cmp::Ordering, collections::VecDeque};
use time::PrimitiveDateTime;

/// The single judgment one run hands to the supervisor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub severity: Severity,
    pub message: String,
    /// End time of the record that set `severity`.
    pub newest_timestamp: PrimitiveDateTime,
    /// Performance data suffix; nothing fills it yet.
    pub perfdata: String,
}

impl Verdict {
    pub fn unknown() -> Self {
        Self {
            severity: Severity::Unknown,
            message: String::new(),
            newest_timestamp: ZERO_TIME,
            perfdata: String::new(),
        }
    }

    pub fn code(&self) -> i32 {
        self.severity.code()
    }

    pub fn label(&self) -> &'static str {
        self.severity.label()
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Total order the fold runs in: oldest end time first, then by name. The remaining keys only
/// matter for duplicate names and keep the result independent of input order.
pub fn fold_order(a: &JobRecord, b: &JobRecord) -> Ordering {
    a.end_time()
        .cmp(&b.end_time())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.job_status().cmp(b.job_status()))
        .then_with(|| a.status.cmp(&b.status))
        .then_with(|| a.sub_status.cmp(&b.sub_status))
        .then_with(|| a.is_active.cmp(&b.is_active))
}

pub fn sorted_for_fold(records: &[JobRecord]) -> Vec<&JobRecord> {
    let mut ordered: Vec<&JobRecord> = records.iter().collect();
    ordered.sort_by(|a, b| fold_order(a, b));
    ordered
}

/// Folds every record into one verdict.
///
/// Among OK and WARNING runs the most recent one wins. A CRITICAL run latches: later records
/// still add their fragment to the message but no longer move the severity or the timestamp.
/// Critical fragments are put in front of the message, everything else is appended.
pub fn aggregate(records: &[JobRecord]) -> Verdict {
    let mut verdict = Verdict::unknown();
    let mut fragments: VecDeque<String> = VecDeque::with_capacity(records.len());

    for record in sorted_for_fold(records) {
        let end = record.end_time();
        let job_status = record.job_status();

        match classify(job_status) {
            severity @ (Severity::Ok | Severity::Warning) => {
                if verdict.severity != Severity::Critical && end >= verdict.newest_timestamp {
                    verdict.severity = severity;
                    verdict.newest_timestamp = end;
                }
                fragments.push_back(format!("{} {}", record.name, job_status));
            }
            Severity::Critical => {
                if end >= verdict.newest_timestamp {
                    verdict.severity = Severity::Critical;
                    verdict.newest_timestamp = end;
                }
                fragments.push_front(format!(
                    "{} {} [{}]",
                    record.name,
                    job_status,
                    record.error_message()
                ));
            }
            Severity::Unknown => {
                if record.is_active {
                    if verdict.severity == Severity::Unknown {
                        verdict.severity = Severity::Ok;
                    }
                } else if verdict.severity != Severity::Critical {
                    verdict.severity = Severity::Warning;
                }
                fragments.push_back(format!(
                    "{} {}-{}",
                    record.name, record.status, record.sub_status
                ));
            }
        }
    }

    verdict.message = Vec::from(fragments).join("/");
    verdict
}
