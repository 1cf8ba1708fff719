use crate::report::{JobHistory, JobRecord, REPORT_TIME_FORMAT, ZERO_TIME};
use regex::Regex;
use std::sync::LazyLock;
use time::PrimitiveDateTime;

pub const FIELD_LABELS: [&str; 12] = [
    "Name",
    "JobType",
    "TaskType",
    "TaskName",
    "IsActive",
    "Status",
    "SubStatus",
    "SelectionSummary",
    "Storage",
    "Schedule",
    "IsBackupDefinitionJob",
    "JobHistory",
];

const NAME: usize = 0;
const IS_BACKUP_DEFINITION_JOB: usize = 10;
const JOB_HISTORY: usize = 11;

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = FIELD_LABELS.join("|");
    Regex::new(&format!(r"\b({alternation})\s*:")).expect("field label pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryKey {
    JobStatus,
    StartTime,
    EndTime,
    PercentComplete,
    TotalDataSizeBytes,
    JobRateMbPerMinute,
    ErrorCategory,
    ErrorCode,
    ErrorMessage,
}

impl HistoryKey {
    fn from_name(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        Some(match key.as_str() {
            "jobstatus" => Self::JobStatus,
            "starttime" => Self::StartTime,
            "endtime" => Self::EndTime,
            "percentcomplete" => Self::PercentComplete,
            "totaldatasizebytes" => Self::TotalDataSizeBytes,
            "jobratembperminute" => Self::JobRateMbPerMinute,
            "errorcategory" => Self::ErrorCategory,
            "errorcode" => Self::ErrorCode,
            "errormessage" => Self::ErrorMessage,
            _ => return None,
        })
    }
}

/// Record being filled in while scanning: which field is open and where its value starts.
struct Draft {
    record: JobRecord,
    field: usize,
    value_start: usize,
}

impl Draft {
    fn open(value_start: usize) -> Self {
        Self {
            record: JobRecord::new(""),
            field: NAME,
            value_start,
        }
    }

    fn close_field(&mut self, raw: &str, value_end: usize) {
        assign_field(&mut self.record, self.field, &raw[self.value_start..value_end]);
    }
}

/// Extracts every job record from a report, in the order their `Name` labels appear.
///
/// Reads both the `Format-List` shape (`Label : value` per line, padded) and the same text with
/// every line break collapsed into a space. Labels always appear in [`FIELD_LABELS`] order, so a
/// label only closes the current field when it is the next one expected; anything else is value
/// text.
///
/// Never fails: text without a `Name` label yields no records, and malformed field values fall
/// back to their zero value.
pub fn parse_report(raw: &str) -> Vec<JobRecord> {
    let mut records = Vec::new();
    let mut draft: Option<Draft> = None;
    // Labels inside a `@{...}` history block belong to the error message, not the record.
    let mut skip_until = 0;

    for caps in LABEL_RE.captures_iter(raw) {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() < skip_until {
            continue;
        }
        let Some(idx) = FIELD_LABELS.iter().position(|l| *l == label.as_str()) else {
            continue;
        };

        let Some(d) = draft.as_mut() else {
            if idx == NAME {
                draft = Some(Draft::open(whole.end()));
            }
            continue;
        };

        if idx == NAME && d.field >= IS_BACKUP_DEFINITION_JOB {
            d.close_field(raw, whole.start());
            if let Some(done) = draft.replace(Draft::open(whole.end())) {
                records.push(done.record);
            }
        } else if idx == d.field + 1 {
            d.close_field(raw, whole.start());
            d.field = idx;
            d.value_start = whole.end();
            if idx == JOB_HISTORY {
                skip_until = history_block_end(raw, whole.end()).unwrap_or(skip_until);
            }
        }
    }

    if let Some(mut d) = draft {
        d.close_field(raw, raw.len());
        records.push(d.record);
    }
    records
}

/// Byte offset just past the `}` closing a `@{` block that starts right after `from`.
fn history_block_end(raw: &str, from: usize) -> Option<usize> {
    let rest = &raw[from..];
    let body = rest.trim_start();
    if !body.starts_with("@{") {
        return None;
    }
    let open = from + (rest.len() - body.len());
    raw[open..].find('}').map(|close| open + close + 1)
}

fn assign_field(record: &mut JobRecord, field: usize, value: &str) {
    let value = collapse_whitespace(value);
    match field {
        0 => record.name = value,
        1 => record.job_type = value,
        2 => record.task_type = value,
        3 => record.task_name = value,
        4 => record.is_active = parse_bool(&value),
        5 => record.status = value,
        6 => record.sub_status = value,
        7 => record.selection_summary = value,
        8 => record.storage = value,
        9 => record.schedule = value,
        IS_BACKUP_DEFINITION_JOB => record.is_backup_definition_job = parse_bool(&value),
        JOB_HISTORY => record.history = parse_history(&value),
        _ => {}
    }
}

/// Parses the `@{k=v; k=v}` block BEMCLI prints for a calculated property.
///
/// Returns `None` when the block holds no recognised key, i.e. the job never ran.
pub fn parse_history(raw: &str) -> Option<JobHistory> {
    let body = raw.trim();
    let body = body.strip_prefix("@{").unwrap_or(body);
    let body = body.strip_suffix('}').unwrap_or(body);

    let mut history = JobHistory::default();
    let mut seen = false;
    let mut offset = 0;

    for segment in body.split(';') {
        let segment_start = offset;
        offset += segment.len() + 1;
        let Some((name, value)) = segment.split_once('=') else {
            continue;
        };
        let Some(key) = HistoryKey::from_name(name) else {
            continue;
        };
        seen = true;
        let value = value.trim();
        match key {
            HistoryKey::JobStatus => history.job_status = value.to_string(),
            HistoryKey::StartTime => history.start_time = parse_time(value),
            HistoryKey::EndTime => history.end_time = parse_time(value),
            HistoryKey::PercentComplete => history.percent_complete = parse_percent(value),
            HistoryKey::TotalDataSizeBytes => history.total_data_size_bytes = value.parse().unwrap_or(0),
            HistoryKey::JobRateMbPerMinute => history.job_rate_mb_per_minute = parse_rate(value),
            HistoryKey::ErrorCategory => history.error_category = value.parse().unwrap_or(0),
            HistoryKey::ErrorCode => history.error_code = value.parse().unwrap_or(0),
            HistoryKey::ErrorMessage => {
                // Last projected column and free text: it owns the rest of the block.
                let value_start = segment_start + name.len() + 1;
                history.error_message = body[value_start..].trim().to_string();
                break;
            }
        }
    }

    seen.then_some(history)
}

/// PowerShell prints booleans as `True`/`False`; anything else reads as false.
pub fn parse_bool(value: &str) -> bool {
    value == "True"
}

pub fn parse_time(value: &str) -> PrimitiveDateTime {
    PrimitiveDateTime::parse(value.trim(), REPORT_TIME_FORMAT).unwrap_or(ZERO_TIME)
}

fn parse_percent(value: &str) -> i32 {
    match value.parse::<i32>() {
        Ok(p) if (-1..=100).contains(&p) => p,
        _ => 0,
    }
}

fn parse_rate(value: &str) -> f64 {
    match value.parse::<f64>() {
        Ok(r) if r.is_finite() && r >= 0.0 => r,
        _ => 0.0,
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn history_block_end_skips_leading_space() {
        let raw = "JobHistory : @{ErrorMessage=Storage : x} Name : next";
        let from = raw.find(':').unwrap() + 1;
        let end = history_block_end(raw, from).unwrap();
        assert_eq!(&raw[end..], " Name : next");
    }

    #[test]
    fn history_block_end_requires_brace_block() {
        assert_eq!(history_block_end("JobHistory : Name : x", 12), None);
    }

    #[test]
    fn parses_twelve_hour_timestamps() {
        assert_eq!(parse_time("11/30/2019 11:00:02 PM"), datetime!(2019-11-30 23:00:02));
        assert_eq!(parse_time("12/1/2019 7:32:37 AM"), datetime!(2019-12-01 7:32:37));
        assert_eq!(parse_time("12/1/2019 12:05:00 AM"), datetime!(2019-12-01 0:05:00));
        assert_eq!(parse_time("2019-12-01T07:32:37"), ZERO_TIME);
        assert_eq!(parse_time(""), ZERO_TIME);
    }

    #[test]
    fn percent_outside_range_is_zero() {
        assert_eq!(parse_percent("-1"), -1);
        assert_eq!(parse_percent("100"), 100);
        assert_eq!(parse_percent("101"), 0);
        assert_eq!(parse_percent("-5"), 0);
        assert_eq!(parse_percent("abc"), 0);
    }

    #[test]
    fn negative_or_garbage_rate_is_zero() {
        assert_eq!(parse_rate("5366.038"), 5366.038);
        assert_eq!(parse_rate("-3"), 0.0);
        assert_eq!(parse_rate("NaN"), 0.0);
    }

    #[test]
    fn error_message_keeps_semicolons() {
        let h = parse_history("@{JobStatus=Error; ErrorCode=5; ErrorMessage=disk full; retry later}")
            .unwrap();
        assert_eq!(h.error_message, "disk full; retry later");
        assert_eq!(h.error_code, 5);
    }

    #[test]
    fn error_message_takes_rest_of_block_even_with_equals() {
        let h = parse_history(
            "@{JobStatus=Error; ErrorCode=5; ErrorMessage=Access denied; user=backup lacks rights}",
        )
        .unwrap();
        assert_eq!(h.error_message, "Access denied; user=backup lacks rights");
        assert_eq!(h.job_status, "Error");
    }

    #[test]
    fn empty_error_message_stays_empty() {
        let h = parse_history("@{JobStatus=Succeeded; ErrorCode=0; ErrorMessage=}").unwrap();
        assert_eq!(h.error_message, "");
    }
}
