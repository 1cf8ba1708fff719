use crate::{
    report::JobRecord,
    severity::Severity,
    verdict::{sorted_for_fold, Verdict},
};
use std::fmt::Write as _;
use time::{format_description::BorrowedFormatItem, macros::format_description, PrimitiveDateTime};

pub const LAST_RUN_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]/[month]/[year] [hour]:[minute]:[second]");

pub fn format_timestamp(ts: PrimitiveDateTime) -> String {
    ts.format(LAST_RUN_FORMAT)
        .unwrap_or_else(|_| "00/00/0000 00:00:00".to_string())
}

/// `<LABEL>: Last Run '<DD/MM/YYYY HH:MM:SS>' <message>`, newline-terminated, with `|perfdata`
/// before the newline when there is any.
pub fn render(verdict: &Verdict) -> String {
    let mut line = format!(
        "{}: Last Run '{}' {}",
        verdict.label(),
        format_timestamp(verdict.newest_timestamp),
        verdict.message
    );
    if !verdict.perfdata.is_empty() {
        line.push('|');
        line.push_str(&verdict.perfdata);
    }
    line.push('\n');
    line
}

/// The verdict line followed by one detail line per job, in the order the jobs were folded.
pub fn render_verbose(verdict: &Verdict, records: &[JobRecord]) -> String {
    let mut out = render(verdict);
    for record in sorted_for_fold(records) {
        out.push_str(&job_line(record));
        out.push('\n');
    }
    out
}

fn job_line(record: &JobRecord) -> String {
    let Some(h) = record.history.as_ref() else {
        return format!(
            "{}: {}-{} never run",
            record.name, record.status, record.sub_status
        );
    };

    let state = if h.job_status.is_empty() {
        format!("{}-{}", record.status, record.sub_status)
    } else {
        h.job_status.clone()
    };
    let mut line = format!(
        "{}: {} end={} {}% {:.1} MB/min",
        record.name,
        state,
        format_timestamp(h.end_time),
        h.percent_complete,
        h.job_rate_mb_per_minute
    );
    if h.error_category != 0 || h.error_code != 0 || !h.error_message.is_empty() {
        let _ = write!(line, " error={}/{}", h.error_category, h.error_code);
        if !h.error_message.is_empty() {
            line.push(' ');
            line.push_str(&h.error_message);
        }
    }
    line
}

/// Line for failures that happen before there is a report to judge, e.g. an unreachable host.
pub fn render_failure(severity: Severity, reason: &str) -> String {
    format!("{}: {}\n", severity.label(), reason)
}
