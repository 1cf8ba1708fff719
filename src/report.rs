use serde::Serialize;
use time::{
    format_description::BorrowedFormatItem,
    macros::{datetime, format_description},
    PrimitiveDateTime,
};

/// Stand-in for "no timestamp": what an unrun job or an unparseable field carries.
pub const ZERO_TIME: PrimitiveDateTime = datetime!(0001-01-01 0:00);

/// `11/30/2019 11:00:02 PM`, as BEMCLI prints it.
pub const REPORT_TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[month padding:none]/[day padding:none]/[year] [hour repr:12 padding:none]:[minute]:[second] [period]"
);

/// One job definition as listed by the remote host, plus its last run if it had one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub name: String,
    pub job_type: String,
    pub task_type: String,
    pub task_name: String,
    pub is_active: bool,
    pub status: String,
    pub sub_status: String,
    pub selection_summary: String,
    pub storage: String,
    pub schedule: String,
    pub is_backup_definition_job: bool,
    pub history: Option<JobHistory>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobHistory {
    pub job_status: String,
    pub start_time: PrimitiveDateTime,
    pub end_time: PrimitiveDateTime,
    /// `-1` when the run was aborted before progress could be measured.
    pub percent_complete: i32,
    pub total_data_size_bytes: u64,
    pub job_rate_mb_per_minute: f64,
    pub error_category: i32,
    pub error_code: i32,
    pub error_message: String,
}

impl Default for JobHistory {
    fn default() -> Self {
        Self {
            job_status: String::new(),
            start_time: ZERO_TIME,
            end_time: ZERO_TIME,
            percent_complete: 0,
            total_data_size_bytes: 0,
            job_rate_mb_per_minute: 0.0,
            error_category: 0,
            error_code: 0,
            error_message: String::new(),
        }
    }
}

impl JobRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job_type: String::new(),
            task_type: String::new(),
            task_name: String::new(),
            is_active: false,
            status: String::new(),
            sub_status: String::new(),
            selection_summary: String::new(),
            storage: String::new(),
            schedule: String::new(),
            is_backup_definition_job: false,
            history: None,
        }
    }

    /// Terminal outcome of the last run; empty when the job never ran.
    pub fn job_status(&self) -> &str {
        self.history.as_ref().map_or("", |h| h.job_status.as_str())
    }

    pub fn end_time(&self) -> PrimitiveDateTime {
        self.history.as_ref().map_or(ZERO_TIME, |h| h.end_time)
    }

    pub fn error_message(&self) -> &str {
        self.history.as_ref().map_or("", |h| h.error_message.as_str())
    }
}
