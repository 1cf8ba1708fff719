use crate::parser::FIELD_LABELS;

/// Columns selected from `Get-BEJobHistory`; must match what the report parser knows.
pub const HISTORY_COLUMNS: [&str; 9] = [
    "JobStatus",
    "StartTime",
    "EndTime",
    "PercentComplete",
    "TotalDataSizeBytes",
    "JobRateMBPerMinute",
    "ErrorCategory",
    "ErrorCode",
    "ErrorMessage",
];

const IMPORT: &str = "Import-Module BEMCLI";

/// Lists one job, or every job of a backup definition, together with its last run.
pub fn job_status_query(name: &str, backup_definition: bool) -> String {
    let selector = if backup_definition {
        "-BackupDefinition"
    } else {
        "-Name"
    };
    let plain_columns = FIELD_LABELS[..FIELD_LABELS.len() - 1].join(", ");
    let history = format!(
        "@{{name=\"JobHistory\"; expression={{Get-BEJobHistory -FromLastJobRun -Job $_.Name | Select-Object {}}}}}",
        HISTORY_COLUMNS.join(", ")
    );
    format!(
        "{IMPORT}; Get-BEJob {selector} {} | Select-Object {plain_columns}, {history}",
        powershell_quote(name)
    )
}

/// Dumps the server's Backup Exec settings.
pub fn setting_query() -> String {
    format!("{IMPORT}; Get-BEBackupExecSetting")
}

/// Double-quoted PowerShell string literal; backtick escapes what would otherwise expand.
pub fn powershell_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        if matches!(ch, '"' | '`' | '$') {
            out.push('`');
        }
        out.push(ch);
    }
    out.push('"');
    out
}
