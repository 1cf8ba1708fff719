use crate::{
    config::Config,
    parser,
    remote::{self, Remote},
    report::JobRecord,
    util::normalize_report,
    verdict::{self, Verdict},
};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

/// Parsed jobs and the verdict they fold into.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub records: Vec<JobRecord>,
    pub verdict: Verdict,
}

/// Pure half of a check: report text in, outcome out.
pub fn evaluate_report(cfg: &Config, raw: &str) -> Outcome {
    let records = if cfg.report.normalize_unicode {
        parser::parse_report(&normalize_report(raw))
    } else {
        parser::parse_report(raw)
    };
    let verdict = verdict::aggregate(&records);

    info!(
        "jobs={} verdict={} newest={}",
        records.len(),
        verdict.label(),
        crate::format::format_timestamp(verdict.newest_timestamp)
    );
    for r in &records {
        debug!(
            job = %r.name,
            active = r.is_active,
            status = %r.status,
            job_status = %r.job_status(),
            "parsed job"
        );
    }

    Outcome { records, verdict }
}

pub struct JobChecker<R: Remote> {
    cfg: Config,
    remote: R,
}

impl<R: Remote> JobChecker<R> {
    pub fn new(cfg: &Config, remote: R) -> Self {
        Self {
            cfg: cfg.clone(),
            remote,
        }
    }

    /// Fetches the status of one job, or of every job in a backup definition, and judges it.
    pub fn check_job(&self, name: &str, backup_definition: bool) -> Result<Outcome> {
        let command = remote::job_status_query(name, backup_definition);
        debug!("remote command: {command}");
        let raw = self
            .remote
            .run(&command)
            .with_context(|| format!("querying job status for {name:?}"))?;
        debug!("report bytes={}", raw.len());
        Ok(evaluate_report(&self.cfg, &raw))
    }

    /// Raw `Get-BEBackupExecSetting` dump; mostly a connectivity check.
    pub fn server_settings(&self) -> Result<String> {
        self.remote
            .run(&remote::setting_query())
            .with_context(|| "querying server settings")
    }
}
