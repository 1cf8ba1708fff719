use check_backupexec::{
    parser::parse_report,
    report::{JobHistory, JobRecord, ZERO_TIME},
    severity::Severity,
    verdict::{aggregate, Verdict},
};
use time::{macros::datetime, PrimitiveDateTime};

fn mk_job(name: &str, job_status: &str, end: PrimitiveDateTime) -> JobRecord {
    let mut job = JobRecord::new(name);
    job.status = "Scheduled".into();
    job.sub_status = "Ok".into();
    job.history = Some(JobHistory {
        job_status: job_status.into(),
        end_time: end,
        ..Default::default()
    });
    job
}

fn mk_unrun(name: &str, active: bool) -> JobRecord {
    let mut job = JobRecord::new(name);
    job.is_active = active;
    job.status = if active { "Active" } else { "Scheduled" }.into();
    job.sub_status = "Ok".into();
    job
}

#[test]
fn no_jobs_is_unknown() {
    let v = aggregate(&[]);
    assert_eq!(v, Verdict::unknown());
    assert_eq!(v.severity, Severity::Unknown);
    assert_eq!(v.code(), 3);
    assert_eq!(v.message, "");
    assert_eq!(v.newest_timestamp, ZERO_TIME);
}

#[test]
fn report_without_jobs_is_unknown() {
    let v = aggregate(&parse_report("Get-BEJob : no job named 'x' was found"));
    assert_eq!(v.severity, Severity::Unknown);
    assert_eq!(v.message, "");
}

#[test]
fn canceled_job_in_definition_is_critical_and_listed_first() {
    let jobs = parse_report(include_str!("fixtures/flattened_four_jobs.txt"));
    let v = aggregate(&jobs);
    assert_eq!(v.severity, Severity::Critical);
    assert_eq!(v.label(), "CRITICAL");
    assert_eq!(v.newest_timestamp, datetime!(2019-11-03 2:09:52));
    assert!(v.message.starts_with("tdhmmd01 - Full Monthly Canceled []"));
    assert_eq!(
        v.message,
        "tdhmmd01 - Full Monthly Canceled []/tdhmmd01 - Duplicate Monthly Unknown-Ok/\
         tdhmmd01 - Full Weekend Succeeded/TDHMMD01-Duplicate Weekend Succeeded"
    );
}

#[test]
fn all_succeeded_is_ok_at_latest_end_time() {
    let jobs = parse_report(include_str!("fixtures/flattened_five_jobs.txt"));
    let v = aggregate(&jobs);
    assert_eq!(v.severity, Severity::Ok);
    assert_eq!(v.newest_timestamp, datetime!(2019-12-03 23:08:15));
    assert!(v.message.ends_with("TDHSAGA07-Diff Daily Succeeded"));
    assert_eq!(v.message.split('/').count(), 5);
}

#[test]
fn error_message_is_bracketed_verbatim() {
    let jobs = parse_report(include_str!("fixtures/single_error.txt"));
    let v = aggregate(&jobs);
    assert_eq!(v.severity, Severity::Critical);
    let expected_err = jobs[0].error_message();
    assert!(!expected_err.is_empty());
    assert_eq!(
        v.message,
        format!("TDHPIC01-Full Weekend Error [{expected_err}]")
    );
}

#[test]
fn critical_surfaces_first_wherever_it_sits() {
    let older_fail = mk_job("b-fail", "Error", datetime!(2020-01-01 1:00));
    let newer_ok = mk_job("a-ok", "Succeeded", datetime!(2020-01-02 1:00));
    let newest_ok = mk_job("c-ok", "Completed", datetime!(2020-01-03 1:00));

    for jobs in [
        vec![older_fail.clone(), newer_ok.clone(), newest_ok.clone()],
        vec![newer_ok.clone(), newest_ok.clone(), older_fail.clone()],
        vec![newest_ok.clone(), older_fail.clone(), newer_ok.clone()],
    ] {
        let v = aggregate(&jobs);
        assert_eq!(v.severity, Severity::Critical);
        assert_eq!(v.newest_timestamp, datetime!(2020-01-01 1:00));
        assert_eq!(v.message, "b-fail Error []/a-ok Succeeded/c-ok Completed");
    }
}

#[test]
fn newest_non_critical_run_wins() {
    let old_warn = mk_job("w", "Queued", datetime!(2020-01-01 1:00));
    let new_ok = mk_job("o", "Succeeded", datetime!(2020-01-02 1:00));
    let v = aggregate(&[new_ok.clone(), old_warn.clone()]);
    assert_eq!(v.severity, Severity::Ok);
    assert_eq!(v.newest_timestamp, datetime!(2020-01-02 1:00));

    let newer_warn = mk_job("w", "OnHold", datetime!(2020-01-03 1:00));
    let v = aggregate(&[new_ok, newer_warn]);
    assert_eq!(v.severity, Severity::Warning);
    assert_eq!(v.message, "o Succeeded/w OnHold");
}

#[test]
fn never_run_inactive_jobs_are_warning() {
    let v = aggregate(&[mk_unrun("a", false), mk_unrun("b", false)]);
    assert_eq!(v.severity, Severity::Warning);
    assert_eq!(v.message, "a Scheduled-Ok/b Scheduled-Ok");
}

#[test]
fn running_job_without_history_is_ok_only_when_nothing_else_decided() {
    let v = aggregate(&[mk_unrun("a", true)]);
    assert_eq!(v.severity, Severity::Ok);
    assert_eq!(v.message, "a Active-Ok");

    let v = aggregate(&[mk_unrun("a", true), mk_unrun("b", false)]);
    assert_eq!(v.severity, Severity::Warning);
}

#[test]
fn unrun_job_does_not_clear_critical() {
    let fail = mk_job("f", "Missed", datetime!(2020-01-01 1:00));
    let v = aggregate(&[mk_unrun("u", false), fail]);
    assert_eq!(v.severity, Severity::Critical);
    assert_eq!(v.message, "f Missed []/u Scheduled-Ok");
}

#[test]
fn input_order_does_not_matter_on_ties() {
    let t = datetime!(2020-05-05 5:05:05);
    let a = mk_job("same", "Succeeded", t);
    let b = mk_job("same", "Error", t);
    let c = mk_job("other", "Queued", t);

    let first = aggregate(&[a.clone(), b.clone(), c.clone()]);
    for jobs in [
        vec![b.clone(), a.clone(), c.clone()],
        vec![c.clone(), b.clone(), a.clone()],
        vec![a.clone(), c.clone(), b.clone()],
    ] {
        assert_eq!(aggregate(&jobs), first);
    }
}
