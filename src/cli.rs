use crate::{
    config::{self, Config},
    format,
    pipeline::{self, Outcome, JobChecker},
    remote::SshRemote,
    severity::Severity,
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_CONFIG: &str = "check-backupexec.toml";

#[derive(Parser, Debug)]
#[command(name = "check-backupexec", version)]
#[command(about = "Check Backup Exec jobs (Icinga/Nagios plugin)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./check-backupexec.toml if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// Connection flags; each one overrides the matching `[remote]` config value.
#[derive(clap::Args, Debug, Default)]
pub struct Connection {
    /// Backup Exec server hostname or IP address
    #[arg(short = 'H', long)]
    pub host: Option<String>,
    #[arg(short = 'u', long)]
    pub username: Option<String>,
    #[arg(short = 'p', long)]
    pub password: Option<String>,
    /// Private key file
    #[arg(short = 'i', long)]
    pub identity: Option<String>,
    #[arg(short = 'P', long)]
    pub port: Option<u16>,
}

impl Connection {
    fn apply(&self, remote: &mut config::Remote) {
        if let Some(v) = &self.host {
            remote.host = v.clone();
        }
        if let Some(v) = &self.username {
            remote.username = v.clone();
        }
        if let Some(v) = &self.password {
            remote.password = v.clone();
        }
        if let Some(v) = &self.identity {
            remote.identity = v.clone();
        }
        if let Some(v) = self.port {
            remote.port = v;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Judge the last run of a job, or of every job in a backup definition.
    GetJob {
        #[command(flatten)]
        conn: Connection,
        /// Print one detail line per job after the status line
        #[arg(short, long)]
        verbose: bool,
        /// Job name is a backup definition
        #[arg(short = 'D', long)]
        backup_definition: bool,
        job_name: String,
    },
    /// Dump server settings; exits OK when the server answers.
    GetSetting {
        #[command(flatten)]
        conn: Connection,
    },
    /// Judge a saved report instead of querying a server.
    Evaluate {
        /// Report file; stdin when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        json: bool,
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Runs the command and returns the state the process should exit with.
///
/// Remote failures are reported as CRITICAL on stdout here; errors returned from this function
/// mean the check itself could not run.
pub fn dispatch(args: Args) -> Result<Severity> {
    let mut cfg = load_config(args.config.as_deref())?;
    let _guard = init_logging(&args, &cfg)?;

    match &args.cmd {
        Command::GetJob {
            conn,
            verbose,
            backup_definition,
            job_name,
        } => {
            conn.apply(&mut cfg.remote);
            let verbose = *verbose || cfg.report.verbose;
            get_job(&cfg, job_name, *backup_definition, verbose)
        }
        Command::GetSetting { conn } => {
            conn.apply(&mut cfg.remote);
            get_setting(&cfg)
        }
        Command::Evaluate {
            input,
            json,
            verbose,
        } => {
            let verbose = *verbose || cfg.report.verbose;
            evaluate(&cfg, input.as_deref(), *json, verbose)
        }
    }
}

fn load_config(user: Option<&Path>) -> Result<Config> {
    if let Some(p) = user {
        return Config::load(p);
    }
    let default = PathBuf::from(DEFAULT_CONFIG);
    if default.exists() {
        Config::load(&default)
    } else {
        Ok(Config::default())
    }
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout is reserved for the plugin output line.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = resolve_log_path(cfg) {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("check-backupexec.log"))
}

fn get_job(cfg: &Config, job_name: &str, backup_definition: bool, verbose: bool) -> Result<Severity> {
    let remote = match SshRemote::new(&cfg.remote) {
        Ok(r) => r,
        Err(err) => return Ok(remote_failure(&err)),
    };
    let checker = JobChecker::new(cfg, remote);

    info!(
        "checking job={job_name:?} backup_definition={backup_definition} host={}",
        cfg.remote.host
    );
    match checker.check_job(job_name, backup_definition) {
        Ok(outcome) => Ok(print_outcome(&outcome, verbose)),
        Err(err) => Ok(remote_failure(&err)),
    }
}

fn get_setting(cfg: &Config) -> Result<Severity> {
    let remote = match SshRemote::new(&cfg.remote) {
        Ok(r) => r,
        Err(err) => return Ok(remote_failure(&err)),
    };
    match JobChecker::new(cfg, remote).server_settings() {
        Ok(settings) => {
            println!("{settings}");
            Ok(Severity::Ok)
        }
        Err(err) => Ok(remote_failure(&err)),
    }
}

fn evaluate(cfg: &Config, input: Option<&Path>, json: bool, verbose: bool) -> Result<Severity> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading report: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .with_context(|| "reading report from stdin")?;
            buf
        }
    };

    let outcome = pipeline::evaluate_report(cfg, &raw);
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        Ok(outcome.verdict.severity)
    } else {
        Ok(print_outcome(&outcome, verbose))
    }
}

fn print_outcome(outcome: &Outcome, verbose: bool) -> Severity {
    let text = if verbose {
        format::render_verbose(&outcome.verdict, &outcome.records)
    } else {
        format::render(&outcome.verdict)
    };
    print!("{text}");
    outcome.verdict.severity
}

fn remote_failure(err: &anyhow::Error) -> Severity {
    error!("{:#}", err);
    print!("{}", format::render_failure(Severity::Critical, &format!("{err:#}")));
    Severity::Critical
}
