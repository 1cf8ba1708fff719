use check_backupexec::{cli, format::render_failure, severity::Severity};
use clap::{error::ErrorKind, Parser};
use tracing::error;

fn main() {
    let args = match cli::Args::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            std::process::exit(Severity::Ok.code());
        }
        Err(err) => {
            let rendered = err.to_string();
            let reason = rendered.lines().next().unwrap_or("invalid arguments");
            print!("{}", render_failure(Severity::Unknown, reason));
            let _ = err.print();
            std::process::exit(Severity::Unknown.code());
        }
    };

    match cli::dispatch(args) {
        Ok(severity) => std::process::exit(severity.code()),
        Err(err) => {
            error!("{:#}", err);
            print!("{}", render_failure(Severity::Unknown, &format!("{err:#}")));
            std::process::exit(Severity::Unknown.code());
        }
    }
}
