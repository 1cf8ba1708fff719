pub mod command;
pub mod ssh;

use anyhow::Result;

pub use command::{job_status_query, powershell_quote, setting_query};
pub use ssh::SshRemote;

/// Something that can run a BEMCLI command on the backup server and hand back its stdout.
pub trait Remote {
    fn run(&self, command: &str) -> Result<String>;
}
