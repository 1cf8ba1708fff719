use super::Remote;
use crate::{config, util::expand_tilde};
use anyhow::{anyhow, bail, Context, Result};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Runs commands through the system OpenSSH client, via `sshpass` when a password is set.
pub struct SshRemote {
    cfg: config::Remote,
    identity: Option<PathBuf>,
}

impl SshRemote {
    pub fn new(cfg: &config::Remote) -> Result<Self> {
        if cfg.host.trim().is_empty() {
            bail!("no remote host configured");
        }
        if cfg.username.trim().is_empty() {
            bail!("no remote username configured");
        }

        let identity = if cfg.identity.trim().is_empty() {
            None
        } else {
            let path = expand_tilde(cfg.identity.trim());
            if path.exists() {
                Some(path)
            } else {
                if cfg.password.is_empty() {
                    warn!("identity file not found and no password set: {}", path.display());
                }
                None
            }
        };

        Ok(Self {
            cfg: cfg.clone(),
            identity,
        })
    }

    fn command(&self, remote_command: &str) -> Command {
        let mut cmd = if self.cfg.password.is_empty() {
            Command::new(&self.cfg.ssh_exe)
        } else {
            let mut c = Command::new(&self.cfg.sshpass_exe);
            c.arg("-e").arg(&self.cfg.ssh_exe);
            c.env("SSHPASS", &self.cfg.password);
            c
        };

        cmd.arg("-T");
        cmd.arg("-p").arg(self.cfg.port.to_string());
        cmd.arg("-l").arg(&self.cfg.username);
        cmd.arg("-o")
            .arg(format!("ConnectTimeout={}", self.cfg.connect_timeout_seconds));
        if self.cfg.strict_host_key_checking {
            cmd.arg("-o").arg("StrictHostKeyChecking=yes");
        } else {
            cmd.arg("-o").arg("StrictHostKeyChecking=no");
            cmd.arg("-o").arg("UserKnownHostsFile=/dev/null");
        }
        if self.cfg.password.is_empty() {
            cmd.arg("-o").arg("BatchMode=yes");
        }
        if let Some(identity) = &self.identity {
            cmd.arg("-i").arg(identity);
        }
        cmd.arg(&self.cfg.host);
        cmd.arg(remote_command);

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }
}

impl Remote for SshRemote {
    fn run(&self, command: &str) -> Result<String> {
        debug!(
            "ssh {}@{}:{} timeout={}s",
            self.cfg.username, self.cfg.host, self.cfg.port, self.cfg.command_timeout_seconds
        );
        let mut child = self
            .command(command)
            .spawn()
            .with_context(|| format!("spawning ssh client for {}", self.cfg.host))?;

        let output = if self.cfg.command_timeout_seconds > 0 {
            wait_with_timeout(
                &mut child,
                Duration::from_secs(self.cfg.command_timeout_seconds),
            )?
        } else {
            child.wait_with_output().with_context(|| "waiting for ssh")?
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(anyhow!(
                "remote command failed on {} ({}): {}",
                self.cfg.host,
                output.status,
                stderr.trim()
            ));
        }
        if !stderr.trim().is_empty() {
            debug!("ssh stderr: {}", stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Output> {
    // Drain both pipes while polling so a large report cannot block the child on a full buffer.
    let stdout_reader = child.stdout.take();
    let stderr_reader = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_reader {
            out.read_to_end(&mut buf).with_context(|| "read stdout")?;
        }
        Ok(buf)
    });

    let stderr_thread = std::thread::spawn(move || -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_reader {
            err.read_to_end(&mut buf).with_context(|| "read stderr")?;
        }
        Ok(buf)
    });

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().with_context(|| "try_wait")? {
            let stdout = stdout_thread
                .join()
                .map_err(|_| anyhow!("stdout reader thread panicked"))??;
            let stderr = stderr_thread
                .join()
                .map_err(|_| anyhow!("stderr reader thread panicked"))??;
            return Ok(Output {
                status,
                stdout,
                stderr,
            });
        }

        if start.elapsed() > timeout {
            warn!("ssh command timed out after {:?}", timeout);
            let _ = child.kill();
            child.wait().with_context(|| "wait after kill")?;
            let stderr = stderr_thread
                .join()
                .map_err(|_| anyhow!("stderr reader thread panicked"))??;
            return Err(anyhow!(
                "remote command exceeded timeout ({:?}); stderr: {}",
                timeout,
                String::from_utf8_lossy(&stderr).trim()
            ));
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}
