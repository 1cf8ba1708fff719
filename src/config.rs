use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: Remote,
    #[serde(default)]
    pub report: Report,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Remote {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Empty means key authentication only.
    pub password: String,
    pub identity: String,
    pub ssh_exe: String,
    pub sshpass_exe: String,
    pub connect_timeout_seconds: u64,
    pub command_timeout_seconds: u64,
    pub strict_host_key_checking: bool,
}
impl Default for Remote {
    fn default() -> Self {
        Self {
            host: "".into(),
            port: 22,
            username: "".into(),
            password: "".into(),
            identity: "~/.ssh/id_rsa".into(),
            ssh_exe: "ssh".into(),
            sshpass_exe: "sshpass".into(),
            connect_timeout_seconds: 10,
            command_timeout_seconds: 120,
            strict_host_key_checking: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub normalize_unicode: bool,
    pub verbose: bool,
}
impl Default for Report {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
