use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home);
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

/// NFKC-folds the report so non-breaking spaces and similar code points read as plain text,
/// and turns CRLF into LF.
pub fn normalize_report(raw: &str) -> String {
    raw.replace("\r\n", "\n").nfkc().collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_nbsp_and_crlf() {
        let raw = "Name\u{00A0}: job\r\nJobType : Backup";
        assert_eq!(normalize_report(raw), "Name : job\nJobType : Backup");
    }

    #[test]
    fn expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde("/etc/key"), PathBuf::from("/etc/key"));
    }
}
