use check_backupexec::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../check-backupexec.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.remote.port, 22);
    assert!(!cfg.remote.host.is_empty());
    assert!(cfg.report.normalize_unicode);
    assert_eq!(cfg.logging.level, "warn");
}

#[test]
fn missing_sections_and_keys_take_defaults() {
    let cfg: Config = toml::from_str("[remote]\nhost = \"b1\"\n").expect("parse TOML");
    assert_eq!(cfg.remote.host, "b1");
    assert_eq!(cfg.remote.port, 22);
    assert_eq!(cfg.remote.identity, "~/.ssh/id_rsa");
    assert_eq!(cfg.remote.command_timeout_seconds, 120);
    assert!(!cfg.report.verbose);
    assert!(!cfg.logging.write_to_file);
}
