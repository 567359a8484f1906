use std::path::PathBuf;

use richmark::config::{ConfigFlags, ThemeMode, load_config_flags, parse_flag_tokens};
use richmark::sync::Mode;

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".richmarkrc");
    let content = r"
# comment
--watch

--theme light

--mode=raw
--log-file=richmark.log
";
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.watch);
    assert_eq!(flags.theme, Some(ThemeMode::Light));
    assert_eq!(flags.mode, Some(Mode::Raw));
    assert_eq!(flags.log_file, Some(PathBuf::from("richmark.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".richmarkrc");
    std::fs::write(&path, "--watch\n--theme light\n--log-file file.log\n").unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args: Vec<String> = ["richmark", "--theme", "dark", "--breaks"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.watch, "file flags should remain enabled");
    assert!(effective.breaks, "cli flags should be applied");
    assert_eq!(effective.theme, Some(ThemeMode::Dark), "cli should override theme");
    assert_eq!(
        effective.log_file,
        Some(PathBuf::from("file.log")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_local_override_layers_on_global() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("config");
    let local = dir.path().join(".richmarkrc");
    std::fs::write(&global, "--mode markdown\n--no-preview\n").unwrap();
    std::fs::write(&local, "--mode visual\n").unwrap();

    let merged = ConfigFlags::default()
        .union(&load_config_flags(&global).unwrap())
        .union(&load_config_flags(&local).unwrap());
    assert_eq!(merged.mode, Some(Mode::Visual));
    assert!(merged.no_preview);
}

#[test]
fn test_missing_config_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("absent")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}
