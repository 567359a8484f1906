//! Saved command-line defaults.
//!
//! Defaults live in a plain file of command-line flags, one or more per line,
//! with `#` comments. A global file is read first, then a `.richmarkrc` in the
//! working directory, then the real command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::sync::Mode;

const APP_DIR: &str = "richmark";
const CONFIG_FILE: &str = "config";
const LOCAL_FILE: &str = ".richmarkrc";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

/// Flags that can be saved as defaults.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub mode: Option<Mode>,
    pub breaks: bool,
    pub no_preview: bool,
    pub watch: bool,
    pub theme: Option<ThemeMode>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Layer `other` on top of `self`. Switches stay on once any layer turns
    /// them on; valued options take the topmost layer that sets them.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            mode: other.mode.or(self.mode),
            breaks: self.breaks || other.breaks,
            no_preview: self.no_preview || other.no_preview,
            watch: self.watch || other.watch,
            theme: other.theme.or(self.theme),
            log_file: other.log_file.as_ref().or(self.log_file.as_ref()).cloned(),
        }
    }

    /// The flags as config file lines.
    fn to_lines(&self) -> Vec<String> {
        let switches = [
            (self.breaks, "--breaks"),
            (self.no_preview, "--no-preview"),
            (self.watch, "--watch"),
        ];
        let mut lines: Vec<String> = switches
            .into_iter()
            .filter_map(|(on, flag)| on.then(|| flag.to_string()))
            .collect();
        if let Some(mode) = self.mode.and_then(value_name) {
            lines.push(format!("--mode {mode}"));
        }
        if let Some(theme) = self.theme.and_then(value_name) {
            lines.push(format!("--theme {theme}"));
        }
        if let Some(log) = &self.log_file {
            lines.push(format!("--log-file {}", log.display()));
        }
        lines
    }

    fn set(&mut self, name: &str, value: &str) {
        match name {
            "--mode" => self.mode = parse_value(value),
            "--theme" => self.theme = parse_value(value),
            "--log-file" => self.log_file = Some(PathBuf::from(value)),
            _ => {}
        }
    }
}

/// Platform directory that holds the global config file, if one can be found.
fn config_dir() -> Option<PathBuf> {
    let env = |name| std::env::var_os(name).map(PathBuf::from);
    if cfg!(target_os = "windows") {
        env("APPDATA")
    } else if cfg!(target_os = "macos") {
        env("HOME").map(|home| home.join("Library").join("Application Support"))
    } else {
        env("XDG_CONFIG_HOME").or_else(|| env("HOME").map(|home| home.join(".config")))
    }
}

/// Location of the global defaults file. Falls back to the local file when no
/// home directory is known.
pub fn global_config_path() -> PathBuf {
    config_dir().map_or_else(local_override_path, |dir| {
        dir.join(APP_DIR).join(CONFIG_FILE)
    })
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_FILE)
}

/// Load flags from `path`. A missing file yields the defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(ConfigFlags::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read config {}", path.display()));
        }
    };
    let tokens: Vec<String> = content
        .lines()
        .map(|line| line.split_once('#').map_or(line, |(kept, _)| kept))
        .flat_map(str::split_whitespace)
        .map(ToOwned::to_owned)
        .collect();
    tracing::debug!(path = %path.display(), ?tokens, "loaded config");
    Ok(parse_flag_tokens(&tokens))
}

/// Write `flags` to `path`, creating parent directories.
///
/// # Errors
/// Returns an error if the directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    let mut body = String::from("# richmark defaults (saved with --save)\n");
    for line in flags.to_lines() {
        body.push_str(&line);
        body.push('\n');
    }
    fs::write(path, body).with_context(|| format!("Failed to write config {}", path.display()))
}

/// Remove the defaults file at `path` if there is one.
///
/// # Errors
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
            Err(err).with_context(|| format!("Failed to remove {}", path.display()))
        }
        _ => Ok(()),
    }
}

/// Pick the known flags out of command-line style tokens. Values may follow
/// the flag or be attached with `=`. Anything else is skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut rest = tokens.iter().map(String::as_str);
    while let Some(token) = rest.next() {
        match token {
            "--breaks" => flags.breaks = true,
            "--no-preview" => flags.no_preview = true,
            "--watch" | "-w" => flags.watch = true,
            "--mode" | "--theme" | "--log-file" => {
                if let Some(value) = rest.next() {
                    flags.set(token, value);
                }
            }
            other => {
                if let Some((name, value)) = other.split_once('=') {
                    flags.set(name, value);
                }
            }
        }
    }
    flags
}

fn value_name<T: ValueEnum>(value: T) -> Option<String> {
    value
        .to_possible_value()
        .map(|possible| possible.get_name().to_string())
}

fn parse_value<T: ValueEnum>(value: &str) -> Option<T> {
    T::from_str(value, true).ok()
}
