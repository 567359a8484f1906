//! Richmark - A terminal rich-text editor with synchronized visual, source
//! and markdown modes.
//!
//! # Usage
//!
//! ```bash
//! richmark flyer.html
//! richmark --mode markdown --watch flyer.html
//! richmark --breaks --save
//! ```

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use richmark::app::App;
use richmark::config::{
    ConfigFlags, ThemeMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use richmark::highlight::{Background, set_background_mode};
use richmark::sync::Mode;

/// A terminal rich-text editor with visual, source and markdown modes
#[derive(Parser, Debug)]
#[command(name = "richmark", version, about, long_about = None)]
struct Cli {
    /// Markup file to edit; the built-in sample is opened when omitted
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Mode to start in
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Treat single newlines in markdown as line breaks
    #[arg(long)]
    breaks: bool,

    /// Start with the preview / raw output pane hidden
    #[arg(long)]
    no_preview: bool,

    /// Watch the file for changes and apply them as external edits
    #[arg(short, long)]
    watch: bool,

    /// Force syntax highlight theme background (light or dark)
    #[arg(long, value_enum, default_value = "auto")]
    theme: ThemeMode,

    /// Write debug logs to a file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults in the global config
    #[arg(long)]
    save: bool,

    /// Clear saved defaults in the global config
    #[arg(long)]
    clear: bool,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive(tracing::Level::WARN.into()),
            )
            .init();
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("richmark=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_deref())?;
    tracing::debug!(?effective, "effective flags");

    match effective.theme.unwrap_or(ThemeMode::Auto) {
        ThemeMode::Auto => set_background_mode(None),
        ThemeMode::Light => set_background_mode(Some(Background::Light)),
        ThemeMode::Dark => set_background_mode(Some(Background::Dark)),
    }

    if let Some(file) = &cli.file
        && !file.exists()
    {
        anyhow::bail!("File not found: {}", file.display());
    }

    let mut app = App::new(cli.file)
        .with_mode(effective.mode.unwrap_or(Mode::Visual))
        .with_line_breaks(effective.breaks)
        .with_preview_visible(!effective.no_preview)
        .with_watch(effective.watch);

    app.run().context("Application error")
}
