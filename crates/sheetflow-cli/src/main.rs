mod config;
mod shell;

use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;
use sheetflow_core::Spreadsheet;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::shell::{Command, Outcome, Shell};

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.log))
                .context("invalid log filter")?,
        )
        .with_writer(io::stderr)
        .init();

    let sheet = open_sheet(&config)?;
    let mut shell = Shell::new(sheet, config.file.clone());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read input")?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let result = line
            .parse::<Command>()
            .and_then(|command| shell.execute(command));
        match result {
            Ok(Outcome::Print(text)) => {
                if !text.is_empty() {
                    writeln!(stdout, "{}", text)?;
                }
            }
            Ok(Outcome::Quit) => break,
            Err(e) => eprintln!("error: {}", e),
        }
    }

    if shell.sheet().is_changed() {
        tracing::warn!("exiting with unsaved changes");
    }
    Ok(())
}

fn open_sheet(config: &Config) -> anyhow::Result<Spreadsheet> {
    let normalize = config.normalize.normalizer();

    match &config.file {
        Some(path) if path.exists() => {
            Spreadsheet::load(path, |_| true, normalize, &config.sheet_version)
                .with_context(|| format!("failed to open {}", path.display()))
        }
        _ => Ok(Spreadsheet::with_hooks(
            |_| true,
            normalize,
            config.sheet_version.clone(),
        )),
    }
}
