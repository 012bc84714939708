use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// How cell names are canonicalized before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Normalization {
    /// Names are used exactly as typed
    None,
    /// Names are upper-cased, so `a1` and `A1` are the same cell
    Upper,
}

impl Normalization {
    pub fn normalizer(self) -> fn(&str) -> String {
        match self {
            Normalization::None => str::to_string,
            Normalization::Upper => str::to_uppercase,
        }
    }
}

/// Shell configuration, from arguments or environment variables
#[derive(Debug, Clone, Parser)]
#[command(name = "sheetflow", version, about = "Interactive recalculating spreadsheet shell")]
pub struct Config {
    /// Spreadsheet file to open (if it exists) and save to
    #[arg(short, long, env = "SHEETFLOW_FILE")]
    pub file: Option<PathBuf>,

    /// Version tag written to and expected in spreadsheet files
    #[arg(long = "sheet-version", env = "SHEETFLOW_VERSION", default_value = "default")]
    pub sheet_version: String,

    /// Cell name normalization
    #[arg(long, env = "SHEETFLOW_NORMALIZE", value_enum, default_value_t = Normalization::None)]
    pub normalize: Normalization,

    /// Log filter directive, e.g. "sheetflow_core=debug"
    #[arg(long, env = "SHEETFLOW_LOG", default_value = "warn")]
    pub log: String,
}
