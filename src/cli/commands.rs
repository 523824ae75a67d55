use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sipoc", about = concat!("[#] sipoc v", env!("CARGO_PKG_VERSION"), " - process diagrams in your terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Project file to open (defaults to sipoc.json in the current directory)
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<PathBuf>,

    /// Board configuration file (TOML)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export the project as pretty-printed JSON
    ExportJson(ExportArgs),
    /// Export all sheets as a semicolon-separated CSV
    ExportCsv(ExportArgs),
    /// Export the active sheet as a plain-text board snapshot
    ExportText(ExportArgs),
    /// Import a project from a JSON file, replacing the current one
    Import(ImportArgs),
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output path (defaults next to the project file)
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file to import
    pub input: PathBuf,
}
