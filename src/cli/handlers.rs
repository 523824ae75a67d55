use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::io::export;
use crate::io::storage::{self, LoadOutcome};
use crate::model::config::{BoardConfig, ConfigOutcome};
use crate::model::project::Project;

pub const DEFAULT_PROJECT_FILE: &str = "sipoc.json";

pub fn project_path(cli_file: Option<&Path>) -> PathBuf {
    cli_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROJECT_FILE))
}

pub fn load_config(cli_config: Option<&Path>) -> BoardConfig {
    match cli_config {
        Some(path) => {
            let (config, outcome) = BoardConfig::load(path);
            if outcome == ConfigOutcome::Malformed {
                eprintln!(
                    "warning: {} could not be parsed, using the default configuration",
                    path.display()
                );
            }
            config
        }
        None => BoardConfig::default(),
    }
}

fn load_project(path: &Path, config: &BoardConfig) -> Result<Project, Box<dyn std::error::Error>> {
    let (project, outcome) = storage::load_or_default(path, config);
    if let LoadOutcome::CorruptFallback = outcome {
        eprintln!(
            "warning: {} could not be parsed, starting from a fresh project",
            path.display()
        );
    }
    Ok(project)
}

/// Output path for an export: explicit if given, otherwise the project
/// file with a new extension.
fn export_path(project_file: &Path, explicit: Option<PathBuf>, ext: &str) -> PathBuf {
    explicit.unwrap_or_else(|| project_file.with_extension(ext))
}

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let file = project_path(cli.file.as_deref());
    let config = load_config(cli.config.as_deref());

    match cli.command {
        // No subcommand launches the TUI; main handles that before dispatch
        None => Ok(()),
        Some(Commands::ExportJson(args)) => {
            let project = load_project(&file, &config)?;
            let out = export_path(&file, args.output, "export.json");
            export::write_json(&out, &project)?;
            println!("exported JSON to {}", out.display());
            Ok(())
        }
        Some(Commands::ExportCsv(args)) => {
            let project = load_project(&file, &config)?;
            let out = export_path(&file, args.output, "csv");
            export::write_csv(&out, &project)?;
            println!("exported CSV to {}", out.display());
            Ok(())
        }
        Some(Commands::ExportText(args)) => {
            let project = load_project(&file, &config)?;
            let out = export_path(&file, args.output, "txt");
            export::write_text_snapshot(&out, &project, &config)?;
            println!("exported snapshot to {}", out.display());
            Ok(())
        }
        Some(Commands::Import(args)) => {
            let mut project = export::read_project_file(&args.input, &config)?;
            storage::save(&file, &mut project)?;
            println!(
                "imported {} sheet(s) from {} into {}",
                project.sheets.len(),
                args.input.display(),
                file.display()
            );
            Ok(())
        }
    }
}
