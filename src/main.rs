use clap::Parser;
use sipoc::cli::commands::Cli;
use sipoc::cli::handlers;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None => {
            // No subcommand → launch the TUI editor
            let file = handlers::project_path(cli.file.as_deref());
            let config = handlers::load_config(cli.config.as_deref());
            if let Err(e) = sipoc::tui::run(&file, config) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(_) => {
            if let Err(e) = handlers::dispatch(cli) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
