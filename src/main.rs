use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use std::path::{Path, PathBuf};
use traker::cli::{self, Cli, Commands};
use traker::{Config, JsonFile, Profile, TaskStore, logging};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from(&traker::utils::expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };

    let data_file = match cli.file.as_deref() {
        Some(path) => traker::utils::expand_path(path),
        None => config.get_data_file(),
    };

    let log_dir = data_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    logging::init(&log_dir).wrap_err("Failed to open log file")?;
    tracing::info!(file = %data_file.display(), ?profile, "starting traker");

    let mut store = TaskStore::open(JsonFile::new(&data_file))
        .wrap_err_with(|| format!("Failed to open task file {}", data_file.display()))?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let app = traker::tui::App::new(config, store);
            traker::tui::run_event_loop(app)?;
            return Ok(());
        }
        command => {
            cli::run_command(command, &config, &mut store, &mut std::io::stdout(), &mut std::io::stderr())?;
        }
    }

    store
        .flush()
        .map_err(|e| eyre!("Failed to save tasks on exit: {}", e))?;
    Ok(())
}
