mod app;
mod cli;
mod util;

use anyhow::{Result, anyhow};
use clap::Parser;
use log::error;

use resistome_viz::{Config, Session};

use cli::{Cli, Command};

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::from_json_file(path),
        None => Ok(Config::default()),
    }
}

fn run_viewer(config: Config, datasets: &[String]) -> Result<()> {
    let mut session = Session::new(config);

    let mut initial = None;
    for dataset in datasets {
        match session.resolve(dataset) {
            Ok(source) => {
                initial.get_or_insert(source.key);
            }
            Err(error) => error!("{error:#}"),
        }
    }
    let initial = initial.or_else(|| session.sources().first().map(|source| source.key.clone()));

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "resistome-viz",
        options,
        Box::new(move |cc| Ok(Box::new(app::ResistomeApp::new(cc, session, initial)))),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = load_config(&cli)?;
    match cli.command {
        None => run_viewer(config, &cli.datasets),
        Some(Command::View { ref datasets }) => run_viewer(config, datasets),
        Some(Command::Filter(ref args)) => cli::run_filter(&mut Session::new(config), args),
        Some(Command::Options { ref dataset }) => cli::run_options(&mut Session::new(config), dataset),
        Some(Command::Stats(ref args)) => cli::run_stats(&mut Session::new(config), args),
    }
}
