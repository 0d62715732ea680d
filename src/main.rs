use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use lifex::app::{App, Command};
use lifex::config::Config;
use lifex::{Catalog, Result};

fn run(config_path: PathBuf) -> Result<()> {
    let config = Config::load(&config_path)?;
    let catalog = Catalog::load(&config.rule_path())?;

    let mut app = App::new(&config, catalog)?;
    app.handle_command(Command::TogglePause)?;

    let delay = Duration::from_millis(config.delay);
    while app.is_running() {
        if app.generation() >= config.generations {
            app.handle_command(Command::Quit)?;
            continue;
        }
        app.tick()?;
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    if let Some(pattern) = app.pattern() {
        log::info!(
            "{} after {} generations: population {}",
            pattern.name(),
            app.generation(),
            app.grid().population()
        );
    }
    print!("{}", app.grid());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match run(config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
