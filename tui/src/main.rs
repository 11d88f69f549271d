use std::{io, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use task_core::TaskApi;
use task_tui::{logging, App, TsaConfig};

/// Terminal client for the task service.
#[derive(Debug, Parser)]
#[command(name = "tsa", version, about)]
struct Cli {
    /// Task service root, e.g. http://localhost:5000
    #[arg(long)]
    base_url: Option<String>,

    /// Config file to use instead of ./tsa.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = TsaConfig::load(cli.config.as_deref())
        .context("loading configuration")?
        .with_base_url(cli.base_url)?;
    let _guard = logging::init(&config.log)?;
    tracing::info!(base_url = %config.api.base_url, "starting");

    let mut app = App::new(TaskApi::connect(&config.api.base_url));

    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = task_tui::run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.context("running terminal UI")?;
    tracing::info!("exiting");
    Ok(())
}
