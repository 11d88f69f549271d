//! Terminal front end for the task service.
//!
//! Two views share one [`App`](app::App): a dashboard of server-computed
//! statistics and a filterable task list with create, status change and
//! delete. All network I/O goes through a [`task_core::TaskApi`], so the
//! whole view layer can be driven by any [`task_core::Transport`].

pub mod app;
pub mod config;
pub mod logging;
pub mod ui;

use std::io;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::Backend, Terminal};
use task_core::Transport;

pub use app::{App, CreateForm, FormField, Modal, StatusFilter, View};
pub use config::{ConfigError, TsaConfig};

/// Drive the UI until the user quits.
///
/// The first frame is drawn in the loading state, then tasks and stats are
/// fetched before input is read.
pub fn run<B: Backend, T: Transport>(terminal: &mut Terminal<B>, app: &mut App<T>) -> io::Result<()> {
    terminal.draw(|frame| ui::draw(frame, app))?;
    app.refresh();

    while !app.should_quit {
        terminal.draw(|frame| ui::draw(frame, app))?;
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.on_key(key);
            }
        }
    }
    Ok(())
}
