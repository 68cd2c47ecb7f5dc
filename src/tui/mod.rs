//! Terminal UI for playing against the opponent service.

mod app;
mod ui;

use crate::config::Config;
use crate::orchestrator::{Orchestrator, SessionView};
use crate::service::HttpOpponentService;
use anyhow::Result;
use app::App;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Runs the interactive game until the user quits.
pub async fn run(config: Config) -> Result<()> {
    // Log to a file so tracing output does not fight the terminal.
    let log_file = std::fs::File::create("ticmytoe.log")?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(service_url = %config.service_url(), "starting ticmytoe");

    let service = Arc::new(HttpOpponentService::new(config.service_url())?);
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = mpsc::unbounded_channel();
    let mut orchestrator = Orchestrator::new(service, command_rx, view_tx);
    let orchestrator_task = tokio::spawn(async move { orchestrator.run().await });

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, App::new(command_tx), view_rx).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Dropping the command sender above ends the orchestrator loop.
    let _ = orchestrator_task.await;

    if let Err(err) = res {
        error!(error = ?err, "TUI loop error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Draw/input loop: drain pending views, draw, then poll the keyboard.
async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    mut views: mpsc::UnboundedReceiver<SessionView>,
) -> Result<()> {
    loop {
        while let Ok(view) = views.try_recv() {
            app.apply_view(view);
        }

        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if app.handle_key(key.code) {
                    info!("user quit");
                    return Ok(());
                }
            }
        }
    }
}
