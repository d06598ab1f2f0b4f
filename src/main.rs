// attackmap - live cyber attack map for the terminal
// Streams attack events from a WebSocket feed and animates them on a world map

mod anim;
mod app;
mod cli;
mod feed;
mod geo;
mod stats;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::{event::handle_key_event, AppState};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use feed::transport::WsConnector;
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::time::Instant;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = cli::Cli::parse();
    if let Err(e) = init_logging(&cli) {
        eprintln!("logging disabled: {:#}", e);
    }
    tracing::info!(endpoint = ?cli.endpoint, "starting attackmap");

    let mut app = AppState::new(cli.app_config(), Box::new(WsConnector::new()));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_app(&mut terminal, &mut app).await;
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "attackmap exited with an error");
        println!("Error: {:?}", err);
    }
    Ok(())
}

/// Send logs to a file; the terminal belongs to the UI
fn init_logging(cli: &cli::Cli) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_file)
        .with_context(|| format!("cannot open log file {}", cli.log_file))?;
    let filter = EnvFilter::try_new(&cli.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
) -> Result<()> {
    let mut keys = EventStream::new();
    let mut interval_ms = app.refresh_config.refresh_ms;
    let mut ticker = tokio::time::interval(app.refresh_config.ui_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    app.start();

    while app.running {
        tokio::select! {
            Some((session, event)) = app.feed.recv() => {
                app.on_transport_event(session, event, Instant::now(), Utc::now());
            }
            input = keys.next() => match input {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    handle_key_event(app, key.code);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => app.shutdown(),
            },
            _ = ticker.tick() => {
                app.on_tick(Instant::now());
                terminal.draw(|f| ui::draw(f, app))?;
            }
        }

        // Pick up frame interval changes from the keyboard
        if app.refresh_config.refresh_ms != interval_ms {
            interval_ms = app.refresh_config.refresh_ms;
            ticker = tokio::time::interval(app.refresh_config.ui_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        }
    }
    Ok(())
}
