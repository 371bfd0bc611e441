use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

mod app;
mod config;
mod dashboard;
mod error;
mod models;
mod services;
mod tui;

use app::App;
use config::Config;
use dashboard::Dashboard;
use error::Result;
use models::{platform_label, StatusFilter};
use services::DraftsClient;
use tui::{draw, handle_key_event};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Load configuration
    let config = Config::load()?;
    config.validate()?;

    // --list [status]: print the first page and exit
    if args.len() >= 2 && args[1] == "--list" {
        let status = match args.get(2) {
            Some(s) => StatusFilter::from_param(s)
                .ok_or_else(|| anyhow::anyhow!("unknown status filter '{}'", s))?,
            None => StatusFilter::All,
        };
        return list_headless(&config, status).await;
    }

    // --integrations: print platform connection status and exit
    if args.len() >= 2 && args[1] == "--integrations" {
        return integrations_headless(&config).await;
    }

    // Initialize app
    let mut app = App::new(&config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        // Debounce timers, fetch dispatch, finished background work
        app.tick(Instant::now());

        terminal.draw(|frame| draw(frame, app))?;

        // Short poll keeps the debounce and row reveal responsive
        if event::poll(Duration::from_millis(40))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = handle_key_event(key, &app.mode) {
                        let should_quit = app.handle_action(action, Instant::now())?;
                        if should_quit {
                            return Ok(());
                        }
                    }
                }
            }
        }

        // Let spawned requests make progress between frames
        tokio::task::yield_now().await;
    }
}

async fn list_headless(config: &Config, status: StatusFilter) -> Result<()> {
    let client = Arc::new(DraftsClient::new(config)?);
    let mut dashboard = Dashboard::new(client, config.search_debounce());
    dashboard.set_status(status);
    dashboard.tick(Instant::now());
    dashboard.settle_fetch().await;

    if let Some(e) = &dashboard.fetch_error {
        return Err(anyhow::anyhow!("failed to load drafts: {}", e).into());
    }

    for draft in dashboard.items() {
        println!(
            "{}\t{:<10}\t{}\t{}",
            draft.id,
            draft.status.label(),
            draft.topic(),
            draft.subject.as_deref().unwrap_or("")
        );
    }

    let stats = dashboard.stats();
    println!(
        "{} drafts ({} pages) | {} generated, {} sent, {} failed",
        dashboard.total(),
        dashboard.total_pages(),
        stats.generated,
        stats.sent,
        stats.failed
    );
    Ok(())
}

async fn integrations_headless(config: &Config) -> Result<()> {
    let client = DraftsClient::new(config)?;
    let status = client.connection_status().await?;

    for (id, conn) in &status {
        println!(
            "{:<16} {:<20} {}",
            platform_label(id),
            conn.health().label(),
            conn.email.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
