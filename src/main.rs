use std::sync::Arc;

use anyhow::Result;

mod app;
mod chat;
mod config;
mod gemini;
mod handler;
mod logging;
mod pages;
mod router;
mod tui;
mod ui;

use app::App;
use config::Config;
use gemini::GeminiClient;
use tui::{EventHandler, Tui};

const START_ROUTE_ENV: &str = "CODINGUNI_ROUTE";

#[tokio::main]
async fn main() -> Result<()> {
    // Logging is best effort; the site works without it.
    if let Err(e) = logging::init() {
        eprintln!("logging disabled: {e:#}");
    }

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load config, using defaults");
        Config::default()
    });
    if !config.has_api_key() {
        tracing::warn!(
            "no Gemini API key configured; set {} or add gemini_api_key to {}",
            config::API_KEY_ENV,
            Config::get_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "the config file".to_string())
        );
    }

    let client = GeminiClient::from_config(&config);
    tracing::info!(client = ?client, "starting");

    let mut app = App::new(Arc::new(client.clone()), client.model());
    if let Ok(path) = std::env::var(START_ROUTE_ENV) {
        if !app.navigate_path(&path) {
            tracing::warn!(%path, "unknown start route, showing home");
        }
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "exiting with error");
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }

    tracing::info!("bye");
    Ok(())
}
