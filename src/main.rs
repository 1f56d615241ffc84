mod api;
mod app;
mod config;
mod theme;
mod ui;
mod view;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::{Backend, HttpBackend};
use app::{App, Popup};
use config::AppConfig;
use theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "reelnote")]
#[command(version)]
#[command(about = "Search a movie catalog and keep reviews per title, in the terminal")]
struct Args {
    /// Backend base URL (overrides the config file)
    #[arg(short, long)]
    backend: Option<String>,

    /// Run one search and print the results as JSON
    #[arg(short, long)]
    search: Option<String>,

    /// Page to request with --search
    #[arg(short, long, default_value_t = 1)]
    page: u32,

    /// Print the reviews stored for a title as JSON
    #[arg(short, long, conflicts_with = "search")]
    reviews: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let one_shot = args.search.is_some() || args.reviews.is_some();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(one_shot)?;

    let config = AppConfig::load().unwrap_or_default();
    let backend_url = args.backend.as_deref().unwrap_or(&config.backend_url);
    let backend = HttpBackend::new(backend_url)?;
    tracing::info!(backend = %backend.base_url(), "Using backend");

    // Handle CLI-only commands
    if let Some(keyword) = args.search {
        return print_search(&backend, &keyword, args.page, &config).await;
    }

    if let Some(title) = args.reviews {
        return print_reviews(&backend, &title).await;
    }

    // Run TUI
    ui::init_theme(Theme::from_config(&config.theme));
    let app = App::new(Arc::new(backend), config.placeholder_poster);
    run_tui(app).await
}

/// Log to stderr for one-shot commands, to a file while the TUI owns the screen
fn init_logging(to_stderr: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if to_stderr {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
        return Ok(None);
    }

    let log_dir = AppConfig::log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::never(&log_dir, "reelnote.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
        .init();
    Ok(Some(guard))
}

async fn print_search(
    backend: &HttpBackend,
    keyword: &str,
    page: u32,
    config: &AppConfig,
) -> Result<()> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        anyhow::bail!("Search keyword must not be empty");
    }
    let page = page.max(1);

    let result = backend
        .search(keyword, page)
        .await
        .map_err(|e| match e.backend_message() {
            Some(message) => anyhow::anyhow!("{}", message),
            None => anyhow::anyhow!("{}: {}", app::SEARCH_FAILED, e),
        })?;

    let results: Vec<_> = result
        .items
        .iter()
        .map(|movie| {
            serde_json::json!({
                "imdbID": movie.id,
                "Title": movie.title,
                "Year": movie.year,
                "Poster": view::poster_url(movie, &config.placeholder_poster),
            })
        })
        .collect();

    let output = serde_json::json!({
        "keyword": keyword,
        "page": page,
        "totalResults": result.total_count,
        "totalPages": view::total_pages(result.total_count),
        "results": results,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn print_reviews(backend: &HttpBackend, title: &str) -> Result<()> {
    let reviews = backend
        .fetch_reviews(title)
        .await
        .with_context(|| format!("{} for {}", app::REVIEWS_FAILED, title))?;

    println!("{}", serde_json::to_string_pretty(&reviews)?);
    Ok(())
}

async fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Apply any responses that arrived since the last frame
        app.tick();

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        KeyCode::Char('q') if app.popup == Popup::None && !app.is_editing() => {
                            return Ok(())
                        }
                        _ => {
                            // Surface errors instead of tearing down the terminal
                            if let Err(e) = app.handle_key(key) {
                                tracing::error!("Key handling failed: {}", e);
                                app.error_message = Some(format!("Error: {}", e));
                            }
                        }
                    }
                }
            }
        }
    }
}
