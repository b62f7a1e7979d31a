use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tasklist_db::Db;
use tasklist_service::{HttpTaskSource, LocalStore, SyncCoordinator, TaskStore};
use tasklist_tui::app::App;
use tasklist_tui::config::{init_logging, Config};
use tracing::info;

const FETCH_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config)?;

    let db_path = config.db_path();
    let db = Db::open(&db_path)
        .with_context(|| format!("failed to open task store at {}", db_path.display()))?;
    let store = LocalStore::new(db);

    // Read once at startup; the coordinator owns the flag from here on.
    let has_fetched = store.has_fetched_tasks()?;
    info!(
        db = %db_path.display(),
        endpoint = %config.endpoint,
        has_fetched,
        "tasklist starting"
    );

    let source = Arc::new(HttpTaskSource::new(&config.endpoint));
    let app = App::new(Box::new(store), source, SyncCoordinator::new(has_fetched));

    run_tui(app)
}

fn run_tui(app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        // Poll while the import is in flight, block on input otherwise
        if app.needs_polling() && !event::poll(FETCH_POLL_INTERVAL)? {
            app.poll_fetch();
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            // Ctrl+C always quits
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            // q quits unless we're in an input mode
            if key.code == KeyCode::Char('q') && !app.is_input_mode() {
                break;
            }
            app.handle_key(key);
        }
        app.poll_fetch();
    }

    info!("tasklist exiting");
    Ok(())
}
