use imgsort::cli::Args;
use imgsort::config::SorterConfig;
use imgsort::error::{Result, SorterError};
use imgsort::preview::ImageCache;
use imgsort::session::{Intent, IntentOutcome, TriageSession};
use imgsort::tui::{
    handle_key_event, render, render_help_overlay, render_summary, DisplaySizes, KeyAction,
    KeyBindings, Screen, StatusMessage, ViewState,
};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use std::{io, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse_args();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    if let Some(log_file) = &args.log_file {
        init_logging(log_file)?;
    }

    // Stored settings, overridden by flags
    let config_path = args.config_path()?;
    let mut config = SorterConfig::load_from(&config_path)?;
    args.apply_to(&mut config);

    let settings = config.validate(args.order.into(), args.dry_run)?;

    if args.should_save() {
        config.save_to(&config_path)?;
        info!("Saved settings to {}", config_path.display());
    }

    let session = match TriageSession::initialize(settings) {
        Ok(session) => session,
        Err(SorterError::EmptyQueue(folder)) => {
            println!("No images found in directory: {}", folder.display());
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    info!(
        "Sorting {} images from {}",
        session.queue().len(),
        session.queue().folder().display()
    );

    if session.is_dry_run() {
        println!("[DRY RUN] No files will be moved");
        println!("   Found {} images to sort", session.queue().len());
    }

    run_app(session, &config)
}

/// Sends log records to `path`; nothing is logged without it since the TUI owns the terminal
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_env("IMGSORT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(())
}

/// Runs the TUI until the user quits, restoring the terminal either way
fn run_app(mut session: TriageSession, config: &SorterConfig) -> Result<()> {
    let bindings = KeyBindings::new(session.categories());
    let sizes = DisplaySizes::from(config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut session, &bindings, sizes);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let stats = session.statistics();
    info!("Session ended: {}/{} sorted", stats.sorted, stats.total_images);

    if session.is_dry_run() {
        println!("\n[DRY RUN] Complete");
        for (category, count) in &stats.per_category {
            println!("   Would have moved to {}: {} images", category, count);
        }
    }

    result
}

/// Main application loop
fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    session: &mut TriageSession,
    bindings: &KeyBindings,
    sizes: DisplaySizes,
) -> Result<()> {
    let mut cache = ImageCache::new();
    let mut status: Option<StatusMessage> = None;
    let mut view_state = if session.is_complete() {
        ViewState::Summary
    } else {
        ViewState::Sorting
    };

    loop {
        terminal.draw(|frame| {
            let screen = Screen {
                session: &*session,
                bindings,
                sizes,
                status: status.as_ref(),
            };
            render(frame, &screen, &mut cache);

            match view_state {
                ViewState::Help => render_help_overlay(frame, bindings),
                ViewState::Summary => render_summary(frame, &session.statistics()),
                ViewState::Sorting => {}
            }
        })?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            _ => continue,
        };

        let action = handle_key_event(key, bindings);

        match view_state {
            ViewState::Help => {
                if matches!(action, KeyAction::Help | KeyAction::Quit | KeyAction::None) {
                    view_state = ViewState::Sorting;
                }
                continue;
            }
            ViewState::Summary => {
                // Undo reopens the last image, any other key exits
                match action {
                    KeyAction::Intent(intent @ Intent::Undo) => {
                        dispatch(session, &intent, &mut cache, &mut status);
                        if !session.is_complete() {
                            view_state = ViewState::Sorting;
                        }
                        continue;
                    }
                    _ => break,
                }
            }
            ViewState::Sorting => {}
        }

        match action {
            KeyAction::Quit => break,
            KeyAction::Help => view_state = ViewState::Help,
            KeyAction::Intent(intent) => {
                dispatch(session, &intent, &mut cache, &mut status);
                if session.is_complete() {
                    view_state = ViewState::Summary;
                }
            }
            KeyAction::None => {}
        }
    }

    Ok(())
}

/// Hands an intent to the session and turns the result into a status line
fn dispatch(
    session: &mut TriageSession,
    intent: &Intent,
    cache: &mut ImageCache,
    status: &mut Option<StatusMessage>,
) {
    match session.handle_intent(intent) {
        Ok(outcome) => {
            if let IntentOutcome::Moved(record) | IntentOutcome::Undone(record) = &outcome {
                cache.invalidate(&record.source_path);
                cache.invalidate(&record.destination_path);
            }
            *status = Some(StatusMessage::from_outcome(&outcome));
        }
        Err(e) => {
            warn!("{:?} failed: {}", intent, e);
            *status = Some(StatusMessage::from_error(&e));
        }
    }
}
