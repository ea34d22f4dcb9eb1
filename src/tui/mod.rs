// TUI module for rendering the terminal interface
pub mod colors;
pub mod input;

// Re-exports
pub use colors::*;
pub use input::{handle_key_event, KeyAction, KeyBindings};

use crate::config::SorterConfig;
use crate::error::SorterError;
use crate::preview::{ImageCache, RenderBounds};
use crate::session::{DisplayState, IntentOutcome, SessionStatistics, TriageSession};
use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};
use std::path::Path;

/// UI view state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Main sorting view
    Sorting,
    /// Help overlay visible
    Help,
    /// Summary shown once every image is sorted
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

/// One-line message shown under the controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn from_outcome(outcome: &IntentOutcome) -> Self {
        match outcome {
            IntentOutcome::Moved(record) => Self::new(
                StatusKind::Success,
                format!(
                    "Moved {} to {} at {}",
                    record.file_name(),
                    record.category,
                    record.moved_at.with_timezone(&Local).format("%H:%M:%S")
                ),
            ),
            IntentOutcome::Undone(record) => Self::new(
                StatusKind::Info,
                format!("Restored {} from {}", record.file_name(), record.category),
            ),
            IntentOutcome::NothingToUndo => Self::new(StatusKind::Warning, "Nothing to undo"),
            IntentOutcome::UndoTargetMissing(path) => Self::new(
                StatusKind::Warning,
                format!("Cannot undo: {} is no longer there", path.display()),
            ),
            IntentOutcome::AlreadyComplete => {
                Self::new(StatusKind::Info, "All images have been sorted")
            }
            IntentOutcome::UnknownCategory(label) => {
                Self::new(StatusKind::Warning, format!("Unknown category: {}", label))
            }
        }
    }

    pub fn from_error(err: &SorterError) -> Self {
        Self::new(StatusKind::Error, err.to_string())
    }

    fn color(&self) -> ratatui::style::Color {
        match self.kind {
            StatusKind::Info => TEXT_PRIMARY,
            StatusKind::Success => ACCENT_SECONDARY,
            StatusKind::Warning => ACCENT_WARNING,
            StatusKind::Error => ACCENT_PRIMARY,
        }
    }
}

/// Pixel bounds for the two panes, taken from the settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySizes {
    pub image_width: u32,
    pub image_height: u32,
    pub preview_width: u32,
    pub preview_height: u32,
}

impl From<&SorterConfig> for DisplaySizes {
    fn from(config: &SorterConfig) -> Self {
        Self {
            image_width: config.image_width,
            image_height: config.image_height,
            preview_width: config.preview_width,
            preview_height: config.preview_height,
        }
    }
}

/// Everything a frame is drawn from
pub struct Screen<'a> {
    pub session: &'a TriageSession,
    pub bindings: &'a KeyBindings,
    pub sizes: DisplaySizes,
    pub status: Option<&'a StatusMessage>,
}

/// Renders the main sorting view
pub fn render(frame: &mut Frame, screen: &Screen, cache: &mut ImageCache) {
    let display = screen.session.display_state();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header with progress
            Constraint::Min(0),    // Image and preview
            Constraint::Length(4), // Controls and status
        ])
        .split(frame.area());

    render_header(
        frame,
        chunks[0],
        &display,
        screen.session.queue().remaining(),
        screen.session.is_dry_run(),
    );
    render_body(frame, chunks[1], screen, &display, cache);
    render_footer(frame, chunks[2], screen.bindings, screen.status);
}

/// Renders the header with title and progress bar
fn render_header(
    frame: &mut Frame,
    area: Rect,
    display: &DisplayState,
    remaining: usize,
    dry_run: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let mut title = vec![Span::styled(
        format!(" {} ", display.title),
        Style::default()
            .fg(ACCENT_HIGHLIGHT)
            .add_modifier(Modifier::BOLD),
    )];
    if dry_run {
        title.push(Span::styled(
            "[DRY RUN]",
            Style::default().fg(ACCENT_WARNING),
        ));
    }

    let header = Paragraph::new(Line::from(title)).block(
        Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_COLOR)),
    );
    frame.render_widget(header, chunks[0]);

    let (sorted, total) = display.position;
    let progress = if total > 0 {
        sorted as f64 / total as f64
    } else {
        0.0
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .gauge_style(Style::default().fg(ACCENT_SECONDARY).bg(BG_DARK))
        .ratio(progress)
        .label(format!(
            "{}% ({}/{}, {} left)",
            (progress * 100.0) as u16,
            sorted,
            total,
            remaining
        ));

    frame.render_widget(gauge, chunks[1]);
}

fn render_body(
    frame: &mut Frame,
    area: Rect,
    screen: &Screen,
    display: &DisplayState,
    cache: &mut ImageCache,
) {
    let image_path = match &display.current_image {
        Some(path) => path,
        None => {
            frame.render_widget(render_complete_widget(), area);
            return;
        }
    };

    let panes = if screen.session.previews_hidden() {
        vec![area]
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area)
            .to_vec()
    };

    let name = image_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    render_image_pane(
        frame,
        panes[0],
        &name,
        image_path,
        (screen.sizes.image_width, screen.sizes.image_height),
        cache,
    );

    if let Some(preview_area) = panes.get(1) {
        render_preview_pane(frame, *preview_area, display, screen.sizes, cache);
    }
}

fn pane_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(format!(" {} ", title))
}

fn render_image_pane(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    path: &Path,
    max_px: (u32, u32),
    cache: &mut ImageCache,
) {
    let block = pane_block(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    render_image_into(frame, inner, path, max_px, cache);
}

fn render_image_into(
    frame: &mut Frame,
    area: Rect,
    path: &Path,
    max_px: (u32, u32),
    cache: &mut ImageCache,
) {
    let bounds = RenderBounds {
        max_width_px: max_px.0,
        max_height_px: max_px.1,
        columns: area.width,
        rows: area.height,
    };

    let paragraph = match cache.get_or_render(path, bounds) {
        Ok(lines) => Paragraph::new(lines.clone()).alignment(Alignment::Center),
        Err(e) => Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  [!] Could not display image",
                Style::default()
                    .fg(ACCENT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("  {}", e)),
            Line::from(format!("  Path: {}", path.display())),
        ])
        .style(Style::default().fg(TEXT_PRIMARY))
        .wrap(Wrap { trim: false }),
    };

    frame.render_widget(paragraph, area);
}

fn render_preview_pane(
    frame: &mut Frame,
    area: Rect,
    display: &DisplayState,
    sizes: DisplaySizes,
    cache: &mut ImageCache,
) {
    let block = pane_block("Preview");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let caption = display.preview_caption.clone().unwrap_or_default();
    let caption_widget = Paragraph::new(Span::styled(
        caption,
        Style::default()
            .fg(TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    frame.render_widget(caption_widget, chunks[0]);

    match &display.preview_path {
        Some(path) => render_image_into(
            frame,
            chunks[1],
            path,
            (sizes.preview_width, sizes.preview_height),
            cache,
        ),
        None if display.preview_placeholder => {
            let blank = Block::default().style(Style::default().bg(BG_PLACEHOLDER));
            frame.render_widget(blank, chunks[1]);
        }
        None => {}
    }
}

/// Shown in the body once the queue is exhausted
fn render_complete_widget() -> Paragraph<'static> {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Sorting Complete",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "All images have been sorted.",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    Paragraph::new(lines)
        .block(pane_block("Done"))
        .alignment(Alignment::Center)
}

/// Renders the category keys and the status line
fn render_footer(
    frame: &mut Frame,
    area: Rect,
    bindings: &KeyBindings,
    status: Option<&StatusMessage>,
) {
    let mut controls = Vec::new();
    for (key, label) in bindings.category_keys() {
        controls.push(Span::styled(
            format!(" {} ", key),
            Style::default()
                .fg(ACCENT_SECONDARY)
                .add_modifier(Modifier::BOLD),
        ));
        controls.push(Span::styled(label, Style::default().fg(TEXT_SECONDARY)));
        controls.push(Span::raw("  │ "));
    }
    controls.extend([
        Span::styled("z ", Style::default().fg(ACCENT_HIGHLIGHT)),
        Span::styled("Undo", Style::default().fg(TEXT_SECONDARY)),
        Span::raw("  │  "),
        Span::styled("? ", Style::default().fg(TEXT_SECONDARY)),
        Span::styled("Help", Style::default().fg(TEXT_SECONDARY)),
        Span::raw("  │  "),
        Span::styled("q ", Style::default().fg(TEXT_SECONDARY)),
        Span::styled("Quit", Style::default().fg(TEXT_SECONDARY)),
    ]);

    let status_line = match status {
        Some(message) => Line::from(Span::styled(
            message.text.clone(),
            Style::default().fg(message.color()),
        )),
        None => Line::from(""),
    };

    let footer = Paragraph::new(vec![Line::from(controls), status_line])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, area);
}

/// Renders the help overlay
pub fn render_help_overlay(frame: &mut Frame, bindings: &KeyBindings) {
    let help_area = centered_rect(50, 70, frame.area());
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (key, label) in bindings.category_keys() {
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", key), Style::default().fg(ACCENT_SECONDARY)),
            Span::raw(format!("     Move to {}", label)),
        ]));
    }

    lines.extend([
        Line::from(""),
        Line::from(vec![
            Span::styled("  z ", Style::default().fg(ACCENT_HIGHLIGHT)),
            Span::raw("or "),
            Span::styled("Ctrl+Z", Style::default().fg(ACCENT_HIGHLIGHT)),
            Span::raw("  Undo last move"),
        ]),
        Line::from(vec![
            Span::styled("  q ", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("or "),
            Span::styled("Esc", Style::default().fg(TEXT_SECONDARY)),
            Span::raw("     Quit"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ]);

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_PRIMARY));

    frame.render_widget(paragraph, inner);
}

/// Renders the summary screen once every image is sorted
pub fn render_summary(frame: &mut Frame, stats: &SessionStatistics) {
    let summary_area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, summary_area);

    let block = Block::default()
        .title(" Sorting Complete ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(summary_area);
    frame.render_widget(block, summary_area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Summary",
            Style::default()
                .fg(TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Images sorted:  "),
            Span::styled(
                format!("{}/{}", stats.sorted, stats.total_images),
                Style::default()
                    .fg(ACCENT_HIGHLIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];

    for (category, count) in &stats.per_category {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", category), Style::default().fg(TEXT_SECONDARY)),
            Span::styled(
                count.to_string(),
                Style::default().fg(ACCENT_SECONDARY),
            ),
        ]));
    }

    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "Press z to undo the last move, any other key to exit",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ]);

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_PRIMARY))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, inner);
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QueueOrder, SubstitutionRules};
    use crate::session::{Intent, SessionSettings};
    use ratatui::{backend::TestBackend, Terminal};
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const SIZES: DisplaySizes = DisplaySizes {
        image_width: 600,
        image_height: 800,
        preview_width: 300,
        preview_height: 400,
    };

    fn write_png(path: &Path) {
        let img = image::RgbImage::from_fn(8, 8, |_, _| image::Rgb([200, 50, 50]));
        img.save(path).unwrap();
    }

    fn session(temp: &TempDir, names: &[&str], hide_preview: bool) -> TriageSession {
        let images = temp.path().join("images");
        let previews = temp.path().join("previews");
        fs::create_dir_all(&images).unwrap();
        fs::create_dir_all(&previews).unwrap();
        for name in names {
            write_png(&images.join(name));
        }

        TriageSession::initialize(SessionSettings {
            image_folder: images,
            preview_folder: if hide_preview { None } else { Some(previews) },
            sorted_folder: temp.path().join("sorted"),
            categories: vec!["Good".to_string(), "Bad".to_string()],
            rules: SubstitutionRules::default(),
            order: QueueOrder::Name,
            dry_run: false,
        })
        .unwrap()
    }

    fn draw<F: FnOnce(&mut Frame)>(width: u16, height: u16, f: F) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(f).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    mod status_tests {
        use super::*;
        use crate::domain::MoveRecord;
        use chrono::Utc;

        fn record() -> MoveRecord {
            MoveRecord {
                source_path: PathBuf::from("/images/a.png"),
                destination_path: PathBuf::from("/sorted/Good/a.png"),
                category: "Good".to_string(),
                moved_at: Utc::now(),
            }
        }

        #[test]
        fn test_status_for_moved() {
            let status = StatusMessage::from_outcome(&IntentOutcome::Moved(record()));
            assert_eq!(status.kind, StatusKind::Success);
            assert!(status.text.starts_with("Moved a.png to Good at "));
        }

        #[test]
        fn test_status_for_undo_conditions() {
            let restored = StatusMessage::from_outcome(&IntentOutcome::Undone(record()));
            assert_eq!(restored.text, "Restored a.png from Good");

            let nothing = StatusMessage::from_outcome(&IntentOutcome::NothingToUndo);
            assert_eq!(nothing.kind, StatusKind::Warning);
            assert_eq!(nothing.text, "Nothing to undo");

            let missing = StatusMessage::from_outcome(&IntentOutcome::UndoTargetMissing(
                PathBuf::from("/sorted/Good/a.png"),
            ));
            assert_eq!(missing.kind, StatusKind::Warning);
            assert!(missing.text.contains("no longer there"));
        }

        #[test]
        fn test_status_for_error() {
            let err = SorterError::FileSystem(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "denied",
            ));
            let status = StatusMessage::from_error(&err);
            assert_eq!(status.kind, StatusKind::Error);
            assert!(status.text.contains("denied"));
        }
    }

    mod layout_tests {
        use super::*;

        #[test]
        fn test_render_shows_title_and_categories() {
            let temp = TempDir::new().unwrap();
            let session = session(&temp, &["a.png", "b.png"], false);
            let bindings = KeyBindings::new(session.categories());
            let mut cache = ImageCache::new();
            let screen = Screen {
                session: &session,
                bindings: &bindings,
                sizes: SIZES,
                status: None,
            };

            let content = draw(100, 30, |frame| render(frame, &screen, &mut cache));

            assert!(content.contains("Image Sorter - a.png (1/2)"));
            assert!(content.contains("Good"));
            assert!(content.contains("Bad"));
            assert!(content.contains("Undo"));
            assert!(content.contains("No Preview Available"));
        }

        #[test]
        fn test_render_hidden_preview() {
            let temp = TempDir::new().unwrap();
            let session = session(&temp, &["a.png"], true);
            let bindings = KeyBindings::new(session.categories());
            let mut cache = ImageCache::new();
            let screen = Screen {
                session: &session,
                bindings: &bindings,
                sizes: SIZES,
                status: None,
            };

            let content = draw(100, 30, |frame| render(frame, &screen, &mut cache));

            assert!(!content.contains("Preview"));
            assert!(!content.contains("No Preview Available"));
        }

        #[test]
        fn test_render_status_and_progress() {
            let temp = TempDir::new().unwrap();
            let mut session = session(&temp, &["a.png", "b.png"], false);
            let outcome = session
                .handle_intent(&Intent::MoveToCategory("Good".to_string()))
                .unwrap();
            let status = StatusMessage::from_outcome(&outcome);
            let bindings = KeyBindings::new(session.categories());
            let mut cache = ImageCache::new();
            let screen = Screen {
                session: &session,
                bindings: &bindings,
                sizes: SIZES,
                status: Some(&status),
            };

            let content = draw(100, 30, |frame| render(frame, &screen, &mut cache));

            assert!(content.contains("Image Sorter - b.png (2/2)"));
            assert!(content.contains("50% (1/2, 1 left)"));
            assert!(content.contains("Moved a.png to Good"));
        }

        #[test]
        fn test_render_complete() {
            let temp = TempDir::new().unwrap();
            let mut session = session(&temp, &["a.png"], false);
            session
                .handle_intent(&Intent::MoveToCategory("Bad".to_string()))
                .unwrap();
            let bindings = KeyBindings::new(session.categories());
            let mut cache = ImageCache::new();
            let screen = Screen {
                session: &session,
                bindings: &bindings,
                sizes: SIZES,
                status: None,
            };

            let content = draw(100, 30, |frame| render(frame, &screen, &mut cache));

            assert!(content.contains("Sorting Complete"));
            assert!(content.contains("100% (1/1, 0 left)"));
        }

        #[test]
        fn test_render_unreadable_image() {
            let temp = TempDir::new().unwrap();
            let session = session(&temp, &["a.png"], true);
            fs::write(temp.path().join("images").join("a.png"), b"garbage").unwrap();
            let bindings = KeyBindings::new(session.categories());
            let mut cache = ImageCache::new();
            let screen = Screen {
                session: &session,
                bindings: &bindings,
                sizes: SIZES,
                status: None,
            };

            let content = draw(100, 30, |frame| render(frame, &screen, &mut cache));

            assert!(content.contains("Could not display image"));
        }

        #[test]
        fn test_render_help_overlay() {
            let bindings = KeyBindings::new(&["Good".to_string(), "Bad".to_string()]);

            let content = draw(80, 30, |frame| render_help_overlay(frame, &bindings));

            assert!(content.contains("Help"));
            assert!(content.contains("Move to Good"));
            assert!(content.contains("Undo last move"));
        }

        #[test]
        fn test_render_summary() {
            let stats = SessionStatistics {
                total_images: 3,
                sorted: 3,
                per_category: vec![("Good".to_string(), 2), ("Bad".to_string(), 1)],
            };

            let content = draw(80, 30, |frame| render_summary(frame, &stats));

            assert!(content.contains("Summary"));
            assert!(content.contains("3/3"));
            assert!(content.contains("Good: 2"));
        }
    }
}
