//! Triage session: the queue, the resolver and the move executor behind one intent surface

use crate::domain::substitution::NO_PREVIEW_CAPTION;
use crate::domain::{
    preview_caption, CursorStep, ImageQueue, MoveExecutor, MoveRecord, QueueOrder,
    SubstitutionRules, UndoOutcome,
};
use crate::error::Result;
use std::path::PathBuf;

/// Validated inputs needed to start a session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub image_folder: PathBuf,
    /// `None` when previews are hidden; the resolver is then never consulted
    pub preview_folder: Option<PathBuf>,
    pub sorted_folder: PathBuf,
    pub categories: Vec<String>,
    pub rules: SubstitutionRules,
    pub order: QueueOrder,
    pub dry_run: bool,
}

/// A user request forwarded by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Move the current image into the named category, then advance
    MoveToCategory(String),
    Undo,
}

/// Non-error result of handling an intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentOutcome {
    Moved(MoveRecord),
    Undone(MoveRecord),
    NothingToUndo,
    /// The recorded file is no longer where it was moved to
    UndoTargetMissing(PathBuf),
    /// Every image has already been sorted
    AlreadyComplete,
    /// The label is not one of the configured categories
    UnknownCategory(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active(usize),
    Complete,
}

/// Preview lookup result for the current image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewLookup {
    /// Previews are switched off
    Hidden,
    Found { path: PathBuf, caption: String },
    /// Nothing exists at the resolved path; the placeholder should be shown
    Missing { resolved: PathBuf },
}

/// Everything the presentation layer needs to draw the current step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub current_image: Option<PathBuf>,
    pub preview_path: Option<PathBuf>,
    pub preview_placeholder: bool,
    pub preview_caption: Option<String>,
    /// `(index, total)`, with `index == total` once complete
    pub position: (usize, usize),
    pub terminal: bool,
    pub title: String,
    pub last_move: Option<MoveRecord>,
}

/// Counts of images sorted into each category, in configured order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatistics {
    pub total_images: usize,
    pub sorted: usize,
    pub per_category: Vec<(String, usize)>,
}

#[derive(Debug)]
pub struct TriageSession {
    queue: ImageQueue,
    executor: MoveExecutor,
    rules: SubstitutionRules,
    preview_folder: Option<PathBuf>,
    categories: Vec<String>,
    sorted_counts: Vec<usize>,
    /// Preview of the current image, looked up whenever the cursor moves
    preview: PreviewLookup,
}

impl TriageSession {
    /// Lists the image folder and starts a session at the first image.
    ///
    /// Returns `SorterError::EmptyQueue` when the folder has no eligible images.
    pub fn initialize(settings: SessionSettings) -> Result<Self> {
        let queue = ImageQueue::initialize(&settings.image_folder, settings.order)?;
        Ok(Self::with_queue(queue, settings))
    }

    fn with_queue(queue: ImageQueue, settings: SessionSettings) -> Self {
        let mut executor = MoveExecutor::new(settings.sorted_folder);
        executor.set_dry_run(settings.dry_run);

        let sorted_counts = vec![0; settings.categories.len()];
        let mut session = Self {
            queue,
            executor,
            rules: settings.rules,
            preview_folder: settings.preview_folder,
            categories: settings.categories,
            sorted_counts,
            preview: PreviewLookup::Hidden,
        };
        session.refresh_preview();
        session
    }

    pub fn handle_intent(&mut self, intent: &Intent) -> Result<IntentOutcome> {
        match intent {
            Intent::MoveToCategory(category) => self.move_current(category),
            Intent::Undo => self.undo(),
        }
    }

    /// Moves the current image into `category` and advances.
    ///
    /// A failed move leaves the cursor and the previous move record untouched.
    pub fn move_current(&mut self, category: &str) -> Result<IntentOutcome> {
        let name = match self.queue.current() {
            Some(name) => name.to_string(),
            None => return Ok(IntentOutcome::AlreadyComplete),
        };

        let category_index = match self.categories.iter().position(|c| c == category) {
            Some(i) => i,
            None => return Ok(IntentOutcome::UnknownCategory(category.to_string())),
        };

        let record = self
            .executor
            .move_to_category(self.queue.folder(), &name, category)?;
        self.queue.advance();
        self.sorted_counts[category_index] += 1;
        self.refresh_preview();

        if self.queue.is_complete() {
            tracing::info!("All {} images sorted", self.queue.len());
        }

        Ok(IntentOutcome::Moved(record))
    }

    /// Reverts the last move and steps back to its image
    pub fn undo(&mut self) -> Result<IntentOutcome> {
        match self.executor.undo()? {
            UndoOutcome::NothingToUndo => Ok(IntentOutcome::NothingToUndo),
            UndoOutcome::TargetMissing(path) => Ok(IntentOutcome::UndoTargetMissing(path)),
            UndoOutcome::Restored(record) => {
                if self.queue.retreat() == CursorStep::AtStart {
                    tracing::warn!("Undo restored a file while the queue was at its start");
                }
                if let Some(i) = self.categories.iter().position(|c| *c == record.category) {
                    self.sorted_counts[i] = self.sorted_counts[i].saturating_sub(1);
                }
                self.refresh_preview();
                Ok(IntentOutcome::Undone(record))
            }
        }
    }

    pub fn state(&self) -> SessionState {
        if self.queue.is_complete() {
            SessionState::Complete
        } else {
            SessionState::Active(self.queue.cursor())
        }
    }

    pub fn is_complete(&self) -> bool {
        self.queue.is_complete()
    }

    /// Resolves the preview for an image name against the preview folder
    pub fn lookup_preview(&self, image_name: &str) -> PreviewLookup {
        let folder = match &self.preview_folder {
            Some(folder) => folder,
            None => return PreviewLookup::Hidden,
        };

        let preview_name = self.rules.resolve(image_name);
        let path = folder.join(&preview_name);
        if path.is_file() {
            PreviewLookup::Found {
                path,
                caption: preview_caption(&preview_name),
            }
        } else {
            PreviewLookup::Missing { resolved: path }
        }
    }

    fn refresh_preview(&mut self) {
        self.preview = match self.queue.current() {
            Some(name) => {
                let lookup = self.lookup_preview(name);
                tracing::debug!("Preview for {}: {:?}", name, lookup);
                lookup
            }
            None => PreviewLookup::Hidden,
        };
    }

    pub fn display_state(&self) -> DisplayState {
        let position = self.queue.position();
        let last_move = self.executor.last_move().cloned();

        let name = match self.queue.current() {
            Some(name) => name,
            None => {
                return DisplayState {
                    current_image: None,
                    preview_path: None,
                    preview_placeholder: false,
                    preview_caption: None,
                    position,
                    terminal: true,
                    title: "Image Sorter - all images sorted".to_string(),
                    last_move,
                }
            }
        };

        let (preview_path, preview_placeholder, preview_caption) = match &self.preview {
            PreviewLookup::Hidden => (None, false, None),
            PreviewLookup::Found { path, caption } => {
                (Some(path.clone()), false, Some(caption.clone()))
            }
            PreviewLookup::Missing { .. } => (None, true, Some(NO_PREVIEW_CAPTION.to_string())),
        };

        DisplayState {
            current_image: self.queue.current_path(),
            preview_path,
            preview_placeholder,
            preview_caption,
            position,
            terminal: false,
            title: format!(
                "Image Sorter - {} ({}/{})",
                name,
                position.0 + 1,
                position.1
            ),
            last_move,
        }
    }

    pub fn statistics(&self) -> SessionStatistics {
        SessionStatistics {
            total_images: self.queue.len(),
            sorted: self.sorted_counts.iter().sum(),
            per_category: self
                .categories
                .iter()
                .cloned()
                .zip(self.sorted_counts.iter().copied())
                .collect(),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn previews_hidden(&self) -> bool {
        self.preview_folder.is_none()
    }

    pub fn is_dry_run(&self) -> bool {
        self.executor.is_dry_run()
    }

    pub fn queue(&self) -> &ImageQueue {
        &self.queue
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.executor.last_move()
    }
}
