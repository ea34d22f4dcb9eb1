pub mod move_executor;
pub mod substitution;

pub use move_executor::{MoveExecutor, MoveRecord, UndoOutcome};
pub use substitution::{preview_caption, SubstitutionRules};

use crate::error::{Result, SorterError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extensions (lowercase, without the dot) that qualify a file for the queue
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "webp", "jpg", "jpeg", "gif", "bmp"];

/// Returns true if the file name ends in one of the image extensions, ignoring case
pub fn is_image_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// Order in which discovered images are queued
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueueOrder {
    /// Whatever order the directory listing yields (platform dependent)
    #[default]
    Listing,
    /// Case-insensitive file name order
    Name,
}

/// Lists the image files directly inside `dir_path`.
///
/// # Behavior
/// - Keeps only names with an image extension (see [`IMAGE_EXTENSIONS`])
/// - Skips directories, even when their name looks like an image
/// - Skips entries that cannot be read or whose name is not valid UTF-8
/// - Does not recurse into subdirectories, so category folders created
///   inside the source folder are never picked up
pub fn discover_images(dir_path: &Path, order: QueueOrder) -> io::Result<Vec<String>> {
    let mut names = Vec::new();

    for entry_result in fs::read_dir(dir_path)? {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", dir_path.display(), e);
                continue;
            }
        };

        let file_name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                tracing::warn!("Skipping non UTF-8 file name: {:?}", raw);
                continue;
            }
        };

        if !is_image_name(&file_name) {
            continue;
        }

        match fs::metadata(entry.path()) {
            Ok(m) if m.is_file() => names.push(file_name),
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", file_name, e);
                continue;
            }
        }
    }

    if order == QueueOrder::Name {
        names.sort_by(|a, b| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });
    }

    Ok(names)
}

/// Result of moving the queue cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStep {
    Moved,
    /// Cursor already equals the queue length
    AtEnd,
    /// Cursor already at zero; nothing left to step back over
    AtStart,
}

/// Ordered image queue captured once at session start.
///
/// Membership never changes after creation; only the cursor moves. The cursor
/// is either the index of the current pending image or equal to the queue
/// length, which marks the queue as complete.
#[derive(Debug, Clone)]
pub struct ImageQueue {
    folder: PathBuf,
    images: Vec<String>,
    cursor: usize,
}

impl ImageQueue {
    pub fn new(folder: PathBuf, images: Vec<String>) -> Self {
        Self {
            folder,
            images,
            cursor: 0,
        }
    }

    /// Lists `folder` and builds the queue, failing with `EmptyQueue` when no image qualifies
    pub fn initialize(folder: &Path, order: QueueOrder) -> Result<Self> {
        let queue = Self::new(folder.to_path_buf(), discover_images(folder, order)?);
        if queue.is_empty() {
            return Err(SorterError::EmptyQueue(folder.to_path_buf()));
        }

        tracing::info!("Queued {} images from {}", queue.len(), folder.display());
        Ok(queue)
    }

    pub fn current(&self) -> Option<&str> {
        self.images.get(self.cursor).map(String::as_str)
    }

    /// Full path of the current image inside the source folder
    pub fn current_path(&self) -> Option<PathBuf> {
        self.current().map(|name| self.folder.join(name))
    }

    pub fn advance(&mut self) -> CursorStep {
        if self.cursor < self.images.len() {
            self.cursor += 1;
            CursorStep::Moved
        } else {
            CursorStep::AtEnd
        }
    }

    pub fn retreat(&mut self) -> CursorStep {
        if self.cursor > 0 {
            self.cursor -= 1;
            CursorStep::Moved
        } else {
            CursorStep::AtStart
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Returns `(cursor, total)`
    pub fn position(&self) -> (usize, usize) {
        (self.cursor, self.images.len())
    }

    pub fn remaining(&self) -> usize {
        self.images.len() - self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.cursor == self.images.len()
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }
}
