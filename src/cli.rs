// CLI module for argument parsing and configuration overrides

use crate::config::SorterConfig;
use crate::domain::substitution::split_list;
use crate::domain::QueueOrder;
use crate::error::{Result, SorterError};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// imgsort - sort a folder of images into category folders, one image at a time
///
/// Settings are read from the config file, overridden by any flags given here,
/// and saved back when the session starts.
#[derive(Parser, Debug, Clone)]
#[command(name = "imgsort")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Folder holding the images to sort
    pub image_folder: Option<PathBuf>,

    /// Folder searched for preview files
    #[arg(short = 'p', long = "preview-folder")]
    pub preview_folder: Option<PathBuf>,

    /// Root for category folders (defaults to the image folder)
    #[arg(short = 's', long = "sorted-folder")]
    pub sorted_folder: Option<PathBuf>,

    /// Category name; repeat to define several. Replaces the stored list.
    ///
    /// Example: -c Good -c Maybe -c Bad
    #[arg(short = 'c', long = "category")]
    pub categories: Vec<String>,

    /// Text to replace in image names to find previews (semicolon separated)
    #[arg(long = "replace")]
    pub text_to_replace: Option<String>,

    /// Replacements matching --replace by position (semicolon separated)
    #[arg(long = "with")]
    pub replace_with: Option<String>,

    /// Don't look up or show previews
    #[arg(long = "hide-preview", action = ArgAction::SetTrue)]
    pub hide_preview: bool,

    /// Show previews even if the stored settings hide them
    #[arg(long = "show-preview", action = ArgAction::SetTrue, conflicts_with = "hide_preview")]
    pub show_preview: bool,

    /// Order in which images are presented
    #[arg(short = 'o', long = "order", value_enum, default_value = "listing")]
    pub order: OrderArg,

    /// Dry run mode - walk through the images without moving anything
    #[arg(short = 'n', long = "dry-run", action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Settings file to use instead of the default location
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Don't write the merged settings back to the settings file
    #[arg(long = "no-save", action = ArgAction::SetTrue)]
    pub no_save: bool,

    /// Write a log of moves and undos to this file
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

/// Queue order options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OrderArg {
    /// Directory listing order, as the filesystem returns it
    #[default]
    Listing,
    /// File name (alphabetical, case-insensitive)
    Name,
}

impl From<OrderArg> for QueueOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Listing => QueueOrder::Listing,
            OrderArg::Name => QueueOrder::Name,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Settings file path: `--config` or the per-user default
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => SorterConfig::config_path().ok_or_else(|| {
                SorterError::ConfigError("Could not determine config directory".to_string())
            }),
        }
    }

    /// Overrides stored settings with the flags that were given
    pub fn apply_to(&self, config: &mut SorterConfig) {
        if let Some(folder) = &self.image_folder {
            config.image_folder = path_string(folder);
        }
        if let Some(folder) = &self.preview_folder {
            config.preview_folder = path_string(folder);
        }
        if let Some(folder) = &self.sorted_folder {
            config.sorted_folder = path_string(folder);
        }
        if !self.categories.is_empty() {
            config.button_names = self.categories.clone();
        }
        if let Some(raw) = &self.text_to_replace {
            config.set_patterns(&split_list(raw));
        }
        if let Some(raw) = &self.replace_with {
            config.set_replacements(&split_list(raw));
        }
        if self.hide_preview {
            config.hide_preview = true;
        }
        if self.show_preview {
            config.hide_preview = false;
        }
    }

    /// Whether the merged settings should be written back
    pub fn should_save(&self) -> bool {
        !self.no_save && !self.dry_run
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
