//! Persisted sorter settings

use crate::domain::substitution::join_list;
use crate::domain::{QueueOrder, SubstitutionRules};
use crate::error::{Result, SorterError};
use crate::session::SessionSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_image_height() -> u32 {
    800
}

fn default_image_width() -> u32 {
    600
}

fn default_preview_height() -> u32 {
    400
}

fn default_preview_width() -> u32 {
    300
}

fn default_button_names() -> Vec<String> {
    [
        "1 - Good",
        "2 - Maybe",
        "3 - Bad",
        "4 - Concept",
        "5 - Clothing",
        "6 - Redo",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Settings stored between runs.
///
/// `text_to_replace` and `replace_with` hold `;`-joined lists; they are split
/// back into substitution rules when a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SorterConfig {
    #[serde(default)]
    pub image_folder: String,
    #[serde(default)]
    pub preview_folder: String,
    /// Root for category folders; the image folder is used when empty
    #[serde(default)]
    pub sorted_folder: String,
    #[serde(default = "default_image_height")]
    pub image_height: u32,
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    #[serde(default = "default_preview_height")]
    pub preview_height: u32,
    #[serde(default = "default_preview_width")]
    pub preview_width: u32,
    #[serde(default = "default_button_names")]
    pub button_names: Vec<String>,
    #[serde(default)]
    pub text_to_replace: String,
    #[serde(default)]
    pub replace_with: String,
    #[serde(default)]
    pub hide_preview: bool,
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            image_folder: String::new(),
            preview_folder: String::new(),
            sorted_folder: String::new(),
            image_height: default_image_height(),
            image_width: default_image_width(),
            preview_height: default_preview_height(),
            preview_width: default_preview_width(),
            button_names: default_button_names(),
            text_to_replace: String::new(),
            replace_with: String::new(),
            hide_preview: false,
        }
    }
}

impl SorterConfig {
    /// Get the default config file path (~/.config/imgsort/config.json)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("imgsort").join("config.json"))
    }

    /// Load config from `path`, or defaults if the file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            SorterError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            SorterError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Save config to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SorterError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        fs::write(path, contents).map_err(|e| {
            SorterError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    pub fn set_patterns(&mut self, patterns: &[String]) {
        self.text_to_replace = join_list(patterns);
    }

    pub fn set_replacements(&mut self, replacements: &[String]) {
        self.replace_with = join_list(replacements);
    }

    pub fn rules(&self) -> SubstitutionRules {
        SubstitutionRules::parse(&self.text_to_replace, &self.replace_with)
    }

    /// Category root, falling back to the image folder
    pub fn resolved_sorted_folder(&self) -> PathBuf {
        if self.sorted_folder.trim().is_empty() {
            PathBuf::from(&self.image_folder)
        } else {
            PathBuf::from(&self.sorted_folder)
        }
    }

    /// Category labels with surrounding whitespace removed, blanks dropped and
    /// repeats collapsed onto their first occurrence
    pub fn categories(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::with_capacity(self.button_names.len());
        for name in self.button_names.iter().map(|n| n.trim()) {
            if name.is_empty() {
                continue;
            }
            if labels.iter().any(|l| l == name) {
                tracing::warn!("Ignoring repeated category {}", name);
                continue;
            }
            labels.push(name.to_string());
        }
        labels
    }

    /// Checks the folders and categories and produces the inputs for a session
    pub fn validate(&self, order: QueueOrder, dry_run: bool) -> Result<SessionSettings> {
        let image_folder = require_dir("Image folder", &self.image_folder)?;

        let preview_folder = if self.hide_preview {
            None
        } else {
            Some(require_dir("Preview folder", &self.preview_folder)?)
        };

        let sorted_folder = self.resolved_sorted_folder();
        if sorted_folder.exists() && !sorted_folder.is_dir() {
            return Err(SorterError::ConfigError(format!(
                "Sorted folder is not a directory: {}",
                sorted_folder.display()
            )));
        }

        let categories = self.categories();
        if categories.is_empty() {
            return Err(SorterError::ConfigError(
                "At least one category name is required".to_string(),
            ));
        }

        Ok(SessionSettings {
            image_folder,
            preview_folder,
            sorted_folder,
            categories,
            rules: self.rules(),
            order,
            dry_run,
        })
    }
}

fn require_dir(label: &str, raw: &str) -> Result<PathBuf> {
    if raw.trim().is_empty() {
        return Err(SorterError::ConfigError(format!("{} is not set", label)));
    }

    let path = PathBuf::from(raw);
    if !path.exists() {
        return Err(SorterError::ConfigError(format!(
            "{} does not exist: {}",
            label,
            path.display()
        )));
    }
    if !path.is_dir() {
        return Err(SorterError::ConfigError(format!(
            "{} is not a directory: {}",
            label,
            path.display()
        )));
    }

    Ok(path)
}
