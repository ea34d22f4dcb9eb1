use crate::session::Intent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Digits bound to categories, in category order
const CATEGORY_KEYS: [char; 10] = ['1', '2', '3', '4', '5', '6', '7', '8', '9', '0'];

/// Keys that undo the last move (Ctrl+Z works as well)
const UNDO_KEYS: [char; 2] = ['z', 'u'];

/// Represents the result of handling a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit the application
    Quit,
    /// Toggle help overlay
    Help,
    /// Forward an intent to the session
    Intent(Intent),
    /// No action
    None,
}

/// Dispatch table: one entry per category key plus the undo keys
#[derive(Debug, Clone)]
pub struct KeyBindings {
    table: Vec<(char, Intent)>,
}

impl KeyBindings {
    /// Binds `1`-`9` then `0` to the first ten categories; further categories get no key
    pub fn new(categories: &[String]) -> Self {
        let mut table: Vec<(char, Intent)> = CATEGORY_KEYS
            .iter()
            .zip(categories)
            .map(|(key, label)| (*key, Intent::MoveToCategory(label.clone())))
            .collect();

        table.extend(UNDO_KEYS.iter().map(|key| (*key, Intent::Undo)));

        if categories.len() > CATEGORY_KEYS.len() {
            tracing::warn!(
                "Only the first {} categories have keys, {} configured",
                CATEGORY_KEYS.len(),
                categories.len()
            );
        }

        Self { table }
    }

    pub fn intent_for(&self, key: char) -> Option<&Intent> {
        self.table
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, intent)| intent)
    }

    /// Category labels with their key, in order
    pub fn category_keys(&self) -> impl Iterator<Item = (char, &str)> {
        self.table.iter().filter_map(|(key, intent)| match intent {
            Intent::MoveToCategory(label) => Some((*key, label.as_str())),
            Intent::Undo => None,
        })
    }
}

/// Maps keyboard events to actions
pub fn handle_key_event(key: KeyEvent, bindings: &KeyBindings) -> KeyAction {
    match (key.code, key.modifiers) {
        // Quit: q, Esc or Ctrl+C
        (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Quit,

        (KeyCode::Char('z'), KeyModifiers::CONTROL) => KeyAction::Intent(Intent::Undo),

        (KeyCode::Char('?'), _) => KeyAction::Help,

        (KeyCode::Char(c), KeyModifiers::NONE) => match bindings.intent_for(c) {
            Some(intent) => KeyAction::Intent(intent.clone()),
            None => KeyAction::None,
        },

        _ => KeyAction::None,
    }
}
