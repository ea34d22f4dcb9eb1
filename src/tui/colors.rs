// Color palette shared by all panes and overlays

use ratatui::style::Color;

/// Errors and failed operations
pub const ACCENT_PRIMARY: Color = Color::Rgb(235, 87, 87);
/// Successful moves and category keys
pub const ACCENT_SECONDARY: Color = Color::Rgb(111, 207, 151);
/// Titles, undo and focus
pub const ACCENT_HIGHLIGHT: Color = Color::Rgb(242, 201, 76);
/// Notices that are neither success nor failure
pub const ACCENT_WARNING: Color = Color::Rgb(242, 153, 74);

pub const TEXT_PRIMARY: Color = Color::Rgb(224, 224, 224);
pub const TEXT_SECONDARY: Color = Color::Rgb(140, 140, 140);

pub const BG_DARK: Color = Color::Rgb(24, 24, 28);
/// Fill for the empty preview placeholder
pub const BG_PLACEHOLDER: Color = Color::Rgb(245, 245, 245);
pub const BORDER_COLOR: Color = Color::Rgb(80, 80, 90);
