// Terminal rendering of images and previews using half-block characters

use image::{DynamicImage, GenericImageView, Pixel};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Maximum number of rendered images kept around
const CACHE_SIZE: usize = 6;

/// Loads an image from a file path
pub fn load_image(path: &Path) -> io::Result<DynamicImage> {
    image::open(path).map_err(|e| io::Error::other(format!("Image loading error: {}", e)))
}

/// Calculates new dimensions to fit image within max width and height while preserving aspect ratio
pub fn calculate_resize_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    if original_width == 0 || original_height == 0 {
        return (0, 0);
    }

    let width_ratio = max_width as f64 / original_width as f64;
    let height_ratio = max_height as f64 / original_height as f64;

    let ratio = width_ratio.min(height_ratio);

    if ratio >= 1.0 {
        // Image is smaller than max dimensions, don't upscale
        (original_width, original_height)
    } else {
        let new_width = (original_width as f64 * ratio) as u32;
        let new_height = (original_height as f64 * ratio) as u32;
        (new_width, new_height)
    }
}

/// Size bound in pixels from the settings, plus the pane size in terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderBounds {
    pub max_width_px: u32,
    pub max_height_px: u32,
    pub columns: u16,
    pub rows: u16,
}

impl RenderBounds {
    /// Fits an image first into the configured pixel box, then into the pane.
    /// Each cell shows one pixel across and two down.
    pub fn fit(&self, original_width: u32, original_height: u32) -> (u32, u32) {
        let (w, h) = calculate_resize_dimensions(
            original_width,
            original_height,
            self.max_width_px,
            self.max_height_px,
        );
        let (w, h) = calculate_resize_dimensions(w, h, self.columns as u32, self.rows as u32 * 2);
        (w.max(1), h.max(1))
    }
}

/// Converts an image to styled lines using half-block characters for terminal display.
/// Uses the upper half block character (▀) with foreground color for the upper pixel
/// and background color for the lower pixel, effectively displaying 2 pixels per cell.
pub fn image_to_halfblock_lines(img: &DynamicImage, width: u32, height: u32) -> Vec<Line<'static>> {
    // Ensure height is even for proper half-block rendering
    let height = if height % 2 == 0 { height } else { height + 1 };

    // Triangle keeps large photos fast enough to redraw between keypresses
    let img = img.resize_exact(width, height, image::imageops::FilterType::Triangle);
    let img = img.to_rgb8();

    let term_height = height / 2;
    let mut lines = Vec::with_capacity(term_height as usize);

    for y in 0..term_height {
        let upper_y = y * 2;
        let lower_y = upper_y + 1;

        let mut spans = Vec::with_capacity(width as usize);

        for x in 0..width {
            let upper_pixel = img.get_pixel(x, upper_y).to_rgb();
            let lower_pixel = if lower_y < height {
                img.get_pixel(x, lower_y).to_rgb()
            } else {
                upper_pixel
            };

            let style = Style::default()
                .fg(Color::Rgb(upper_pixel[0], upper_pixel[1], upper_pixel[2]))
                .bg(Color::Rgb(lower_pixel[0], lower_pixel[1], lower_pixel[2]));

            spans.push(Span::styled("▀", style));
        }

        lines.push(Line::from(spans));
    }

    lines
}

/// Decodes `path` and renders it within `bounds`
pub fn render_image(path: &Path, bounds: RenderBounds) -> io::Result<Vec<Line<'static>>> {
    let img = load_image(path)?;
    let (original_width, original_height) = img.dimensions();
    let (width, height) = bounds.fit(original_width, original_height);
    Ok(image_to_halfblock_lines(&img, width, height))
}

/// Rendered image or the error message to show in its place
pub type RenderResult = Result<Vec<Line<'static>>, String>;

/// Small cache of rendered images so redraws don't decode the file again
#[derive(Debug, Default)]
pub struct ImageCache {
    cache: HashMap<(PathBuf, RenderBounds), RenderResult>,
    /// Order of access for eviction (most recent at end)
    access_order: Vec<(PathBuf, RenderBounds)>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rendered image, decoding it on first request
    pub fn get_or_render(&mut self, path: &Path, bounds: RenderBounds) -> &RenderResult {
        let key = (path.to_path_buf(), bounds);

        if self.cache.contains_key(&key) {
            self.access_order.retain(|k| k != &key);
        } else {
            if self.cache.len() >= CACHE_SIZE && !self.access_order.is_empty() {
                let oldest = self.access_order.remove(0);
                self.cache.remove(&oldest);
            }

            let rendered = render_image(path, bounds).map_err(|e| {
                tracing::warn!("Could not render {}: {}", path.display(), e);
                e.to_string()
            });
            self.cache.insert(key.clone(), rendered);
        }

        self.access_order.push(key.clone());
        &self.cache[&key]
    }

    /// Drops cached renders of `path`, e.g. after the file moved
    pub fn invalidate(&mut self, path: &Path) {
        self.cache.retain(|(p, _), _| p != path);
        self.access_order.retain(|(p, _)| p != path);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
