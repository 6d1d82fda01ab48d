//! Document themes: page chrome geometry and text, in layout points.

use dossier_shared::{DossierError, Result};

/// A4 page width in points.
pub const PAGE_WIDTH: f32 = 595.0;
/// A4 page height in points.
pub const PAGE_HEIGHT: f32 = 842.0;

/// Page chrome configuration drawn on every report page.
///
/// Wordmarks occupy the logo positions (left/right of the header); the
/// footer line is centered at a fixed height. All lengths are points.
#[derive(Debug, Clone)]
pub struct DocTheme {
    pub wordmark_left: Option<String>,
    pub wordmark_right: Option<String>,
    pub wordmark_size: f32,
    /// Gap between the page top and the header zone.
    pub header_margin_top: f32,
    /// Height reserved for the header zone.
    pub header_height: f32,
    /// Gap between the header zone and the content area.
    pub header_gap: f32,
    /// Left/right content margin.
    pub margin_x: f32,
    pub footer_text: String,
    pub footer_y: f32,
    pub footer_size: f32,
}

impl DocTheme {
    /// The layout used for survey reports.
    pub fn standard(footer_text: &str) -> Self {
        Self {
            wordmark_left: Some("FLEXCOLOR".to_string()),
            wordmark_right: Some("FLEX".to_string()),
            wordmark_size: 14.0,
            header_margin_top: 20.0,
            header_height: 50.0,
            header_gap: 20.0,
            margin_x: 40.0,
            footer_text: footer_text.to_string(),
            footer_y: 20.0,
            footer_size: 10.0,
        }
    }

    /// Tighter chrome used for auxiliary document kinds.
    pub fn compact(footer_text: &str) -> Self {
        Self {
            wordmark_left: Some("FLEXCOLOR".to_string()),
            wordmark_right: None,
            wordmark_size: 10.0,
            header_margin_top: 15.0,
            header_height: 30.0,
            header_gap: 15.0,
            margin_x: 40.0,
            footer_text: footer_text.to_string(),
            footer_y: 15.0,
            footer_size: 8.0,
        }
    }

    /// Resolve a configured theme name.
    pub fn from_name(name: &str, footer_text: &str) -> Result<Self> {
        match name {
            "standard" => Ok(Self::standard(footer_text)),
            "compact" => Ok(Self::compact(footer_text)),
            other => Err(DossierError::config(format!("unknown theme: {other}"))),
        }
    }

    /// Where the content cursor starts on a fresh page.
    pub fn content_top(&self) -> f32 {
        PAGE_HEIGHT - self.header_margin_top - self.header_height - self.header_gap
    }

    /// Lowest y the footer leaves to content.
    pub fn content_bottom(&self) -> f32 {
        self.footer_y + 30.0
    }
}
