//! Rendering configuration, resolved once at startup.

use std::path::PathBuf;

/// Visual parameters for the frame renderer. Lengths other than the image
/// size are in CRS meters so they stay proportional to the map during the
/// zoom, with no popping between frames.
#[derive(Debug, Clone)]
pub struct RenderStyle {
    /// Output image width in pixels
    pub width: u32,
    /// Output image height in pixels
    pub height: u32,
    /// Explicit label font file; None falls back to the system fonts
    pub font_file: Option<PathBuf>,
    /// Label text size in CRS meters
    pub font_size: f64,
    /// Vertical gap between label lines, in CRS meters
    pub label_line_gap: f64,
    /// Page background color (hex)
    pub background: String,
    /// Region outline color (hex)
    pub region_outline: String,
    /// Region outline width in CRS meters
    pub region_outline_width: f64,
    /// Province border color (hex)
    pub province_outline: String,
    /// Province border width in CRS meters
    pub province_outline_width: f64,
    /// Label text color (hex)
    pub label_color: String,
}

impl Default for RenderStyle {
    fn default() -> Self {
        RenderStyle {
            width: 1280,
            height: 720,
            font_file: None,
            // Sized for province-level zoom, where labels are visible.
            font_size: 2500.0,
            label_line_gap: 3000.0,
            background: "#a6cee3".to_string(),
            region_outline: "#666666".to_string(),
            region_outline_width: 150.0,
            province_outline: "#222222".to_string(),
            province_outline_width: 400.0,
            label_color: "#1a1a1a".to_string(),
        }
    }
}
