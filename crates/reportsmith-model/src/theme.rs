//! Visual theme applied to the rendered report

use serde::{Deserialize, Serialize};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl RgbColor {
    /// Construct from channels
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS-style hex string, `#rrggbb`
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Report theme: colors, typography, imagery, overlay strength
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Primary brand color
    pub primary: RgbColor,
    /// Accent color for charts and severity highlights
    pub accent: RgbColor,
    /// Body font family name
    pub font_family: String,
    /// Optional header image reference
    pub header_image: Option<String>,
    /// Opacity of the header overlay, 0.0..=1.0
    pub overlay_opacity: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: RgbColor::new(0x1f, 0x2a, 0x44),
            accent: RgbColor::new(0xd9, 0x53, 0x2c),
            font_family: "Inter".to_string(),
            header_image: None,
            overlay_opacity: 0.85,
        }
    }
}

impl Theme {
    /// Merge a sparse patch into the current theme
    ///
    /// Opacity values are clamped to 0.0..=1.0.
    pub fn merge(&mut self, patch: ThemePatch) {
        if let Some(c) = patch.primary {
            self.primary = c;
        }
        if let Some(c) = patch.accent {
            self.accent = c;
        }
        if let Some(f) = patch.font_family {
            self.font_family = f;
        }
        if let Some(img) = patch.header_image {
            self.header_image = img;
        }
        if let Some(o) = patch.overlay_opacity {
            self.overlay_opacity = o.clamp(0.0, 1.0);
        }
    }
}

/// Sparse theme update
///
/// `header_image` is doubly optional: `None` leaves the image untouched,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemePatch {
    /// New primary color, if changed
    pub primary: Option<RgbColor>,
    /// New accent color, if changed
    pub accent: Option<RgbColor>,
    /// New font family, if changed
    pub font_family: Option<String>,
    /// New header image (`Some(None)` clears it)
    pub header_image: Option<Option<String>>,
    /// New overlay opacity, if changed
    pub overlay_opacity: Option<f32>,
}

impl ThemePatch {
    /// Patch only the accent color
    #[must_use]
    pub fn accent(color: RgbColor) -> Self {
        Self {
            accent: Some(color),
            ..Self::default()
        }
    }
}
