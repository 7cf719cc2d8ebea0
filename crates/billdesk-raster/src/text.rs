//! Glyph rendering with fontdue.
//!
//! [`TextRenderer`] holds at most one font. Without a font, text runs are
//! skipped and render blank.

use std::path::Path;

use billdesk_core::{Color, TextAnchor};
use fontdue::{Font, FontSettings};
use tiny_skia::{Pixmap, PremultipliedColorU8};

use crate::error::{RasterError, RasterResult};

/// Font files probed by [`TextRenderer::discover`], in order.
pub const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Where a single text run lands in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    /// Anchor x in device pixels.
    pub x: f32,
    /// Top of the line box in device pixels.
    pub top: f32,
    /// Height of the line box in device pixels.
    pub line_height: f32,
    /// Font size in device pixels.
    pub size: f32,
    pub anchor: TextAnchor,
}

/// Draws text runs into pixmaps.
#[derive(Default)]
pub struct TextRenderer {
    font: Option<Font>,
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl TextRenderer {
    /// A renderer without a font; all text renders blank.
    pub fn without_font() -> Self {
        Self { font: None }
    }

    /// Load a TrueType/OpenType font from bytes.
    pub fn from_bytes(data: Vec<u8>) -> RasterResult<Self> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| RasterError::Font(e.to_string()))?;
        Ok(Self { font: Some(font) })
    }

    /// Load a font file.
    pub fn from_file(path: &Path) -> RasterResult<Self> {
        let data = std::fs::read(path)
            .map_err(|e| RasterError::Font(format!("{}: {e}", path.display())))?;
        Self::from_bytes(data)
    }

    /// Use the first loadable font of [`SYSTEM_FONT_PATHS`], or none.
    pub fn discover() -> Self {
        for candidate in SYSTEM_FONT_PATHS {
            let path = Path::new(candidate);
            if !path.exists() {
                continue;
            }
            match Self::from_file(path) {
                Ok(renderer) => {
                    tracing::debug!(font = %path.display(), "using system font");
                    return renderer;
                }
                Err(e) => tracing::debug!(error = %e, "skipping unusable font"),
            }
        }
        tracing::warn!("no system font found; text will render blank");
        Self::without_font()
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Advance width of `text` at `size` px, or `None` without a font.
    pub fn measure(&self, text: &str, size: f32) -> Option<f32> {
        let font = self.font.as_ref()?;
        Some(text.chars().map(|c| font.metrics(c, size).advance_width).sum())
    }

    /// Draw `text` into `pixmap`. Returns `false` if it was skipped for lack
    /// of a font.
    pub fn draw(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        placement: TextPlacement,
        color: Color,
    ) -> bool {
        let Some(font) = self.font.as_ref() else {
            return text.is_empty();
        };
        let size = placement.size;
        let (ascent, descent) = font
            .horizontal_line_metrics(size)
            .map(|m| (m.ascent, m.descent))
            .unwrap_or((size * 0.8, -size * 0.2));
        let baseline = placement.top + (placement.line_height - (ascent - descent)) / 2.0 + ascent;

        let width: f32 = text.chars().map(|c| font.metrics(c, size).advance_width).sum();
        let mut pen_x = match placement.anchor {
            TextAnchor::Start => placement.x,
            TextAnchor::Middle => placement.x - width / 2.0,
            TextAnchor::End => placement.x - width,
        };

        for ch in text.chars() {
            let (metrics, coverage) = font.rasterize(ch, size);
            let left = (pen_x + metrics.xmin as f32).round() as i64;
            let top = (baseline - (metrics.height as i32 + metrics.ymin) as f32).round() as i64;
            blend_coverage(pixmap, left, top, metrics.width, metrics.height, &coverage, color);
            pen_x += metrics.advance_width;
        }
        true
    }
}

/// Source-over blend of a solid `color` through an 8-bit coverage mask.
fn blend_coverage(
    pixmap: &mut Pixmap,
    left: i64,
    top: i64,
    width: usize,
    height: usize,
    coverage: &[u8],
    color: Color,
) {
    let pw = i64::from(pixmap.width());
    let ph = i64::from(pixmap.height());
    let pixels = pixmap.pixels_mut();

    for gy in 0..height {
        let y = top + gy as i64;
        if y < 0 || y >= ph {
            continue;
        }
        for gx in 0..width {
            let x = left + gx as i64;
            if x < 0 || x >= pw {
                continue;
            }
            let cov = u32::from(coverage[gy * width + gx]) * u32::from(color.a) / 255;
            if cov == 0 {
                continue;
            }
            let idx = (y * pw + x) as usize;
            let dst = pixels[idx];
            let inv = 255 - cov;
            let mix = |src: u8, dst: u8| ((u32::from(src) * cov + u32::from(dst) * inv) / 255) as u8;
            let out = PremultipliedColorU8::from_rgba(
                mix(color.r, dst.red()),
                mix(color.g, dst.green()),
                mix(color.b, dst.blue()),
                mix(255, dst.alpha()),
            );
            if let Some(out) = out {
                pixels[idx] = out;
            }
        }
    }
}
