//! Captured pixel buffers.

use billdesk_core::Color;
use tiny_skia::Pixmap;

use crate::error::{RasterError, RasterResult};

/// An RGBA bitmap produced by a capture.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pixmap: Pixmap,
}

impl Bitmap {
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    /// A `width × height` bitmap filled with `color`.
    pub fn filled(width: u32, height: u32, color: Color) -> RasterResult<Self> {
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RasterError::Failed(format!("cannot allocate {width}x{height} bitmap")))?;
        pixmap.fill(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a));
        Ok(Self { pixmap })
    }

    /// Width in device pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in device pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha color at `(x, y)`, or `None` outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::rgba(c.red(), c.green(), c.blue(), c.alpha()))
    }

    /// `true` when every pixel is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.pixmap.pixels().iter().all(|p| p.alpha() == u8::MAX)
    }

    pub fn as_pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }
}
