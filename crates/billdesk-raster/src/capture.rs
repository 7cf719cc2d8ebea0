//! Region capture: paints one region of a [`Document`] into a [`Bitmap`].
//!
//! The capture window defaults to the document's full scroll size rather
//! than its viewport, so a region that extends past the visible area is
//! captured whole. The region is painted at `scale` device pixels per CSS
//! pixel.
//!
//! Images from another origin are allowed by default. When one cannot be
//! fetched or decoded it is left blank and the capture carries on. Failures
//! of same-origin or inline images fail the capture.

use billdesk_core::{BBox, Color, Document, ImageSource, Node, Size};
use tiny_skia::{
    FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};

use crate::bitmap::Bitmap;
use crate::error::{RasterError, RasterResult};
use crate::resources::{DefaultLoader, ResourceLoader};
use crate::text::{TextPlacement, TextRenderer};

/// Largest bitmap edge, in device pixels, a capture will allocate.
pub const MAX_BITMAP_DIMENSION: u32 = 32_767;

/// Options for [`Rasterizer::capture_region`].
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Device pixels per CSS pixel. Default `2.0`.
    pub scale: f64,
    /// Capture window; `None` uses the document's scroll size.
    pub window: Option<Size>,
    /// Color painted under the region; `None` leaves it transparent.
    pub background: Option<Color>,
    /// Include images from other origins. Default `true`.
    pub allow_cross_origin: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            window: None,
            background: Some(Color::WHITE),
            allow_cross_origin: true,
        }
    }
}

/// Paints document regions into bitmaps.
pub struct Rasterizer {
    text: TextRenderer,
    loader: Box<dyn ResourceLoader>,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer").field("text", &self.text).finish()
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(TextRenderer::discover(), DefaultLoader::new())
    }
}

impl Rasterizer {
    pub fn new(text: TextRenderer, loader: impl ResourceLoader + 'static) -> Self {
        Self {
            text,
            loader: Box::new(loader),
        }
    }

    pub fn text(&self) -> &TextRenderer {
        &self.text
    }

    /// Capture the region `region_id` of `document`.
    pub fn capture_region(
        &self,
        document: &Document,
        region_id: &str,
        options: &CaptureOptions,
    ) -> RasterResult<Bitmap> {
        let region = document
            .region(region_id)
            .ok_or_else(|| RasterError::TargetMissing(region_id.to_string()))?;

        let window = options.window.unwrap_or_else(|| document.scroll_size());
        let area = region
            .bbox
            .intersection(&window.to_bbox())
            .ok_or_else(|| RasterError::Failed(format!("region '{region_id}' has no visible area")))?;

        let scale = options.scale;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(RasterError::Failed(format!("invalid capture scale {scale}")));
        }
        let width = device_extent(area.width(), scale)?;
        let height = device_extent(area.height(), scale)?;
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RasterError::Failed(format!("cannot allocate {width}x{height} bitmap")))?;

        if let Some(bg) = options.background {
            pixmap.fill(to_skia(bg));
        }

        let transform = Transform::from_row(
            scale as f32,
            0.0,
            0.0,
            scale as f32,
            (-area.x0 * scale) as f32,
            (-area.top * scale) as f32,
        );
        let mut painter = Painter {
            pixmap: &mut pixmap,
            transform,
            scale,
            origin: area,
            text: &self.text,
            loader: self.loader.as_ref(),
            options,
            skipped_text: 0,
        };
        for node in &region.nodes {
            painter.paint(node)?;
        }
        if painter.skipped_text > 0 {
            tracing::warn!(
                runs = painter.skipped_text,
                "no font loaded; text rendered blank"
            );
        }

        tracing::debug!(region = region_id, width, height, scale, "captured region");
        Ok(Bitmap::from_pixmap(pixmap))
    }
}

/// Capture with a default [`Rasterizer`] (system font, default loader).
pub fn capture_region(
    document: &Document,
    region_id: &str,
    options: &CaptureOptions,
) -> RasterResult<Bitmap> {
    Rasterizer::default().capture_region(document, region_id, options)
}

fn device_extent(css: f64, scale: f64) -> RasterResult<u32> {
    let px = (css * scale).ceil();
    if px < 1.0 || px > f64::from(MAX_BITMAP_DIMENSION) {
        return Err(RasterError::Failed(format!(
            "bitmap edge of {px} px is outside 1..={MAX_BITMAP_DIMENSION}"
        )));
    }
    Ok(px as u32)
}

fn to_skia(c: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn solid_paint(c: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(c.r, c.g, c.b, c.a);
    paint.anti_alias = true;
    paint
}

fn skia_rect(b: &BBox) -> Option<Rect> {
    Rect::from_ltrb(b.x0 as f32, b.top as f32, b.x1 as f32, b.bottom as f32)
}

struct Painter<'a> {
    pixmap: &'a mut Pixmap,
    transform: Transform,
    scale: f64,
    origin: BBox,
    text: &'a TextRenderer,
    loader: &'a dyn ResourceLoader,
    options: &'a CaptureOptions,
    skipped_text: usize,
}

impl Painter<'_> {
    fn paint(&mut self, node: &Node) -> RasterResult<()> {
        match node {
            Node::Rect {
                bbox,
                fill,
                stroke,
                stroke_width,
            } => {
                let Some(rect) = skia_rect(bbox) else {
                    return Ok(());
                };
                if let Some(fill) = fill {
                    self.pixmap
                        .fill_rect(rect, &solid_paint(*fill), self.transform, None);
                }
                if let Some(stroke_color) = stroke {
                    if *stroke_width > 0.0 {
                        let path = PathBuilder::from_rect(rect);
                        let stroke = Stroke {
                            width: *stroke_width as f32,
                            ..Stroke::default()
                        };
                        self.pixmap.stroke_path(
                            &path,
                            &solid_paint(*stroke_color),
                            &stroke,
                            self.transform,
                            None,
                        );
                    }
                }
            }
            Node::Text {
                x,
                top,
                size,
                anchor,
                color,
                content,
            } => {
                let placement = TextPlacement {
                    x: ((x - self.origin.x0) * self.scale) as f32,
                    top: ((top - self.origin.top) * self.scale) as f32,
                    line_height: (size * billdesk_core::view::LINE_HEIGHT * self.scale) as f32,
                    size: (size * self.scale) as f32,
                    anchor: *anchor,
                };
                if !self.text.draw(self.pixmap, content, placement, *color) {
                    self.skipped_text += 1;
                }
            }
            Node::Image { bbox, source } => {
                if let Some(image) = self.load_image(source)? {
                    let sx = bbox.width() / f64::from(image.width());
                    let sy = bbox.height() / f64::from(image.height());
                    let transform = self
                        .transform
                        .pre_translate(bbox.x0 as f32, bbox.top as f32)
                        .pre_scale(sx as f32, sy as f32);
                    let paint = PixmapPaint {
                        quality: FilterQuality::Bilinear,
                        ..PixmapPaint::default()
                    };
                    self.pixmap
                        .draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);
                }
            }
        }
        Ok(())
    }

    /// `Ok(None)` means the image is left blank.
    fn load_image(&self, source: &ImageSource) -> RasterResult<Option<Pixmap>> {
        let cross_origin = source.is_cross_origin();
        if cross_origin && !self.options.allow_cross_origin {
            tracing::warn!(href = source.href(), "cross-origin image excluded from capture");
            return Ok(None);
        }

        let decoded = self.loader.load(source).and_then(|bytes| {
            Pixmap::decode_png(&bytes).map_err(|e| format!("{}: unsupported image: {e}", source.href()))
        });
        match decoded {
            Ok(pixmap) => Ok(Some(pixmap)),
            Err(e) if cross_origin => {
                tracing::warn!(error = %e, "cross-origin image unavailable; rendering blank");
                Ok(None)
            }
            Err(e) => Err(RasterError::Failed(e)),
        }
    }
}
