//! Display list for rendered views.
//!
//! A [`Document`] is what a view layer produces: named [`Region`]s, each an
//! ordered list of drawing [`Node`]s positioned in CSS pixels with a
//! top-left origin. Rasterizers read documents, never the model behind them.

use crate::geometry::{BBox, Size};

/// An sRGB color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Horizontal alignment of a text run relative to its anchor `x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

/// Where an image's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImageSource {
    /// A `data:` URI carrying the bytes inline.
    Inline(String),
    /// A same-origin file path.
    Local(String),
    /// An `http://` or `https://` URL on another origin.
    Remote(String),
}

impl ImageSource {
    /// Classify an `href` the way a page would resolve it.
    pub fn parse(href: &str) -> Self {
        let lower = href.trim_start().to_ascii_lowercase();
        if lower.starts_with("data:") {
            ImageSource::Inline(href.to_string())
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            ImageSource::Remote(href.to_string())
        } else {
            ImageSource::Local(href.to_string())
        }
    }

    pub fn is_cross_origin(&self) -> bool {
        matches!(self, ImageSource::Remote(_))
    }

    pub fn href(&self) -> &str {
        match self {
            ImageSource::Inline(s) | ImageSource::Local(s) | ImageSource::Remote(s) => s,
        }
    }
}

/// A single drawing instruction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    /// Filled and/or stroked rectangle.
    Rect {
        bbox: BBox,
        fill: Option<Color>,
        stroke: Option<Color>,
        stroke_width: f64,
    },
    /// One line of text. `top` is the top of the line box.
    Text {
        x: f64,
        top: f64,
        size: f64,
        anchor: TextAnchor,
        color: Color,
        content: String,
    },
    /// An image scaled into `bbox`.
    Image { bbox: BBox, source: ImageSource },
}

impl Node {
    /// Area the node paints into (text uses an estimated advance).
    pub fn bounds(&self) -> BBox {
        match self {
            Node::Rect { bbox, .. } | Node::Image { bbox, .. } => *bbox,
            Node::Text {
                x,
                top,
                size,
                anchor,
                content,
                ..
            } => {
                let width = estimate_text_width(content, *size);
                let x0 = match anchor {
                    TextAnchor::Start => *x,
                    TextAnchor::Middle => x - width / 2.0,
                    TextAnchor::End => x - width,
                };
                BBox::new(x0, *top, x0 + width, top + size * LINE_HEIGHT)
            }
        }
    }

    /// Text content, if this is a text node.
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Text { content, .. } => Some(content),
            _ => None,
        }
    }
}

/// Line box height as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.5;

/// Rough advance of `text` at `size` px, for layout without font access.
pub fn estimate_text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * 0.55
}

/// A named area of a document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    /// Stable identifier used to address the region.
    pub id: String,
    /// Area of the region in document coordinates.
    pub bbox: BBox,
    /// Drawing nodes in paint order.
    pub nodes: Vec<Node>,
}

impl Region {
    pub fn new(id: impl Into<String>, bbox: BBox) -> Self {
        Self {
            id: id.into(),
            bbox,
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// All text runs in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(Node::text)
    }
}

/// A rendered view: a viewport and the regions laid out in it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    /// Visible window size.
    pub viewport: Size,
    /// Regions in paint order.
    pub regions: Vec<Region>,
}

impl Document {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            regions: Vec::new(),
        }
    }

    pub fn push(&mut self, region: Region) {
        self.regions.push(region);
    }

    /// Look up a region by identifier.
    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Full scrollable size: the viewport grown to cover every region and
    /// every node.
    pub fn scroll_size(&self) -> Size {
        let extent = self
            .regions
            .iter()
            .flat_map(|r| std::iter::once(r.bbox).chain(r.nodes.iter().map(Node::bounds)))
            .fold(self.viewport.to_bbox(), |acc, b| acc.union(&b));
        Size::new(extent.x1.max(0.0), extent.bottom.max(0.0))
    }
}
