/// Bounding box with top-left origin coordinate system.
///
/// Coordinates are CSS pixels of the laid-out document:
/// - `x0`: left edge
/// - `top`: top edge (distance from top of document)
/// - `x1`: right edge
/// - `bottom`: bottom edge (distance from top of document)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Build a box from its top-left corner and size.
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Compute the union of two bounding boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Overlap of two boxes, or `None` when they do not overlap with a
    /// positive area.
    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        let clipped = BBox {
            x0: self.x0.max(other.x0),
            top: self.top.max(other.top),
            x1: self.x1.min(other.x1),
            bottom: self.bottom.min(other.bottom),
        };
        if clipped.width() > 0.0 && clipped.height() > 0.0 {
            Some(clipped)
        } else {
            None
        }
    }
}

/// Width and height in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The box spanning `(0, 0)` to `(width, height)`.
    pub fn to_bbox(self) -> BBox {
        BBox::new(0.0, 0.0, self.width, self.height)
    }
}
