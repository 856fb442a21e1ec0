//! Bounding boxes in page coordinate space.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
///
/// Coordinates follow the extractor's page space: x grows to the right and
/// y grows downward, so `y0` is the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f64,
    /// Top edge
    pub y0: f64,
    /// Right edge
    pub x1: f64,
    /// Bottom edge
    pub y1: f64,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Build a box from the `[x0, y0, x1, y1]` array form extractors emit.
    pub fn from_array(rect: [f64; 4]) -> Self {
        Self::new(rect[0], rect[1], rect[2], rect[3])
    }

    /// Width of the box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Horizontal midpoint.
    pub fn mid_x(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    /// Vertical midpoint.
    pub fn mid_y(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }

    /// Center point as `(x, y)`.
    pub fn center(&self) -> (f64, f64) {
        (self.mid_x(), self.mid_y())
    }

    /// Euclidean distance between the centers of two boxes.
    pub fn center_distance(&self, other: &BBox) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        (ax - bx).hypot(ay - by)
    }

    /// Absolute vertical distance between the centers of two boxes.
    pub fn vertical_center_distance(&self, other: &BBox) -> f64 {
        (self.mid_y() - other.mid_y()).abs()
    }

    /// Check whether the vertical line at `x` passes strictly through the box.
    pub fn straddles(&self, x: f64) -> bool {
        self.x0 < x && x < self.x1
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// Describe why the box is unusable, or `None` if it is well formed.
    pub fn defect(&self) -> Option<String> {
        let coords = [self.x0, self.y0, self.x1, self.y1];
        if coords.iter().any(|c| !c.is_finite()) {
            return Some(format!("non-finite bounding box {:?}", coords));
        }
        if self.x0 >= self.x1 {
            return Some(format!("x0 ({}) >= x1 ({})", self.x0, self.x1));
        }
        if self.y0 >= self.y1 {
            return Some(format!("y0 ({}) >= y1 ({})", self.y0, self.y1));
        }
        None
    }

    /// Check whether the box is well formed.
    pub fn is_valid(&self) -> bool {
        self.defect().is_none()
    }
}
