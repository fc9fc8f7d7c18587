//! Types for rectangles.

use float_cmp::approx_eq;

/// An axis-aligned rectangle given by two corners.
///
/// `(x0, y0)` is the top-left corner and `(x1, y1)` the bottom-right one.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

// Our own min() and max() that are acceptable for floating point
fn min(x: f64, y: f64) -> f64 {
    if x <= y {
        x
    } else {
        y
    }
}

fn max(x: f64, y: f64) -> f64 {
    if x >= y {
        x
    } else {
        y
    }
}

impl Rect {
    #[inline]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Creates a rectangle from its origin and size.
    #[inline]
    pub fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    #[inline]
    pub fn from_size(w: f64, h: f64) -> Self {
        Self::new(0.0, 0.0, w, h)
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x0
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y0
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    #[inline]
    pub fn size(&self) -> (f64, f64) {
        (self.width(), self.height())
    }

    /// Whether the rectangle has no area, or a negative size.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    #[inline]
    pub fn translate(&self, by: (f64, f64)) -> Self {
        Self {
            x0: self.x0 + by.0,
            y0: self.y0 + by.1,
            x1: self.x1 + by.0,
            y1: self.y1 + by.1,
        }
    }

    /// Grows the rectangle by `delta` on every side.
    #[inline]
    pub fn inflate(&self, delta: f64) -> Self {
        Self {
            x0: self.x0 - delta,
            y0: self.y0 - delta,
            x1: self.x1 + delta,
            y1: self.y1 + delta,
        }
    }

    #[inline]
    pub fn union(&self, rect: &Self) -> Self {
        Self {
            x0: min(self.x0, rect.x0),
            y0: min(self.y0, rect.y0),
            x1: max(self.x1, rect.x1),
            y1: max(self.y1, rect.y1),
        }
    }

    pub fn approx_eq(&self, other: &Self) -> bool {
        approx_eq!(f64, self.x0, other.x0, epsilon = 0.0001)
            && approx_eq!(f64, self.y0, other.y0, epsilon = 0.0001)
            && approx_eq!(f64, self.x1, other.x1, epsilon = 0.0001)
            && approx_eq!(f64, self.y1, other.y1, epsilon = 0.0001)
    }
}

/// Unions two optional rectangles; `None` means "nothing measured yet".
pub fn combine_rects(r1: Option<Rect>, r2: Option<Rect>) -> Option<Rect> {
    match (r1, r2) {
        (None, None) => None,
        (Some(r), None) | (None, Some(r)) => Some(r),
        (Some(r1), Some(r2)) => Some(r1.union(&r2)),
    }
}

impl From<cairo::Rectangle> for Rect {
    #[inline]
    fn from(r: cairo::Rectangle) -> Self {
        Self::from_xywh(r.x(), r.y(), r.width(), r.height())
    }
}
