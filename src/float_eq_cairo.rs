//! Comparisons at the precision that Cairo can actually draw.
//!
//! Cairo converts coordinates to 24.8 fixed point, so two values that differ by less
//! than 1/256 end up at the same place on the canvas.  Geometry and matrices computed by
//! the renderer are compared with that tolerance instead of exact equality.

use float_cmp::ApproxEq;

use crate::rect::Rect;
use crate::transform::Transform;

const CAIRO_FIXED_FRAC_BITS: u64 = 8;

fn epsilon() -> f64 {
    1.0 / f64::from(1 << CAIRO_FIXED_FRAC_BITS)
}

pub trait ApproxEqCairo {
    fn approx_eq_cairo(self, other: Self) -> bool;
}

impl ApproxEqCairo for f64 {
    fn approx_eq_cairo(self, other: f64) -> bool {
        // Huge values are allowed to be 1 ulp apart.
        self.approx_eq(other, (epsilon(), 1))
    }
}

impl ApproxEqCairo for Rect {
    fn approx_eq_cairo(self, other: Rect) -> bool {
        self.x0.approx_eq_cairo(other.x0)
            && self.y0.approx_eq_cairo(other.y0)
            && self.x1.approx_eq_cairo(other.x1)
            && self.y1.approx_eq_cairo(other.y1)
    }
}

impl ApproxEqCairo for Transform {
    fn approx_eq_cairo(self, other: Transform) -> bool {
        self.xx.approx_eq_cairo(other.xx)
            && self.yx.approx_eq_cairo(other.yx)
            && self.xy.approx_eq_cairo(other.xy)
            && self.yy.approx_eq_cairo(other.yy)
            && self.x0.approx_eq_cairo(other.x0)
            && self.y0.approx_eq_cairo(other.y0)
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! assert_approx_eq_cairo {
    ($left:expr, $right:expr) => {{
        let (l, r) = ($left, $right);

        if !$crate::float_eq_cairo::ApproxEqCairo::approx_eq_cairo(l, r) {
            panic!(
                "assertion failed: `left ~= right` at Cairo precision\n  left: `{:?}`\n right: `{:?}`",
                l, r
            );
        }
    }};
}
