//! The scratch path that shapes build their geometry into.
//!
//! A document owns a single [`PathBuilder`].  Each shape clears it, adds its outline,
//! and then hands it to the canvas to be filled and stroked.  Reusing one buffer means
//! that rendering a document with thousands of shapes does not allocate a path for
//! each of them.
//!
//! The builder stores Cairo path segments directly.  Elliptical arcs and quadratic
//! curves are converted to cubic Bézier curves as soon as they are added, so the
//! stored path only ever has move-to, line-to, curve-to and close-path commands.

use std::f64::consts::*;

use cairo::PathSegment;

use crate::path_parser::{self, ParseError};
use crate::rect::Rect;

/// Control point distance for approximating a quarter of a circle with a cubic curve.
pub const KAPPA: f64 = 0.552_284_749_830_79;

/// Whether an arc's sweep should be >= 180 degrees, or smaller.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LargeArc(pub bool);

/// Angular direction in which an arc is drawn.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Sweep {
    Negative,
    Positive,
}

/// A cubic Bézier segment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CubicBezierCurve {
    /// The (x, y) coordinates of the first control point.
    pub pt1: (f64, f64),
    /// The (x, y) coordinates of the second control point.
    pub pt2: (f64, f64),
    /// The (x, y) coordinates of the end point of this path segment.
    pub to: (f64, f64),
}

/// Conversion from endpoint parameterization to center parameterization.
///
/// SVG path data specifies elliptical arcs in terms of their endpoints, but
/// they are easier to process if they are converted to a center parameterization.
///
/// When attempting to compute the center parameterization of the arc,
/// out of range parameters may see an arc omitted or treated as a line.
pub enum ArcParameterization {
    /// Center parameterization of the arc.
    CenterParameters {
        /// Center of the ellipse.
        center: (f64, f64),
        /// Radii of the ellipse (corrected).
        radii: (f64, f64),
        /// Angle of the start point.
        theta1: f64,
        /// Delta angle to the end point.
        delta_theta: f64,
    },
    /// Treat the arc as a line to the end point.
    LineTo,
    /// Omit the arc.
    Omit,
}

/// An elliptical arc in terms of its endpoints, as in the `A` path command.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticalArc {
    /// The (x-axis, y-axis) radii for the ellipse.
    pub r: (f64, f64),
    /// The rotation angle in degrees for the ellipse's x-axis
    /// relative to the x-axis of the user coordinate system.
    pub x_axis_rotation: f64,
    pub large_arc: LargeArc,
    pub sweep: Sweep,
    /// The (x, y) coordinates for the start point of this path segment.
    pub from: (f64, f64),
    /// The (x, y) coordinates for the end point of this path segment.
    pub to: (f64, f64),
}

impl EllipticalArc {
    /// Calculates a center parameterization from the endpoint parameterization.
    ///
    /// Radii may be adjusted if there is no solution.
    ///
    /// See section [B.2.4. Conversion from endpoint to center
    /// parameterization](https://www.w3.org/TR/SVG2/implnote.html#ArcConversionEndpointToCenter)
    pub(crate) fn center_parameterization(&self) -> ArcParameterization {
        let Self {
            r: (mut rx, mut ry),
            x_axis_rotation,
            large_arc,
            sweep,
            from: (x1, y1),
            to: (x2, y2),
        } = *self;

        // A degenerate radius turns the arc into a straight line.  This also keeps
        // us from dividing by the square of the radii below.
        if rx * rx < f64::EPSILON || ry * ry < f64::EPSILON {
            return ArcParameterization::LineTo;
        }

        let is_large_arc = large_arc.0;
        let is_positive_sweep = sweep == Sweep::Positive;

        let (sin_phi, cos_phi) = x_axis_rotation.to_radians().sin_cos();

        rx = rx.abs();
        ry = ry.abs();

        // Translate the origin to the midpoint of the chord, and rotate the axes
        // to line up with the ellipse's axes.  Primed names are in that space.
        let mid_x = (x1 - x2) / 2.0;
        let mid_y = (y1 - y2) / 2.0;
        let x1_ = cos_phi * mid_x + sin_phi * mid_y;
        let y1_ = -sin_phi * mid_x + cos_phi * mid_y;

        // Scale up radii that are too small for the chord.
        let lambda = (x1_ / rx).powi(2) + (y1_ / ry).powi(2);
        if lambda > 1.0 {
            rx *= lambda.sqrt();
            ry *= lambda.sqrt();
        }

        let d = (rx * y1_).powi(2) + (ry * x1_).powi(2);
        if d == 0.0 {
            return ArcParameterization::Omit;
        }

        let k = {
            let mut k = ((rx * ry).powi(2) / d - 1.0).abs().sqrt();
            if is_positive_sweep == is_large_arc {
                k = -k;
            }
            k
        };
        let cx_ = k * rx * y1_ / ry;
        let cy_ = -k * ry * x1_ / rx;

        let cx = cos_phi * cx_ - sin_phi * cy_ + (x1 + x2) / 2.0;
        let cy = sin_phi * cx_ + cos_phi * cy_ + (y1 + y2) / 2.0;

        // Start angle.
        let ux = (x1_ - cx_) / rx;
        let uy = (y1_ - cy_) / ry;
        let u_len = (ux * ux + uy * uy).sqrt();
        if u_len == 0.0 {
            return ArcParameterization::Omit;
        }
        let cos_theta1 = (ux / u_len).clamp(-1.0, 1.0);
        let theta1 = if uy < 0.0 {
            -cos_theta1.acos()
        } else {
            cos_theta1.acos()
        };

        // Sweep angle.
        let vx = (-x1_ - cx_) / rx;
        let vy = (-y1_ - cy_) / ry;
        let v_len = (vx * vx + vy * vy).sqrt();
        if v_len == 0.0 {
            return ArcParameterization::Omit;
        }
        let dp_uv = ux * vx + uy * vy;
        let cos_delta_theta = (dp_uv / (u_len * v_len)).clamp(-1.0, 1.0);
        let delta_theta = {
            let mut delta_theta = cos_delta_theta.acos();
            if ux * vy - uy * vx < 0.0 {
                delta_theta = -delta_theta;
            }
            if is_positive_sweep && delta_theta < 0.0 {
                delta_theta += PI * 2.0;
            } else if !is_positive_sweep && delta_theta > 0.0 {
                delta_theta -= PI * 2.0;
            }
            delta_theta
        };

        ArcParameterization::CenterParameters {
            center: (cx, cy),
            radii: (rx, ry),
            theta1,
            delta_theta,
        }
    }
}

/// Turns a piece of an elliptical arc, at most a quarter turn, into a cubic curve.
///
/// Takes the center, the radii and the x-axis rotation of the ellipse,
/// and the angles of the start and end points.
pub(crate) fn arc_segment(
    c: (f64, f64),
    r: (f64, f64),
    x_axis_rotation: f64,
    th0: f64,
    th1: f64,
) -> CubicBezierCurve {
    let (cx, cy) = c;
    let (rx, ry) = r;
    let (sin_phi, cos_phi) = x_axis_rotation.to_radians().sin_cos();
    let (sin_th0, cos_th0) = th0.sin_cos();
    let (sin_th1, cos_th1) = th1.sin_cos();

    let th_half = 0.5 * (th1 - th0);
    let t = (8.0 / 3.0) * (th_half * 0.5).sin().powi(2) / th_half.sin();
    let x1 = rx * (cos_th0 - t * sin_th0);
    let y1 = ry * (sin_th0 + t * cos_th0);
    let x3 = rx * cos_th1;
    let y3 = ry * sin_th1;
    let x2 = x3 + rx * (t * sin_th1);
    let y2 = y3 + ry * (-t * cos_th1);

    let rotate = |x: f64, y: f64| (cx + cos_phi * x - sin_phi * y, cy + sin_phi * x + cos_phi * y);

    CubicBezierCurve {
        pt1: rotate(x1, y1),
        pt2: rotate(x2, y2),
        to: rotate(x3, y3),
    }
}

/// A reusable buffer of path segments.
#[derive(Debug, Default)]
pub struct PathBuilder {
    segments: Vec<PathSegment>,

    /// End point of the last segment.
    current: (f64, f64),

    /// Start point of the current subpath; close-path goes back here.
    subpath_start: (f64, f64),
}

impl PathBuilder {
    pub fn new() -> PathBuilder {
        PathBuilder::default()
    }

    /// Removes all the segments, keeping the allocated storage.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.current = (0.0, 0.0);
        self.subpath_start = (0.0, 0.0);
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn current_point(&self) -> (f64, f64) {
        self.current
    }

    /// Parses SVG path data and appends it.
    ///
    /// On error, the segments parsed before the error are kept.
    pub fn parse(&mut self, path_str: &str) -> Result<(), ParseError> {
        path_parser::parse_path(self, path_str)
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.segments.push(PathSegment::MoveTo((x, y)));
        self.current = (x, y);
        self.subpath_start = (x, y);
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.segments.push(PathSegment::LineTo((x, y)));
        self.current = (x, y);
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.segments
            .push(PathSegment::CurveTo((x1, y1), (x2, y2), (x3, y3)));
        self.current = (x3, y3);
    }

    /// Adds a quadratic curve from the current point, raised to a cubic one.
    pub fn quad_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let (x0, y0) = self.current;

        self.curve_to(
            (x0 + 2.0 * x1) / 3.0,
            (y0 + 2.0 * y1) / 3.0,
            (x2 + 2.0 * x1) / 3.0,
            (y2 + 2.0 * y1) / 3.0,
            x2,
            y2,
        );
    }

    /// Adds an elliptical arc from the current point to `(x, y)` as a series of curves.
    pub fn arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: LargeArc,
        sweep: Sweep,
        x: f64,
        y: f64,
    ) {
        let arc = EllipticalArc {
            r: (rx, ry),
            x_axis_rotation,
            large_arc,
            sweep,
            from: self.current,
            to: (x, y),
        };

        match arc.center_parameterization() {
            ArcParameterization::CenterParameters {
                center,
                radii,
                theta1,
                delta_theta,
            } => {
                let n_segs = (delta_theta / (FRAC_PI_2 + 0.001)).abs().ceil() as u32;
                let d_theta = delta_theta / f64::from(n_segs);

                let mut theta = theta1;
                for _ in 0..n_segs {
                    let c = arc_segment(center, radii, x_axis_rotation, theta, theta + d_theta);
                    self.curve_to(c.pt1.0, c.pt1.1, c.pt2.0, c.pt2.1, c.to.0, c.to.1);
                    theta += d_theta;
                }

                // Land exactly on the end point, whatever the rounding in the segments.
                self.current = (x, y);
            }

            ArcParameterization::LineTo => self.line_to(x, y),

            ArcParameterization::Omit => (),
        }
    }

    pub fn close_path(&mut self) {
        self.segments.push(PathSegment::ClosePath);
        self.current = self.subpath_start;
    }

    pub fn add_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.move_to(x, y);
        self.line_to(x + w, y);
        self.line_to(x + w, y + h);
        self.line_to(x, y + h);
        self.close_path();
    }

    /// Adds a rectangle with elliptical corners.
    ///
    /// The radii are clamped to half the width and height; if either is zero or
    /// negative, the corners are square.
    pub fn add_round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, rx: f64, ry: f64) {
        if rx <= 0.0 || ry <= 0.0 {
            self.add_rect(x, y, w, h);
            return;
        }

        let rx = rx.min(w * 0.5);
        let ry = ry.min(h * 0.5);

        let right = x + w;
        let bottom = y + h;

        let cpx = rx * KAPPA;
        let cpy = ry * KAPPA;

        self.move_to(x, y + ry);
        self.curve_to(x, y + ry - cpy, x + rx - cpx, y, x + rx, y);
        self.line_to(right - rx, y);
        self.curve_to(right - rx + cpx, y, right, y + ry - cpy, right, y + ry);
        self.line_to(right, bottom - ry);
        self.curve_to(right, bottom - ry + cpy, right - rx + cpx, bottom, right - rx, bottom);
        self.line_to(x + rx, bottom);
        self.curve_to(x + rx - cpx, bottom, x, bottom - ry + cpy, x, bottom - ry);
        self.line_to(x, y + ry);
        self.close_path();
    }

    /// Adds an ellipse as four cubic curves, starting at the top.
    pub fn add_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64) {
        let left = cx - rx;
        let top = cy - ry;
        let right = cx + rx;
        let bottom = cy + ry;

        let cpx = rx * KAPPA;
        let cpy = ry * KAPPA;

        self.move_to(cx, top);
        self.curve_to(cx + cpx, top, right, cy - cpy, right, cy);
        self.curve_to(right, cy + cpy, cx + cpx, bottom, cx, bottom);
        self.curve_to(cx - cpx, bottom, left, cy + cpy, left, cy);
        self.curve_to(left, cy - cpy, cx - cpx, top, cx, top);
        self.close_path();
    }

    pub fn add_circle(&mut self, cx: f64, cy: f64, r: f64) {
        self.add_ellipse(cx, cy, r, r);
    }

    /// Computes the bounding box of all the points in the path, control points included.
    ///
    /// This is not a tight bound for curves, but it never misses any part of the path.
    /// Returns `None` for an empty path.
    pub fn extents(&self) -> Option<Rect> {
        segments_extents(&self.segments)
    }

    /// Feeds the path to a Cairo context, replacing its current path.
    pub fn to_cairo(&self, cr: &cairo::Context) -> Result<(), cairo::Error> {
        cr.new_path();

        for segment in &self.segments {
            match *segment {
                PathSegment::MoveTo((x, y)) => cr.move_to(x, y),
                PathSegment::LineTo((x, y)) => cr.line_to(x, y),
                PathSegment::CurveTo((x1, y1), (x2, y2), (x3, y3)) => {
                    cr.curve_to(x1, y1, x2, y2, x3, y3)
                }
                PathSegment::ClosePath => cr.close_path(),
            }
        }

        // Coordinates out of Cairo's fixed-point range put the context in an error
        // state; report it here instead of at the next drawing call.
        cr.status()
    }
}

/// Bounding box of the end points and control points of `segments`.
pub fn segments_extents(segments: &[PathSegment]) -> Option<Rect> {
    let mut bounds: Option<Rect> = None;

    let mut add = |(x, y): (f64, f64)| {
        bounds = Some(match bounds {
            None => Rect::new(x, y, x, y),
            Some(r) => Rect::new(r.x0.min(x), r.y0.min(y), r.x1.max(x), r.y1.max(y)),
        });
    };

    for segment in segments {
        match *segment {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => add(p),
            PathSegment::CurveTo(p1, p2, p3) => {
                add(p1);
                add(p2);
                add(p3);
            }
            PathSegment::ClosePath => (),
        }
    }

    bounds
}
