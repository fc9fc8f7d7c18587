//! Affine matrices, and the `transform` and `gradientTransform` attributes.
//!
//! The renderer keeps one [`Transform`] per render state; it maps the element's user
//! space to the canvas.  Matrices use Cairo's layout, so they convert to and from
//! `cairo::Matrix` without any reordering.

use cssparser::{Parser, Token};

use crate::error::*;
use crate::parsers::{optional_comma, parse_numbers, Parse};
use crate::rect::Rect;

/// A 2×3 affine matrix.
///
/// A point `(x, y)` maps to `(xx·x + xy·y + x0, yx·x + yy·y + y0)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Transform {
    /// Builds a matrix from its coefficients, in the same order as `matrix()`.
    ///
    /// Singular matrices are allowed; shapes under them just collapse.
    #[inline]
    pub fn new(xx: f64, yx: f64, xy: f64, yy: f64, x0: f64, y0: f64) -> Self {
        Transform {
            xx,
            yx,
            xy,
            yy,
            x0,
            y0,
        }
    }

    #[inline]
    pub fn identity() -> Self {
        Transform::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    #[inline]
    pub fn new_translate(tx: f64, ty: f64) -> Self {
        Transform::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    #[inline]
    pub fn new_scale(sx: f64, sy: f64) -> Self {
        Transform::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// The matrix that applies `first` and then `second`.
    #[must_use]
    pub fn multiply(first: &Transform, second: &Transform) -> Self {
        let (a, b) = (first, second);

        Transform {
            xx: a.xx * b.xx + a.yx * b.xy,
            yx: a.xx * b.yx + a.yx * b.yy,
            xy: a.xy * b.xx + a.yy * b.xy,
            yy: a.xy * b.yx + a.yy * b.yy,
            x0: a.x0 * b.xx + a.y0 * b.xy + b.x0,
            y0: a.x0 * b.yx + a.y0 * b.yy + b.y0,
        }
    }

    /// Applies `inner` before `self`.
    ///
    /// This is how a child's coordinate system is nested inside its parent's:
    /// `parent.pre_transform(&child_transform)`.
    #[inline]
    #[must_use]
    pub fn pre_transform(&self, inner: &Transform) -> Self {
        Transform::multiply(inner, self)
    }

    #[inline]
    #[must_use]
    pub fn pre_translate(&self, tx: f64, ty: f64) -> Self {
        self.pre_transform(&Transform::new_translate(tx, ty))
    }

    #[inline]
    #[must_use]
    pub fn pre_scale(&self, sx: f64, sy: f64) -> Self {
        self.pre_transform(&Transform::new_scale(sx, sy))
    }

    /// Returns `None` for singular matrices, or ones with non-finite coefficients.
    #[must_use]
    pub fn invert(&self) -> Option<Self> {
        let det = self.xx * self.yy - self.xy * self.yx;

        if det == 0.0 || !det.is_finite() {
            return None;
        }

        Some(Transform::new(
            self.yy / det,
            -self.yx / det,
            -self.xy / det,
            self.xx / det,
            (self.xy * self.y0 - self.yy * self.x0) / det,
            (self.yx * self.x0 - self.xx * self.y0) / det,
        ))
    }

    #[inline]
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.xx * x + self.xy * y + self.x0,
            self.yx * x + self.yy * y + self.y0,
        )
    }

    /// Maps the four corners of `rect` and returns their bounding box.
    ///
    /// This is how extents travel between coordinate systems; under a rotation the
    /// result is larger than the original rectangle.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let corners = [
            self.transform_point(rect.x0, rect.y0),
            self.transform_point(rect.x1, rect.y0),
            self.transform_point(rect.x0, rect.y1),
            self.transform_point(rect.x1, rect.y1),
        ];

        let (x, y) = corners[0];
        let start = Rect::new(x, y, x, y);

        corners[1..].iter().fold(start, |r, &(x, y)| Rect {
            x0: r.x0.min(x),
            y0: r.y0.min(y),
            x1: r.x1.max(x),
            y1: r.y1.max(y),
        })
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Transform {
        Transform::identity()
    }
}

impl From<cairo::Matrix> for Transform {
    #[inline]
    fn from(m: cairo::Matrix) -> Self {
        Transform::new(m.xx(), m.yx(), m.xy(), m.yy(), m.x0(), m.y0())
    }
}

impl From<Transform> for cairo::Matrix {
    #[inline]
    fn from(t: Transform) -> Self {
        cairo::Matrix::new(t.xx, t.yx, t.xy, t.yy, t.x0, t.y0)
    }
}

/// Transform functions, and how many numbers each one takes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Function {
    Matrix,
    Translate,
    Scale,
    Rotate,
    SkewX,
    SkewY,
}

impl Function {
    fn from_name(name: &str) -> Option<Function> {
        match name {
            "matrix" => Some(Function::Matrix),
            "translate" => Some(Function::Translate),
            "scale" => Some(Function::Scale),
            "rotate" => Some(Function::Rotate),
            "skewX" => Some(Function::SkewX),
            "skewY" => Some(Function::SkewY),
            _ => None,
        }
    }

    fn accepts(self, count: usize) -> bool {
        match self {
            Function::Matrix => count == 6,
            Function::Translate | Function::Scale => count == 1 || count == 2,
            Function::Rotate => count == 1 || count == 3,
            Function::SkewX | Function::SkewY => count == 1,
        }
    }

    /// Builds the matrix from `args`, of which the first `count` were given.
    fn to_transform(self, args: &[f64; 6], count: usize) -> Transform {
        match self {
            Function::Matrix => {
                let [xx, yx, xy, yy, x0, y0] = *args;
                Transform::new(xx, yx, xy, yy, x0, y0)
            }

            Function::Translate => {
                let ty = if count == 2 { args[1] } else { 0.0 };
                Transform::new_translate(args[0], ty)
            }

            Function::Scale => {
                let sy = if count == 2 { args[1] } else { args[0] };
                Transform::new_scale(args[0], sy)
            }

            Function::Rotate => {
                let (s, c) = args[0].to_radians().sin_cos();
                let rotation = Transform::new(c, s, -s, c, 0.0, 0.0);

                if count == 3 {
                    let (cx, cy) = (args[1], args[2]);
                    Transform::new_translate(cx, cy)
                        .pre_transform(&rotation)
                        .pre_translate(-cx, -cy)
                } else {
                    rotation
                }
            }

            Function::SkewX => Transform::new(1.0, 0.0, args[0].to_radians().tan(), 1.0, 0.0, 0.0),

            Function::SkewY => Transform::new(1.0, args[0].to_radians().tan(), 0.0, 1.0, 0.0, 0.0),
        }
    }
}

/// A list of transform functions; later ones apply first, as if each one were
/// a nested group.  An empty list is the identity.
impl Parse for Transform {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Transform, ParseError<'i>> {
        let mut transform = Transform::identity();

        while !parser.is_exhausted() {
            let t = parse_function(parser)?;
            transform = transform.pre_transform(&t);
            optional_comma(parser);
        }

        Ok(transform)
    }
}

fn parse_function<'i>(parser: &mut Parser<'i, '_>) -> Result<Transform, ParseError<'i>> {
    let loc = parser.current_source_location();

    // "rotate(30)" is a single function token, but "rotate (30)" is an identifier
    // followed by a parenthesis block.
    let name = match parser.next()?.clone() {
        Token::Function(name) => name,

        Token::Ident(name) => {
            parser.expect_parenthesis_block()?;
            name
        }

        tok => return Err(loc.new_unexpected_token_error(tok)),
    };

    let function = Function::from_name(&name).ok_or_else(|| {
        loc.new_custom_error(ValueErrorKind::parse_error(
            "expected matrix, translate, scale, rotate, skewX or skewY",
        ))
    })?;

    parser.parse_nested_block(|p| {
        let loc = p.current_source_location();
        let (args, count) = parse_numbers::<6>(p)?;

        if function.accepts(count) {
            Ok(function.to_transform(&args, count))
        } else {
            Err(loc.new_custom_error(ValueErrorKind::parse_error(
                "wrong number of arguments for transform function",
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq_cairo;

    fn parse(s: &str) -> Transform {
        Transform::parse_str(s).unwrap()
    }

    #[test]
    fn multiply_applies_first_argument_first() {
        let scale = Transform::new_scale(2.0, 2.0);
        let translate = Transform::new_translate(10.0, 0.0);

        let t = Transform::multiply(&scale, &translate);
        assert_eq!(t.transform_point(1.0, 1.0), (12.0, 2.0));

        let t = Transform::multiply(&translate, &scale);
        assert_eq!(t.transform_point(1.0, 1.0), (22.0, 2.0));
    }

    #[test]
    fn pre_transform_nests_the_child() {
        let parent = Transform::new_translate(5.0, 5.0);
        let child = parent.pre_scale(3.0, 3.0);
        assert_eq!(child.transform_point(1.0, 2.0), (8.0, 11.0));
    }

    #[test]
    fn invert_undoes_the_matrix() {
        let t = Transform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let inverse = t.invert().unwrap();
        assert_approx_eq_cairo!(t.pre_transform(&inverse), Transform::identity());

        assert!(Transform::new_scale(0.0, 1.0).invert().is_none());
        assert!(Transform::new(f64::MAX, 0.0, 0.0, f64::MAX, 0.0, 0.0)
            .invert()
            .is_none());
    }

    #[test]
    fn rect_becomes_bounding_box_of_its_corners() {
        let rotate = parse("rotate(90)");
        assert_approx_eq_cairo!(
            rotate.transform_rect(&Rect::from_size(10.0, 5.0)),
            Rect::new(-5.0, 0.0, 0.0, 10.0)
        );

        let t = Transform::new_translate(1.0, 2.0).pre_scale(2.0, 3.0);
        assert_eq!(
            t.transform_rect(&Rect::new(1.0, 1.0, 2.0, 2.0)),
            Rect::new(3.0, 5.0, 5.0, 8.0)
        );
    }

    #[test]
    fn parses_each_function() {
        assert_eq!(parse("matrix(1,2.25,-3.25e2,4 5 6)"), Transform::new(1.0, 2.25, -325.0, 4.0, 5.0, 6.0));
        assert_eq!(parse("translate(-1)"), Transform::new_translate(-1.0, 0.0));
        assert_eq!(parse("translate(-1, -2)"), Transform::new_translate(-1.0, -2.0));
        assert_eq!(parse("scale (-1)"), Transform::new_scale(-1.0, -1.0));
        assert_eq!(parse("scale(2 3)"), Transform::new_scale(2.0, 3.0));

        let tan = 30.0_f64.to_radians().tan();
        assert_approx_eq_cairo!(parse("skewX(30)"), Transform::new(1.0, 0.0, tan, 1.0, 0.0, 0.0));
        assert_approx_eq_cairo!(parse("skewY (30)"), Transform::new(1.0, tan, 0.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn rotates_around_a_center() {
        let t = parse("rotate(90 10 10)");
        let (x, y) = t.transform_point(20.0, 10.0);
        assert_approx_eq_cairo!(x, 10.0);
        assert_approx_eq_cairo!(y, 20.0);
    }

    #[test]
    fn later_functions_apply_first() {
        let t = parse("translate(20, 30), scale (10)");
        assert_eq!(t.transform_point(1.0, 1.0), (30.0, 40.0));

        let t = parse("scale(10)translate(20 30)");
        assert_eq!(t.transform_point(1.0, 1.0), (210.0, 310.0));
    }

    #[test]
    fn empty_list_is_identity() {
        assert_eq!(parse(""), Transform::identity());
        assert_eq!(parse("   "), Transform::identity());
    }

    #[test]
    fn singular_matrix_is_still_a_value() {
        let t = parse("scale (0), translate (10, 10)");
        assert!(t.invert().is_none());
    }

    #[test]
    fn rejects_bad_lists() {
        for s in [
            "foo",
            "foo(1)",
            "matrix (1 2 3 4 5)",
            "translate(1 2 3)",
            "translate (1,)",
            "rotate(1 2)",
            "skewX (1,2)",
            "skewY ()",
            "skewY",
            "scale(2) x",
            "scale(2)1",
        ] {
            assert!(Transform::parse_str(s).is_err(), "{s} should not parse");
        }
    }

    #[test]
    fn converts_to_and_from_cairo() {
        let t = Transform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(Transform::from(cairo::Matrix::from(t)), t);
    }
}
