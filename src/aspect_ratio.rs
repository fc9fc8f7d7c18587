//! Handling of `preserveAspectRatio` values.
//!
//! We have an [`AspectRatio`] struct which encapsulates such a value.  It is used
//! in two ways: to map a `viewBox` onto a viewport, and to fit an embedded
//! raster image into its destination rectangle.
//!
//! ```
//! # use minisvg::doctest_only::AspectRatio;
//! # use minisvg::doctest_only::Parse;
//! assert_eq!(
//!     AspectRatio::parse_str("xMidYMid").unwrap(),
//!     AspectRatio::default()
//! );
//! ```

use cssparser::{BasicParseError, Parser};

use crate::error::*;
use crate::parse_identifiers;
use crate::parsers::Parse;
use crate::rect::Rect;
use crate::transform::Transform;
use crate::viewbox::ViewBox;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
enum FitMode {
    #[default]
    Meet,
    Slice,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
enum Align1D {
    Min,
    #[default]
    Mid,
    Max,
}

impl Align1D {
    fn compute(self, dest_pos: f64, dest_size: f64, obj_size: f64) -> f64 {
        match self {
            Align1D::Min => dest_pos,
            Align1D::Mid => dest_pos + (dest_size - obj_size) / 2.0,
            Align1D::Max => dest_pos + dest_size - obj_size,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct Align {
    x: Align1D,
    y: Align1D,
    fit: FitMode,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AspectRatio {
    align: Option<Align>,
}

impl Default for AspectRatio {
    fn default() -> AspectRatio {
        AspectRatio {
            align: Some(Align::default()),
        }
    }
}

impl AspectRatio {
    /// Computes the rectangle in the viewport that the viewBox gets mapped to.
    pub fn compute(&self, vbox: &ViewBox, viewport: &Rect) -> Rect {
        match self.align {
            None => *viewport,

            Some(Align { x, y, fit }) => {
                let (vb_width, vb_height) = vbox.rect().size();
                let (vp_width, vp_height) = viewport.size();

                let w_factor = vp_width / vb_width;
                let h_factor = vp_height / vb_height;

                let factor = match fit {
                    FitMode::Meet => w_factor.min(h_factor),
                    FitMode::Slice => w_factor.max(h_factor),
                };

                let w = vb_width * factor;
                let h = vb_height * factor;

                let xpos = x.compute(viewport.x0, vp_width, w);
                let ypos = y.compute(viewport.y0, vp_height, h);

                Rect::new(xpos, ypos, xpos + w, ypos + h)
            }
        }
    }

    /// Computes the viewport to viewbox transformation.
    ///
    /// The viewport is the rectangle `(0, 0, width, height)` in the current user space.
    /// The `(vbox.x0, vbox.y0)` corner is mapped to the viewport's upper-left corner
    /// for `none`, or to wherever the alignment puts it otherwise.  Content that does
    /// not fit with `slice` is not clipped here.
    pub fn viewport_to_viewbox_transform(
        &self,
        vbox: &ViewBox,
        width: f64,
        height: f64,
    ) -> Transform {
        let r = self.compute(vbox, &Rect::from_size(width, height));

        Transform::new_translate(r.x0, r.y0)
            .pre_scale(r.width() / vbox.width(), r.height() / vbox.height())
            .pre_translate(-vbox.rect().x0, -vbox.rect().y0)
    }

    /// Fits an image of size `src` into the rectangle `dst`.
    ///
    /// Returns the adjusted `(dst, src)` pair: `meet` shrinks the destination so that
    /// the whole image is visible, and `slice` crops the source so that the
    /// destination is covered.  With `none`, both are returned unchanged and the image
    /// gets stretched.
    pub fn fit_image(&self, dst: Rect, src: Rect) -> (Rect, Rect) {
        let Some(Align { x, y, fit }) = self.align else {
            return (dst, src);
        };

        let (view_width, view_height) = dst.size();
        let (image_width, image_height) = src.size();
        let scale = image_height / image_width;

        let (mut dst, mut src) = (dst, src);

        match fit {
            FitMode::Meet => {
                if view_height > view_width * scale {
                    let h = view_width * scale;
                    let y0 = y.compute(dst.y0, view_height, h);
                    dst = Rect::from_xywh(dst.x0, y0, dst.width(), h);
                }

                if view_width > view_height / scale {
                    let w = view_height / scale;
                    let x0 = x.compute(dst.x0, view_width, w);
                    dst = Rect::from_xywh(x0, dst.y0, w, dst.height());
                }
            }

            FitMode::Slice => {
                if view_height < view_width * scale {
                    let h = view_height * (image_width / view_width);
                    let y0 = y.compute(src.y0, image_height, h);
                    src = Rect::from_xywh(src.x0, y0, src.width(), h);
                }

                if view_width < view_height / scale {
                    let w = view_width * (image_height / view_height);
                    let x0 = x.compute(src.x0, image_width, w);
                    src = Rect::from_xywh(x0, src.y0, w, src.height());
                }
            }
        }

        (dst, src)
    }
}

fn parse_align_xy<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<Option<(Align1D, Align1D)>, BasicParseError<'i>> {
    use self::Align1D::*;

    parse_identifiers!(
        parser,

        "none" => None,

        "xMinYMin" => Some((Min, Min)),
        "xMidYMin" => Some((Mid, Min)),
        "xMaxYMin" => Some((Max, Min)),

        "xMinYMid" => Some((Min, Mid)),
        "xMidYMid" => Some((Mid, Mid)),
        "xMaxYMid" => Some((Max, Mid)),

        "xMinYMax" => Some((Min, Max)),
        "xMidYMax" => Some((Mid, Max)),
        "xMaxYMax" => Some((Max, Max)),
    )
}

fn parse_fit_mode<'i>(parser: &mut Parser<'i, '_>) -> Result<FitMode, BasicParseError<'i>> {
    parse_identifiers!(
        parser,
        "meet" => FitMode::Meet,
        "slice" => FitMode::Slice,
    )
}

impl Parse for AspectRatio {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<AspectRatio, ParseError<'i>> {
        let align = match parser.try_parse(parse_align_xy)? {
            None => None,

            Some((x, y)) => {
                let fit = parser.try_parse(parse_fit_mode).unwrap_or_default();
                Some(Align { x, y, fit })
            }
        };

        Ok(AspectRatio { align })
    }
}
