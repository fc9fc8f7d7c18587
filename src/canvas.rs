//! The drawing surface that the renderer emits its output to.
//!
//! The renderer does not rasterize anything by itself.  It resolves geometry, paints,
//! and transforms, and passes them to a [`Canvas`] as complete drawing commands.
//! `cairo::Context` is the canvas used in practice; [`RecordingCanvas`] keeps the
//! commands as values, which is useful to test the renderer without looking at pixels.

use cairo::PathSegment;

use crate::color::RGBA;
use crate::error::RenderingError;
use crate::image::Image;
use crate::path_builder::{segments_extents, PathBuilder};
use crate::property_defs::{FillRule, SpreadMethod, StrokeLinecap, StrokeLinejoin};
use crate::rect::Rect;
use crate::transform::Transform;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GradientStop {
    /// Between 0 and 1, and never smaller than the offset of the previous stop.
    pub offset: f64,
    pub color: RGBA,
}

/// Parameters shared by linear and radial gradients.
///
/// `transform` maps gradient space to user space; for `objectBoundingBox` gradients it
/// already includes the mapping to the shape's bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientCommon {
    pub stops: Vec<GradientStop>,
    pub spread: SpreadMethod,
    pub transform: Transform,
}

/// A resolved paint.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Color(RGBA),

    LinearGradient {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        common: GradientCommon,
    },

    RadialGradient {
        cx: f64,
        cy: f64,
        r: f64,
        fx: f64,
        fy: f64,
        common: GradientCommon,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub line_cap: StrokeLinecap,
    pub line_join: StrokeLinejoin,
    pub miter_limit: f64,
    /// Dash lengths, or `None` for a solid line.
    pub dashes: Option<Vec<f64>>,
    pub dash_offset: f64,
}

/// Where an image goes.
///
/// The canvas fills the rectangle `(0, 0, width, height)` under `transform` with the
/// image, whose pixels are mapped into that space by `image_transform`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ImagePlacement {
    pub transform: Transform,
    pub image_transform: Transform,
    pub width: f64,
    pub height: f64,
}

/// A surface that receives drawing commands.
///
/// Opacities are in `[0, 1]` and apply to the whole paint, gradients included.
pub trait Canvas {
    /// The transform in effect before rendering starts.
    ///
    /// The renderer composes every element's transform with this one.
    fn initial_transform(&self) -> Transform {
        Transform::identity()
    }

    fn fill(
        &mut self,
        path: &PathBuilder,
        transform: &Transform,
        paint: &Paint,
        opacity: f64,
        fill_rule: FillRule,
    ) -> Result<(), RenderingError>;

    fn stroke(
        &mut self,
        path: &PathBuilder,
        transform: &Transform,
        paint: &Paint,
        opacity: f64,
        style: &StrokeStyle,
    ) -> Result<(), RenderingError>;

    fn draw_image(
        &mut self,
        image: &Image,
        placement: &ImagePlacement,
        opacity: f64,
    ) -> Result<(), RenderingError>;
}

fn set_source_color(cr: &cairo::Context, rgba: RGBA, opacity: f64) {
    cr.set_source_rgba(
        f64::from(rgba.red_f32()),
        f64::from(rgba.green_f32()),
        f64::from(rgba.blue_f32()),
        f64::from(rgba.alpha_f32()) * opacity,
    );
}

fn set_gradient_stops(g: &cairo::Gradient, common: &GradientCommon, opacity: f64) -> bool {
    // Cairo's pattern matrix goes from user space to gradient space.
    let matrix = match common.transform.invert() {
        Some(m) => m,
        None => return false,
    };

    g.set_matrix(matrix.into());
    g.set_extend(cairo::Extend::from(common.spread));

    for stop in &common.stops {
        g.add_color_stop_rgba(
            stop.offset,
            f64::from(stop.color.red_f32()),
            f64::from(stop.color.green_f32()),
            f64::from(stop.color.blue_f32()),
            f64::from(stop.color.alpha_f32()) * opacity,
        );
    }

    true
}

/// Sets the paint as the source of `cr`; returns `false` if there is nothing to draw.
fn set_source_paint(
    cr: &cairo::Context,
    paint: &Paint,
    opacity: f64,
) -> Result<bool, cairo::Error> {
    match *paint {
        Paint::Color(rgba) => {
            set_source_color(cr, rgba, opacity);
            Ok(true)
        }

        Paint::LinearGradient {
            x1,
            y1,
            x2,
            y2,
            ref common,
        } => {
            let g = cairo::LinearGradient::new(x1, y1, x2, y2);
            if !set_gradient_stops(&g, common, opacity) {
                return Ok(false);
            }
            cr.set_source(&g)?;
            Ok(true)
        }

        Paint::RadialGradient {
            cx,
            cy,
            r,
            fx,
            fy,
            ref common,
        } => {
            let g = cairo::RadialGradient::new(fx, fy, 0.0, cx, cy, r);
            if !set_gradient_stops(&g, common, opacity) {
                return Ok(false);
            }
            cr.set_source(&g)?;
            Ok(true)
        }
    }
}

fn with_saved_cr<F>(cr: &cairo::Context, f: F) -> Result<(), RenderingError>
where
    F: FnOnce() -> Result<(), RenderingError>,
{
    cr.save()?;
    let res = f();
    cr.restore()?;
    res
}

impl Canvas for cairo::Context {
    fn initial_transform(&self) -> Transform {
        Transform::from(self.matrix())
    }

    fn fill(
        &mut self,
        path: &PathBuilder,
        transform: &Transform,
        paint: &Paint,
        opacity: f64,
        fill_rule: FillRule,
    ) -> Result<(), RenderingError> {
        let cr = self.clone();

        with_saved_cr(&cr, || {
            cr.set_matrix((*transform).into());
            path.to_cairo(&cr)?;

            if set_source_paint(&cr, paint, opacity)? {
                cr.set_fill_rule(cairo::FillRule::from(fill_rule));
                cr.fill()?;
            } else {
                cr.new_path();
            }

            Ok(())
        })
    }

    fn stroke(
        &mut self,
        path: &PathBuilder,
        transform: &Transform,
        paint: &Paint,
        opacity: f64,
        style: &StrokeStyle,
    ) -> Result<(), RenderingError> {
        let cr = self.clone();

        with_saved_cr(&cr, || {
            cr.set_matrix((*transform).into());
            path.to_cairo(&cr)?;

            if set_source_paint(&cr, paint, opacity)? {
                setup_cr_for_stroke(&cr, style);
                cr.stroke()?;
            } else {
                cr.new_path();
            }

            Ok(())
        })
    }

    fn draw_image(
        &mut self,
        image: &Image,
        placement: &ImagePlacement,
        opacity: f64,
    ) -> Result<(), RenderingError> {
        let image_to_user = match placement.image_transform.invert() {
            Some(m) => m,
            None => return Ok(()),
        };

        let cr = self.clone();
        let surface = image.to_cairo_surface()?;

        with_saved_cr(&cr, || {
            cr.set_matrix(placement.transform.into());

            let pattern = cairo::SurfacePattern::create(&surface);
            pattern.set_matrix(image_to_user.into());
            pattern.set_extend(cairo::Extend::Pad);
            cr.set_source(&pattern)?;

            cr.rectangle(0.0, 0.0, placement.width, placement.height);
            cr.clip();
            cr.paint_with_alpha(opacity)?;

            Ok(())
        })
    }
}

fn setup_cr_for_stroke(cr: &cairo::Context, style: &StrokeStyle) {
    cr.set_line_width(style.width);
    cr.set_miter_limit(style.miter_limit);
    cr.set_line_cap(cairo::LineCap::from(style.line_cap));
    cr.set_line_join(cairo::LineJoin::from(style.line_join));

    match style.dashes {
        Some(ref dashes) => cr.set_dash(dashes, style.dash_offset),
        None => cr.set_dash(&[], 0.0),
    }
}

impl From<SpreadMethod> for cairo::Extend {
    fn from(s: SpreadMethod) -> cairo::Extend {
        match s {
            SpreadMethod::Pad => cairo::Extend::Pad,
            SpreadMethod::Reflect => cairo::Extend::Reflect,
            SpreadMethod::Repeat => cairo::Extend::Repeat,
        }
    }
}

impl From<StrokeLinejoin> for cairo::LineJoin {
    fn from(j: StrokeLinejoin) -> cairo::LineJoin {
        match j {
            StrokeLinejoin::Miter => cairo::LineJoin::Miter,
            StrokeLinejoin::Round => cairo::LineJoin::Round,
            StrokeLinejoin::Bevel => cairo::LineJoin::Bevel,
        }
    }
}

impl From<StrokeLinecap> for cairo::LineCap {
    fn from(j: StrokeLinecap) -> cairo::LineCap {
        match j {
            StrokeLinecap::Butt => cairo::LineCap::Butt,
            StrokeLinecap::Round => cairo::LineCap::Round,
            StrokeLinecap::Square => cairo::LineCap::Square,
        }
    }
}

impl From<FillRule> for cairo::FillRule {
    fn from(f: FillRule) -> cairo::FillRule {
        match f {
            FillRule::NonZero => cairo::FillRule::Winding,
            FillRule::EvenOdd => cairo::FillRule::EvenOdd,
        }
    }
}

/// A drawing command, as captured by [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasCommand {
    Fill {
        path: Vec<PathSegment>,
        transform: Transform,
        paint: Paint,
        opacity: f64,
        fill_rule: FillRule,
    },

    Stroke {
        path: Vec<PathSegment>,
        transform: Transform,
        paint: Paint,
        opacity: f64,
        style: StrokeStyle,
    },

    Image {
        width: u32,
        height: u32,
        placement: ImagePlacement,
        opacity: f64,
    },
}

/// A canvas that just remembers what was drawn on it.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    initial_transform: Transform,
    commands: Vec<CanvasCommand>,
}

impl RecordingCanvas {
    pub fn new() -> RecordingCanvas {
        RecordingCanvas::default()
    }

    /// A canvas whose initial transform is `transform`, as if the caller had already
    /// scaled or translated it.
    pub fn with_transform(transform: Transform) -> RecordingCanvas {
        RecordingCanvas {
            initial_transform: transform,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[CanvasCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<CanvasCommand> {
        self.commands
    }

    /// Bounding box in device space of everything drawn so far, ignoring stroke widths.
    pub fn ink_extents(&self) -> Option<Rect> {
        let mut extents: Option<Rect> = None;

        for cmd in &self.commands {
            let rect = match *cmd {
                CanvasCommand::Fill {
                    ref path,
                    ref transform,
                    ..
                }
                | CanvasCommand::Stroke {
                    ref path,
                    ref transform,
                    ..
                } => segments_extents(path).map(|r| transform.transform_rect(&r)),

                CanvasCommand::Image { ref placement, .. } => Some(
                    placement
                        .transform
                        .transform_rect(&Rect::from_size(placement.width, placement.height)),
                ),
            };

            if let Some(rect) = rect {
                extents = Some(extents.map_or(rect, |e| e.union(&rect)));
            }
        }

        extents
    }
}

impl Canvas for RecordingCanvas {
    fn initial_transform(&self) -> Transform {
        self.initial_transform
    }

    fn fill(
        &mut self,
        path: &PathBuilder,
        transform: &Transform,
        paint: &Paint,
        opacity: f64,
        fill_rule: FillRule,
    ) -> Result<(), RenderingError> {
        self.commands.push(CanvasCommand::Fill {
            path: path.segments().to_vec(),
            transform: *transform,
            paint: paint.clone(),
            opacity,
            fill_rule,
        });
        Ok(())
    }

    fn stroke(
        &mut self,
        path: &PathBuilder,
        transform: &Transform,
        paint: &Paint,
        opacity: f64,
        style: &StrokeStyle,
    ) -> Result<(), RenderingError> {
        self.commands.push(CanvasCommand::Stroke {
            path: path.segments().to_vec(),
            transform: *transform,
            paint: paint.clone(),
            opacity,
            style: style.clone(),
        });
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: &Image,
        placement: &ImagePlacement,
        opacity: f64,
    ) -> Result<(), RenderingError> {
        self.commands.push(CanvasCommand::Image {
            width: image.width(),
            height: image.height(),
            placement: *placement,
            opacity,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> PathBuilder {
        let mut path = PathBuilder::new();
        path.add_rect(0.0, 0.0, 10.0, 10.0);
        path
    }

    fn red() -> Paint {
        Paint::Color(RGBA::new(255, 0, 0, 255))
    }

    #[test]
    fn records_commands() {
        let mut canvas = RecordingCanvas::new();
        let path = square();

        canvas
            .fill(&path, &Transform::identity(), &red(), 0.5, FillRule::EvenOdd)
            .unwrap();

        let commands = canvas.into_commands();
        assert_eq!(commands.len(), 1);

        match commands[0] {
            CanvasCommand::Fill {
                ref path,
                opacity,
                fill_rule,
                ..
            } => {
                assert_eq!(path.len(), 5);
                assert_eq!(opacity, 0.5);
                assert_eq!(fill_rule, FillRule::EvenOdd);
            }
            _ => panic!("expected a fill"),
        }
    }

    #[test]
    fn ink_extents_are_in_device_space() {
        let mut canvas = RecordingCanvas::new();
        let path = square();

        canvas
            .fill(
                &path,
                &Transform::new_translate(5.0, 5.0),
                &red(),
                1.0,
                FillRule::NonZero,
            )
            .unwrap();

        assert_eq!(
            canvas.ink_extents(),
            Some(Rect::new(5.0, 5.0, 15.0, 15.0))
        );
    }

    #[test]
    fn cairo_fills_pixels() {
        let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 20, 20).unwrap();

        {
            let mut cr = cairo::Context::new(&surface).unwrap();
            let path = square();
            Canvas::fill(
                &mut cr,
                &path,
                &Transform::new_translate(5.0, 5.0),
                &red(),
                1.0,
                FillRule::NonZero,
            )
            .unwrap();
        }

        surface.flush();
        let data = surface.data().unwrap();
        let stride = 20 * 4;
        let pixel = |x: usize, y: usize| {
            u32::from_ne_bytes([
                data[y * stride + x * 4],
                data[y * stride + x * 4 + 1],
                data[y * stride + x * 4 + 2],
                data[y * stride + x * 4 + 3],
            ])
        };

        assert_eq!(pixel(10, 10), 0xffff0000);
        assert_eq!(pixel(1, 1), 0);
    }

    #[test]
    fn gradient_with_singular_transform_draws_nothing() {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 4, 4).unwrap();
        let cr = cairo::Context::new(&surface).unwrap();

        let paint = Paint::LinearGradient {
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 0.0,
            common: GradientCommon {
                stops: vec![],
                spread: SpreadMethod::Pad,
                transform: Transform::new_scale(0.0, 1.0),
            },
        };

        assert!(!set_source_paint(&cr, &paint, 1.0).unwrap());
    }
}
