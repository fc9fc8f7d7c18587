//! Public Rust API for minisvg.
//!
//! This gets re-exported from the toplevel `lib.rs`.

#![warn(missing_docs)]

pub use crate::{
    canvas::{
        Canvas, CanvasCommand, GradientCommon, GradientStop, ImagePlacement, Paint,
        RecordingCanvas, StrokeStyle,
    },
    color::{Color, RGBA},
    document::Document,
    error::{LoadingError, RenderingError},
    glyph::{
        FacePalette, FixedMatrix, GlyphBitmap, GlyphError, GlyphMetrics, GlyphRenderer,
        GlyphSlot, PixelMode, SvgGlyphDocument,
    },
    image::Image,
    node::NodeId,
    path_builder::PathBuilder,
    property_defs::{FillRule, SpreadMethod, StrokeLinecap, StrokeLinejoin},
    rect::Rect,
    session::Session,
    transform::Transform,
};

use std::path::Path;

use crate::drawing_ctx;
use crate::minisvg_log;
use crate::span::Source;

/// Builder for loading a [`Document`].
///
/// This is the starting point for using minisvg.  This struct implements a builder
/// pattern for configuring how a document is loaded, and then loading the SVG data.
/// You can call the methods of `Loader` in sequence to configure the options, and
/// finally use one of the loading functions to get a [`Document`].
///
/// # Example:
///
/// ```
/// let document = minisvg::Loader::new()
///     .read_data(r#"<svg width="20" height="10"/>"#)
///     .unwrap();
///
/// assert_eq!(document.width(), 20.0);
/// assert_eq!(document.height(), 10.0);
/// ```
#[derive(Debug, Clone)]
pub struct Loader {
    container_width: f64,
    container_height: f64,
    session: Session,
}

impl Default for Loader {
    fn default() -> Self {
        Loader {
            container_width: -1.0,
            container_height: -1.0,
            session: Session::default(),
        }
    }
}

impl Loader {
    /// Creates a `Loader` with the default options.
    ///
    /// * The container size is unknown, so percentages in the root's `width` and
    /// `height` cannot be resolved and the document gets its size from its `viewBox`,
    /// or the default of 300 by 150 pixels.
    ///
    /// * Logging is enabled if the `MINISVG_LOG` environment variable is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the size of the container where the document will be placed.
    ///
    /// A percentage in the root's `width` or `height` is taken of this size.  Pass a
    /// negative value for a dimension that is not known.
    ///
    /// # Example:
    ///
    /// ```
    /// let document = minisvg::Loader::new()
    ///     .with_container_size(200.0, 100.0)
    ///     .read_data(r#"<svg width="50%" height="50%"/>"#)
    ///     .unwrap();
    ///
    /// assert_eq!((document.width(), document.height()), (100.0, 50.0));
    /// ```
    pub fn with_container_size(mut self, width: f64, height: f64) -> Self {
        self.container_width = width;
        self.container_height = height;
        self
    }

    /// Uses a specific session, for example one with logging turned off.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Loads a document that refers to `data` without copying it.
    ///
    /// The document cannot outlive `data`.
    pub fn read_data(self, data: &str) -> Result<Document<'_>, LoadingError> {
        self.load(Source::Borrowed(data))
    }

    /// Loads a document that takes ownership of its data.
    ///
    /// The data is dropped when the document is dropped.
    pub fn read_data_owned<S>(self, data: S) -> Result<Document<'static>, LoadingError>
    where
        S: AsRef<str> + 'static,
    {
        self.load(Source::Owned(Box::new(data)))
    }

    /// Loads a document from bytes, which must be valid UTF-8.
    pub fn read_bytes(self, data: &[u8]) -> Result<Document<'_>, LoadingError> {
        match std::str::from_utf8(data) {
            Ok(s) => self.read_data(s),
            Err(e) => {
                minisvg_log!(self.session, "could not load SVG: {}", e);
                Err(LoadingError::BadUtf8)
            }
        }
    }

    /// Reads a whole file and loads it as a document.
    ///
    /// # Example:
    ///
    /// ```no_run
    /// let document = minisvg::Loader::new()
    ///     .read_path("example.svg")
    ///     .unwrap();
    /// ```
    pub fn read_path<P: AsRef<Path>>(self, path: P) -> Result<Document<'static>, LoadingError> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| {
            minisvg_log!(
                self.session,
                "could not read {}: {}",
                path.as_ref().display(),
                e
            );
            LoadingError::from(e)
        })?;

        let data = String::from_utf8(bytes).map_err(|e| {
            minisvg_log!(self.session, "could not load SVG: {}", e);
            LoadingError::BadUtf8
        })?;

        self.read_data_owned(data)
    }

    fn load<'src>(self, source: Source<'src>) -> Result<Document<'src>, LoadingError> {
        Document::load(
            source,
            self.container_width,
            self.container_height,
            self.session,
        )
    }
}

/// Resolves `var(--name)` paints when rendering.
///
/// Closures of the form `Fn(&str) -> Option<Color>` implement this trait.  The name
/// is passed without the leading `--`.  Returning `None` makes the renderer use the
/// fallback color written in the `var()` itself.
pub trait Palette {
    /// Looks up a named color.
    fn lookup(&self, name: &str) -> Option<Color>;
}

impl<F> Palette for F
where
    F: Fn(&str) -> Option<Color>,
{
    fn lookup(&self, name: &str) -> Option<Color> {
        self(name)
    }
}

/// Can render a [`Document`] to a [`Canvas`] or to a Cairo context.
///
/// # Example:
///
/// ```
/// let document = minisvg::Loader::new()
///     .read_data(r#"<svg width="10" height="10"><rect width="10" height="10"/></svg>"#)
///     .unwrap();
///
/// let surface = minisvg::Renderer::new(&document)
///     .render_to_surface(None, None, None)
///     .unwrap();
///
/// assert_eq!((surface.width(), surface.height()), (10, 10));
/// ```
pub struct Renderer<'a, 'src> {
    document: &'a Document<'src>,
    current_color: Option<RGBA>,
    palette: Option<&'a dyn Palette>,
}

impl<'a, 'src> Renderer<'a, 'src> {
    /// Creates a `Renderer` for the specified `document`.
    pub fn new(document: &'a Document<'src>) -> Self {
        Renderer {
            document,
            current_color: None,
            palette: None,
        }
    }

    /// Sets the value of `currentColor` for elements whose ancestors do not specify a
    /// `color`.  Without this, it is opaque black.
    pub fn with_current_color(self, color: RGBA) -> Self {
        Renderer {
            current_color: Some(color),
            ..self
        }
    }

    /// Sets the palette used to resolve `var(--name)` paints.
    pub fn with_palette(self, palette: &'a dyn Palette) -> Self {
        Renderer {
            palette: Some(palette),
            ..self
        }
    }

    /// Renders the whole document, or only the element with the given `id`, to a
    /// canvas.
    ///
    /// When rendering a single element, its own `transform` applies but the transforms
    /// of its ancestors do not.
    pub fn render(&self, id: Option<&str>, canvas: &mut dyn Canvas) -> Result<(), RenderingError> {
        let node = self.document.lookup(id)?;

        drawing_ctx::draw_tree(
            self.document,
            node,
            canvas,
            self.current_color,
            self.palette,
        )
    }

    /// Renders to a Cairo context, with the context's current transform as the
    /// starting point.
    pub fn render_cairo(&self, id: Option<&str>, cr: &cairo::Context) -> Result<(), RenderingError> {
        let mut cr = cr.clone();
        self.render(id, &mut cr)
    }

    /// Renders the whole document, or one element, to a new image surface.
    ///
    /// The area to render is the document's intrinsic size, or the extents of the
    /// element with the given `id`; it is scaled to fill the surface exactly.  When
    /// neither `width` nor `height` are given, the surface has the size of that area
    /// rounded up to whole pixels.  When only one of them is given, the other one is
    /// computed to keep the area's aspect ratio.
    pub fn render_to_surface(
        &self,
        id: Option<&str>,
        width: Option<i32>,
        height: Option<i32>,
    ) -> Result<cairo::ImageSurface, RenderingError> {
        let area = match id {
            None => Rect::from_size(self.document.width(), self.document.height()),
            Some(_) => self.document.extents(id)?,
        };

        if area.width() <= 0.0 || area.height() <= 0.0 {
            return Err(RenderingError::InvalidSize);
        }

        let (width, height) = surface_size(&area, width, height);

        if width <= 0 || height <= 0 {
            return Err(RenderingError::InvalidSize);
        }

        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)?;

        {
            let cr = cairo::Context::new(&surface)?;
            cr.scale(
                f64::from(width) / area.width(),
                f64::from(height) / area.height(),
            );
            cr.translate(-area.x0, -area.y0);

            self.render_cairo(id, &cr)?;
        }

        surface.flush();

        Ok(surface)
    }
}

fn surface_size(area: &Rect, width: Option<i32>, height: Option<i32>) -> (i32, i32) {
    let (w, h) = (area.width(), area.height());

    match (width.filter(|&v| v > 0), height.filter(|&v| v > 0)) {
        (None, None) => (w.ceil() as i32, h.ceil() as i32),
        (Some(width), None) => (width, (f64::from(width) * h / w).ceil() as i32),
        (None, Some(height)) => ((f64::from(height) * w / h).ceil() as i32, height),
        (Some(width), Some(height)) => (width, height),
    }
}
