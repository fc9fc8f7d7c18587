//! Rendering of SVG glyphs embedded in OpenType fonts.
//!
//! An OpenType font can carry an `SVG ` table, where glyphs are SVG documents instead of
//! outlines.  A font engine that supports these glyphs calls into a renderer in two
//! steps: first it asks for the metrics and bitmap size of a glyph ("presetting" the
//! glyph slot), and then it asks to draw the glyph into a bitmap of that size.
//! [`GlyphRenderer`] implements both steps.  The font engine owns the glyph data and
//! describes it with a [`SvgGlyphDocument`]; the glyph's metrics and bitmap live in a
//! [`GlyphSlot`].
//!
//! Many glyphs may share a single SVG document, where each glyph is an element with an
//! id like `glyph42`.  Parsing that document for every glyph would be wasteful, so the
//! renderer keeps the most recently used documents in a small cache.  The cache is
//! keyed by the address and length of the document data, not by its contents, since
//! the font engine hands out the same buffer every time.

use std::error;
use std::fmt;
use std::rc::Rc;

use crate::api::{Loader, Palette, Renderer};
use crate::color::{Color, RGBA};
use crate::document::Document;
use crate::error::{LoadingError, RenderingError};
use crate::minisvg_log;
use crate::rect::Rect;
use crate::session::Session;
use crate::transform::Transform;

/// Maximum number of parsed documents kept by a [`GlyphRenderer`].
pub const MAX_CACHED_DOCUMENTS: usize = 16;

/// Prefix of the `var()` names that refer to entries of the font's color palette, as in
/// `var(--color3)`.
const PALETTE_PREFIX: &str = "color";

/// A 2x2 matrix in 16.16 fixed point, as used by font engines.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FixedMatrix {
    pub xx: i32,
    pub xy: i32,
    pub yx: i32,
    pub yy: i32,
}

impl FixedMatrix {
    pub const IDENTITY: FixedMatrix = FixedMatrix {
        xx: 1 << 16,
        xy: 0,
        yx: 0,
        yy: 1 << 16,
    };
}

impl Default for FixedMatrix {
    fn default() -> Self {
        FixedMatrix::IDENTITY
    }
}

/// An SVG document from a font, with the parameters to render one of its glyphs.
#[derive(Debug, Copy, Clone)]
pub struct SvgGlyphDocument<'data> {
    /// The SVG document.  Its address and length identify it in the cache.
    pub data: &'data [u8],

    pub units_per_em: u16,

    /// Size of the em square in pixels.
    pub x_ppem: u16,
    pub y_ppem: u16,

    /// First and last glyph described by the document.  If they are different, each
    /// glyph is the element with the id `glyph<index>`; otherwise the whole document is
    /// the glyph.
    pub start_glyph_id: u16,
    pub end_glyph_id: u16,

    /// Transformation requested by the font engine, in 16.16 fixed point.
    pub transform: FixedMatrix,

    /// Translation requested by the font engine, in 26.6 fixed point pixels.
    pub delta: (i64, i64),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PixelMode {
    /// The bitmap has not been set up.
    None,

    /// Premultiplied BGRA, 4 bytes per pixel.
    Bgra,
}

impl Default for PixelMode {
    fn default() -> Self {
        PixelMode::None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub rows: u32,

    /// Bytes per row.
    pub pitch: i32,

    pub pixel_mode: PixelMode,

    /// Pixel data, `rows * pitch` bytes.
    pub buffer: Vec<u8>,
}

impl GlyphBitmap {
    /// Number of bytes that `rows` rows of `pitch` bytes take, if it fits in memory.
    fn buffer_len(&self) -> Option<usize> {
        (self.rows as usize).checked_mul(self.pitch.max(0) as usize)
    }
}

/// Glyph metrics, all in 26.6 fixed point pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub width: i64,
    pub height: i64,
    pub hori_bearing_x: i64,
    pub hori_bearing_y: i64,
    pub hori_advance: i64,
    pub vert_bearing_x: i64,
    pub vert_bearing_y: i64,
    pub vert_advance: i64,
}

/// The glyph being loaded by the font engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphSlot {
    pub glyph_index: u32,
    pub bitmap: GlyphBitmap,

    /// Position of the bitmap's top left corner relative to the glyph origin, with y
    /// growing upwards.
    pub bitmap_left: i32,
    pub bitmap_top: i32,

    pub metrics: GlyphMetrics,
}

impl GlyphSlot {
    pub fn new(glyph_index: u32) -> GlyphSlot {
        GlyphSlot {
            glyph_index,
            ..Default::default()
        }
    }

    /// Allocates a zeroed buffer of the size computed by [`GlyphRenderer::preset_slot`].
    pub fn allocate_bitmap(&mut self) -> Result<(), GlyphError> {
        let len = self.bitmap.buffer_len().ok_or(GlyphError::TooLarge)?;
        self.bitmap.buffer = vec![0; len];
        Ok(())
    }
}

/// The color palette of a font face.
pub trait FacePalette {
    /// Returns the palette entry with the given index, if there is one.
    fn color(&self, index: usize) -> Option<RGBA>;
}

impl FacePalette for Vec<RGBA> {
    fn color(&self, index: usize) -> Option<RGBA> {
        self.get(index).copied()
    }
}

/// Width, rows and pitch of a BGRA bitmap that covers `extents`, if they fit in the
/// integer types of a [`GlyphBitmap`].
fn bitmap_size(extents: &Rect) -> Option<(u32, u32, i32)> {
    let dimension = |size: f64| {
        let size = size.ceil();
        (size.is_finite() && (0.0..=f64::from(i32::MAX)).contains(&size)).then(|| size as i32)
    };

    let width = dimension(extents.width())?;
    let rows = dimension(extents.height())?;
    let pitch = width.checked_mul(4)?;

    // The whole buffer must be addressable too.
    (pitch as usize).checked_mul(rows as usize)?;

    Some((width as u32, rows as u32, pitch))
}

/// Resolves `var(--colorN)` to entry `N` of a face palette.
struct FacePaletteLookup<'p>(&'p dyn FacePalette);

impl Palette for FacePaletteLookup<'_> {
    fn lookup(&self, name: &str) -> Option<Color> {
        let digits = name.strip_prefix(PALETTE_PREFIX)?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let index = digits.bytes().try_fold(0usize, |acc, b| {
            acc.checked_mul(10)?.checked_add(usize::from(b - b'0'))
        })?;

        self.0.color(index).map(Color::RGBA)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GlyphError {
    /// The glyph's SVG document could not be loaded.
    Loading(LoadingError),

    /// The glyph could not be measured or rendered.
    Rendering(RenderingError),

    /// [`GlyphRenderer::render`] was called without a successful call to
    /// [`GlyphRenderer::preset_slot`] before.
    NotPreset,

    /// The slot's bitmap buffer is smaller than its size requires.
    BitmapTooSmall,

    /// The glyph is too large for a bitmap.
    TooLarge,
}

impl error::Error for GlyphError {}

impl fmt::Display for GlyphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            GlyphError::Loading(ref e) => write!(f, "invalid SVG glyph document: {}", e),
            GlyphError::Rendering(ref e) => write!(f, "could not render SVG glyph: {}", e),
            GlyphError::NotPreset => write!(f, "the glyph slot was not preset"),
            GlyphError::BitmapTooSmall => write!(f, "the glyph bitmap is too small"),
            GlyphError::TooLarge => write!(f, "the glyph is too large for a bitmap"),
        }
    }
}

impl From<LoadingError> for GlyphError {
    fn from(e: LoadingError) -> GlyphError {
        GlyphError::Loading(e)
    }
}

impl From<RenderingError> for GlyphError {
    fn from(e: RenderingError) -> GlyphError {
        GlyphError::Rendering(e)
    }
}

impl From<cairo::Error> for GlyphError {
    fn from(e: cairo::Error) -> GlyphError {
        GlyphError::Rendering(RenderingError::from(e))
    }
}

struct CacheEntry<'data> {
    key: (usize, usize),
    document: Rc<Document<'data>>,
}

/// What [`GlyphRenderer::render`] needs from the last call to `preset_slot`.
struct Preset<'data> {
    document: Rc<Document<'data>>,
    transform: Transform,
    extents: Rect,
}

/// Renders SVG glyphs for a font engine.
///
/// Creating the renderer is the per-face initialization, and dropping it releases every
/// cached document.
pub struct GlyphRenderer<'data> {
    /// Most recently used first.
    entries: Vec<CacheEntry<'data>>,

    preset: Option<Preset<'data>>,

    session: Session,
}

impl Default for GlyphRenderer<'_> {
    fn default() -> Self {
        GlyphRenderer::new()
    }
}

impl<'data> GlyphRenderer<'data> {
    pub fn new() -> Self {
        GlyphRenderer {
            entries: Vec::with_capacity(MAX_CACHED_DOCUMENTS),
            preset: None,
            session: Session::default(),
        }
    }

    pub fn with_session(self, session: Session) -> Self {
        GlyphRenderer { session, ..self }
    }

    /// Number of documents in the cache.
    pub fn num_cached_documents(&self) -> usize {
        self.entries.len()
    }

    /// Computes the bitmap size and metrics of a glyph, and stores them in `slot`.
    ///
    /// The slot's current `hori_bearing_x`, `hori_advance`, `vert_advance` and `height`
    /// metrics are used to derive the vertical bearings.  With `cache`, the computed
    /// placement is remembered for the next call to [`render`](Self::render).
    pub fn preset_slot(
        &mut self,
        slot: &mut GlyphSlot,
        glyph: &SvgGlyphDocument<'data>,
        cache: bool,
    ) -> Result<(), GlyphError> {
        let document = self.load_document(glyph)?;

        let width = document.width();
        let height = document.height();

        let x_ppem = f64::from(glyph.x_ppem);
        let y_ppem = f64::from(glyph.y_ppem);

        let fixed = |v: i32| f64::from(v) / f64::from(1 << 16);

        let engine_transform = Transform::new(
            fixed(glyph.transform.xx),
            -fixed(glyph.transform.xy),
            -fixed(glyph.transform.yx),
            fixed(glyph.transform.yy),
            glyph.delta.0 as f64 / 64.0 * width / x_ppem,
            -(glyph.delta.1 as f64) / 64.0 * height / y_ppem,
        );

        let transform = Transform::multiply(
            &engine_transform,
            &Transform::new_scale(x_ppem / width, y_ppem / height),
        );

        let id = glyph_id(glyph, slot.glyph_index);
        let extents = document.extents(id.as_deref())?;
        let extents = transform.transform_rect(&extents);

        let (width, rows, pitch) = bitmap_size(&extents).ok_or_else(|| {
            minisvg_log!(
                self.session,
                "glyph {} is too large: {:?}",
                slot.glyph_index,
                extents
            );
            GlyphError::TooLarge
        })?;

        slot.bitmap_left = extents.x0 as i32;
        slot.bitmap_top = -extents.y0 as i32;

        slot.bitmap.rows = rows;
        slot.bitmap.width = width;
        slot.bitmap.pitch = pitch;
        slot.bitmap.pixel_mode = PixelMode::Bgra;

        let metrics = &mut slot.metrics;

        let vert_bearing_x =
            metrics.hori_bearing_x as f64 / 64.0 - metrics.hori_advance as f64 / 64.0 / 2.0;
        let vert_bearing_y =
            (metrics.vert_advance as f64 / 64.0 - metrics.height as f64 / 64.0) / 2.0;

        metrics.width = (extents.width() * 64.0).round() as i64;
        metrics.height = (extents.height() * 64.0).round() as i64;

        metrics.hori_bearing_x = (extents.x0 * 64.0) as i64;
        metrics.hori_bearing_y = (-extents.y0 * 64.0) as i64;
        metrics.vert_bearing_x = (vert_bearing_x * 64.0) as i64;
        metrics.vert_bearing_y = (vert_bearing_y * 64.0) as i64;

        if metrics.vert_advance == 0 {
            metrics.vert_advance = (extents.height() * 1.2 * 64.0) as i64;
        }

        if cache {
            self.preset = Some(Preset {
                document,
                transform,
                extents,
            });
        }

        Ok(())
    }

    /// Draws the glyph last preset with `cache` into the slot's bitmap.
    ///
    /// If the bitmap buffer is empty, it is allocated first.  The placement computed by
    /// the preset is consumed, so each preset can be rendered once.
    pub fn render(
        &mut self,
        slot: &mut GlyphSlot,
        glyph: &SvgGlyphDocument<'data>,
        palette: &dyn FacePalette,
    ) -> Result<(), GlyphError> {
        let preset = self.preset.take().ok_or(GlyphError::NotPreset)?;

        let width = slot.bitmap.width;
        let rows = slot.bitmap.rows;
        let pitch = slot.bitmap.pitch.max(0) as usize;
        let len = slot.bitmap.buffer_len().ok_or(GlyphError::TooLarge)?;
        let row_len = (width as usize)
            .checked_mul(4)
            .ok_or(GlyphError::TooLarge)?;

        if slot.bitmap.buffer.is_empty() {
            slot.allocate_bitmap()?;
        }

        if slot.bitmap.buffer.len() < len || pitch < row_len {
            return Err(GlyphError::BitmapTooSmall);
        }

        slot.bitmap.pixel_mode = PixelMode::Bgra;

        if width == 0 || rows == 0 {
            return Ok(());
        }

        let mut surface =
            cairo::ImageSurface::create(cairo::Format::ARgb32, width as i32, rows as i32)?;

        {
            let cr = cairo::Context::new(&surface)?;
            cr.translate(-preset.extents.x0, -preset.extents.y0);
            cr.transform(preset.transform.into());

            let lookup = FacePaletteLookup(palette);
            let id = glyph_id(glyph, slot.glyph_index);

            Renderer::new(&preset.document)
                .with_palette(&lookup)
                .render_cairo(id.as_deref(), &cr)?;
        }

        surface.flush();

        let stride = surface.stride() as usize;
        let data = surface
            .data()
            .map_err(|e| GlyphError::Rendering(RenderingError::Rendering(e.to_string())))?;

        // Cairo pixels are native-endian ARGB words.
        for (y, dest) in slot
            .bitmap
            .buffer
            .chunks_mut(pitch)
            .take(rows as usize)
            .enumerate()
        {
            let src = &data[y * stride..y * stride + row_len];

            for (d, s) in dest[..row_len].chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                let argb = u32::from_ne_bytes([s[0], s[1], s[2], s[3]]);
                d.copy_from_slice(&[
                    argb as u8,
                    (argb >> 8) as u8,
                    (argb >> 16) as u8,
                    (argb >> 24) as u8,
                ]);
            }
        }

        Ok(())
    }

    /// Returns the cached document for `glyph`, loading it if needed.
    fn load_document(
        &mut self,
        glyph: &SvgGlyphDocument<'data>,
    ) -> Result<Rc<Document<'data>>, GlyphError> {
        let key = (glyph.data.as_ptr() as usize, glyph.data.len());

        if let Some(pos) = self.entries.iter().position(|e| e.key == key) {
            let entry = self.entries.remove(pos);
            let document = entry.document.clone();
            self.entries.insert(0, entry);
            return Ok(document);
        }

        let units = f64::from(glyph.units_per_em);

        let document = Loader::new()
            .with_container_size(units, units)
            .with_session(self.session.clone())
            .read_bytes(glyph.data)?;

        let document = Rc::new(document);

        if self.entries.len() == MAX_CACHED_DOCUMENTS {
            self.entries.pop();
        }

        self.entries.insert(
            0,
            CacheEntry {
                key,
                document: document.clone(),
            },
        );

        Ok(document)
    }
}

fn glyph_id(glyph: &SvgGlyphDocument<'_>, glyph_index: u32) -> Option<String> {
    if glyph.start_glyph_id < glyph.end_glyph_id {
        Some(format!("glyph{}", glyph_index))
    } else {
        None
    }
}
