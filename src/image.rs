//! Raster images embedded in `<image>` elements as `data:` URLs.
//!
//! Only base64-encoded PNG and JPEG are supported.  Images are decoded with the `image`
//! crate and converted to premultiplied ARGB32, which is what Cairo wants.

use std::fmt;

/// A decoded image, in Cairo's ARGB32 format: premultiplied, one native-endian `u32`
/// per pixel, with no padding between rows.
#[derive(Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    data: Box<[u8]>,
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageError {
    /// The href is not a base64 `data:` URL with a PNG or JPEG media type.
    UnsupportedUrl,

    BadDataUrl,

    Decode(String),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ImageError::UnsupportedUrl => write!(f, "only base64 PNG and JPEG data: URLs are supported"),
            ImageError::BadDataUrl => write!(f, "invalid data: URL"),
            ImageError::Decode(ref s) => write!(f, "could not decode image: {}", s),
        }
    }
}

impl Image {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Converts straight-alpha RGBA bytes to premultiplied ARGB32.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Image {
        let data: Vec<u8> = rgba
            .chunks_exact(4)
            .flat_map(|px| {
                let a = u32::from(px[3]);
                let premul = |c: u8| (u32::from(c) * a + 127) / 255;
                let argb = a << 24 | premul(px[0]) << 16 | premul(px[1]) << 8 | premul(px[2]);
                argb.to_ne_bytes()
            })
            .collect();

        Image {
            width,
            height,
            data: data.into_boxed_slice(),
        }
    }

    /// Wraps the pixels in a Cairo surface.
    pub fn to_cairo_surface(&self) -> Result<cairo::ImageSurface, cairo::Error> {
        cairo::ImageSurface::create_for_data(
            self.data.to_vec(),
            cairo::Format::ARgb32,
            self.width as i32,
            self.height as i32,
            self.stride() as i32,
        )
    }
}

fn image_format(href: &str) -> Option<image::ImageFormat> {
    const FORMATS: [(&str, image::ImageFormat); 3] = [
        ("data:image/png;base64,", image::ImageFormat::Png),
        ("data:image/jpg;base64,", image::ImageFormat::Jpeg),
        ("data:image/jpeg;base64,", image::ImageFormat::Jpeg),
    ];

    FORMATS
        .iter()
        .find(|(prefix, _)| href.starts_with(prefix))
        .map(|&(_, format)| format)
}

/// Decodes the image in an `href` like `data:image/png;base64,...`.
pub fn load_data_url(href: &str) -> Result<Image, ImageError> {
    let format = image_format(href).ok_or(ImageError::UnsupportedUrl)?;

    let data_url = data_url::DataUrl::process(href).map_err(|_| ImageError::BadDataUrl)?;
    let (bytes, fragment_id) = data_url
        .decode_to_vec()
        .map_err(|_| ImageError::BadDataUrl)?;

    // data: URLs cannot have fragment identifiers; this is probably a quoting mistake.
    if fragment_id.is_some() {
        return Err(ImageError::BadDataUrl);
    }

    let decoded = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| ImageError::Decode(e.to_string()))?
        .to_rgba8();

    Ok(Image::from_rgba(
        decoded.width(),
        decoded.height(),
        decoded.as_raw(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    // A 1×1 PNG with a single opaque red pixel.
    const RED_PIXEL_PNG: &str = "data:image/png;base64,\
        iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR4nGP4z8DwHwAFAAH/iZk9HQAAAABJRU5ErkJggg==";

    #[test]
    fn rejects_unsupported_urls() {
        assert_eq!(
            load_data_url("foo.png").unwrap_err(),
            ImageError::UnsupportedUrl
        );
        assert_eq!(
            load_data_url("data:image/gif;base64,R0lGOD").unwrap_err(),
            ImageError::UnsupportedUrl
        );
        assert_eq!(
            load_data_url("data:image/png,rawbytes").unwrap_err(),
            ImageError::UnsupportedUrl
        );
    }

    #[test]
    fn reports_decoding_errors() {
        assert!(matches!(
            load_data_url("data:image/png;base64,AAAA"),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn decodes_png() {
        let image = load_data_url(RED_PIXEL_PNG).unwrap();
        assert_eq!(image.width(), 1);
        assert_eq!(image.height(), 1);
        assert_eq!(image.data(), &0xffff0000u32.to_ne_bytes());
    }

    #[test]
    fn premultiplies_alpha() {
        let image = Image::from_rgba(2, 1, &[255, 255, 255, 128, 10, 20, 30, 0]);
        assert_eq!(image.stride(), 8);
        assert_eq!(&image.data()[..4], &0x80808080u32.to_ne_bytes());
        assert_eq!(&image.data()[4..], &0u32.to_ne_bytes());
    }
}
