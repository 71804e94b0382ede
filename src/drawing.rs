//! Reference drawings attached to a report.
//!
//! A drawing is the plan the part was inspected against. PNG and JPEG files are
//! embedded in reports; PDF plans cannot be previewed and are referenced by
//! file name only.

use anyhow::{Context, Result};
use image::{ImageDecoder, ImageFormat, ImageReader, RgbImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Kind of drawing file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingKind {
    Png,
    Jpeg,
    Pdf,
}

impl DrawingKind {
    pub fn extension(&self) -> &'static str {
        match self {
            DrawingKind::Png => "png",
            DrawingKind::Jpeg => "jpeg",
            DrawingKind::Pdf => "pdf",
        }
    }

    fn image_format(&self) -> Option<ImageFormat> {
        match self {
            DrawingKind::Png => Some(ImageFormat::Png),
            DrawingKind::Jpeg => Some(ImageFormat::Jpeg),
            DrawingKind::Pdf => None,
        }
    }

    fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF") {
            return Some(DrawingKind::Pdf);
        }
        match image::guess_format(bytes).ok()? {
            ImageFormat::Png => Some(DrawingKind::Png),
            ImageFormat::Jpeg => Some(DrawingKind::Jpeg),
            _ => None,
        }
    }
}

/// Pixel layout of a raster drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Colour channels as stored in the file (1 grey, 3 RGB, 4 CMYK or RGBA)
    pub components: u8,
}

impl ImageInfo {
    /// Height over width, used to scale the picture to a fixed width.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 {
            return 1.0;
        }
        f64::from(self.height) / f64::from(self.width)
    }
}

/// A loaded reference drawing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawing {
    pub file_name: String,
    pub kind: DrawingKind,
    pub bytes: Vec<u8>,
    /// Pixel layout when the header could be read
    pub image: Option<ImageInfo>,
}

impl Drawing {
    /// Load a drawing from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read drawing {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Self::from_bytes(file_name, bytes)
    }

    /// Classify raw bytes by extension, falling back to magic numbers.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let lower = file_name.to_lowercase();

        let kind = if lower.ends_with(".png") {
            DrawingKind::Png
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            DrawingKind::Jpeg
        } else if lower.ends_with(".pdf") {
            DrawingKind::Pdf
        } else {
            DrawingKind::sniff(&bytes).with_context(|| {
                format!(
                    "Unsupported drawing type: {}. Use a PNG, JPEG or PDF file.",
                    file_name
                )
            })?
        };

        let image = match kind.image_format() {
            Some(format) => match read_header(&bytes, format) {
                Ok(info) => Some(info),
                Err(err) => {
                    tracing::warn!(file = %file_name, error = %err, "drawing header unreadable, picture will be skipped");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            file_name,
            kind,
            bytes,
            image,
        })
    }

    /// Decode to 8-bit RGB. Transparent pixels are composited over white.
    pub fn to_rgb(&self) -> Result<RgbImage> {
        let format = self
            .kind
            .image_format()
            .with_context(|| format!("{} is not a raster image", self.file_name))?;
        let decoded = image::load_from_memory_with_format(&self.bytes, format)
            .with_context(|| format!("Failed to decode drawing {}", self.file_name))?;

        if !decoded.color().has_alpha() {
            return Ok(decoded.to_rgb8());
        }

        let rgba = decoded.to_rgba8();
        let mut rgb = RgbImage::new(rgba.width(), rgba.height());
        for (target, source) in rgb.pixels_mut().zip(rgba.pixels()) {
            let alpha = u32::from(source[3]);
            let over_white =
                |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
            *target = image::Rgb([
                over_white(source[0]),
                over_white(source[1]),
                over_white(source[2]),
            ]);
        }
        Ok(rgb)
    }
}

/// Dimensions and stored channel count, read from the header only.
fn read_header(bytes: &[u8], format: ImageFormat) -> Result<ImageInfo> {
    let decoder = ImageReader::with_format(Cursor::new(bytes), format).into_decoder()?;
    let (width, height) = decoder.dimensions();
    Ok(ImageInfo {
        width,
        height,
        components: decoder.original_color_type().channel_count(),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
    use std::io::Cursor;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    /// RGB PNG filled with mid grey.
    pub fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, image::Rgb([128, 128, 128]));
        encode(DynamicImage::ImageRgb8(image), ImageFormat::Png)
    }

    /// RGBA PNG, fully transparent red.
    pub fn png_rgba(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 0]));
        encode(DynamicImage::ImageRgba8(image), ImageFormat::Png)
    }

    pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
        encode(DynamicImage::ImageRgb8(image), ImageFormat::Jpeg)
    }

    pub fn jpeg_gray(width: u32, height: u32) -> Vec<u8> {
        let image = GrayImage::from_pixel(width, height, image::Luma([90]));
        encode(DynamicImage::ImageLuma8(image), ImageFormat::Jpeg)
    }
}
