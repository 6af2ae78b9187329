use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use crate::canvas::PixelBuffer;

/// Failures of the codec collaborator. The caller logs and leaves the canvas as it was.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot decode image: {0}")]
    Decode(String),
    #[error("cannot encode image: {0}")]
    Encode(String),
    #[error("image has no pixels")]
    EmptyImage,
}

// ============================================================================
// IMPORT
// ============================================================================

/// A decoded image, normalized to 8-bit RGBA whatever the file held.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Channel count of the source file (1 = grey, 3 = RGB, 4 = RGBA, ...).
    pub channels: u8,
    /// `width * height * 4` bytes, row-major RGBA.
    pub rgba: Vec<u8>,
}

/// Decode any raster format the `image` crate understands.
pub fn load_image(path: &Path) -> Result<DecodedImage, IoError> {
    let img = image::open(path).map_err(|e| IoError::Decode(e.to_string()))?;
    decoded_from_dynamic(img)
}

/// Decode from an in-memory file (format sniffed from the bytes).
pub fn load_image_from_memory(bytes: &[u8]) -> Result<DecodedImage, IoError> {
    let img = image::load_from_memory(bytes).map_err(|e| IoError::Decode(e.to_string()))?;
    decoded_from_dynamic(img)
}

fn decoded_from_dynamic(img: image::DynamicImage) -> Result<DecodedImage, IoError> {
    let channels = img.color().channel_count();
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(IoError::EmptyImage);
    }
    Ok(DecodedImage { width, height, channels, rgba: rgba.into_raw() })
}

// ============================================================================
// EXPORT
// ============================================================================

/// Output formats. All of them are written as RGB; alpha is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SaveFormat {
    #[default]
    Jpeg,
    Png,
    Bmp,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Png => "png",
            SaveFormat::Bmp => "bmp",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SaveFormat::Jpeg => "JPEG",
            SaveFormat::Png => "PNG",
            SaveFormat::Bmp => "BMP",
        }
    }

    pub fn supports_quality(&self) -> bool {
        matches!(self, SaveFormat::Jpeg)
    }

    pub fn all() -> &'static [SaveFormat] {
        &[SaveFormat::Jpeg, SaveFormat::Png, SaveFormat::Bmp]
    }

    /// Parse a user-supplied name or extension (`jpg`, `JPEG`, `png`, ...).
    pub fn from_name(name: &str) -> Option<SaveFormat> {
        match name.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(SaveFormat::Jpeg),
            "png" => Some(SaveFormat::Png),
            "bmp" => Some(SaveFormat::Bmp),
            _ => None,
        }
    }

    /// Format implied by a path's extension.
    pub fn from_path(path: &Path) -> Option<SaveFormat> {
        path.extension().and_then(|e| e.to_str()).and_then(Self::from_name)
    }
}

/// Encode `buffer` as `format` into `writer`. JPEG quality is clamped to `[1, 100]`.
pub fn encode_image<W: Write>(
    buffer: &PixelBuffer,
    writer: W,
    format: SaveFormat,
    quality: u8,
) -> Result<(), IoError> {
    let rgb = buffer.to_rgb_bytes();
    let (w, h) = (buffer.width(), buffer.height());
    let result = match format {
        SaveFormat::Jpeg => {
            JpegEncoder::new_with_quality(writer, quality.clamp(1, 100)).write_image(&rgb, w, h, ColorType::Rgb8)
        }
        SaveFormat::Png => PngEncoder::new(writer).write_image(&rgb, w, h, ColorType::Rgb8),
        SaveFormat::Bmp => {
            let mut writer = writer;
            BmpEncoder::new(&mut writer).write_image(&rgb, w, h, ColorType::Rgb8)
        }
    };
    result.map_err(|e| IoError::Encode(e.to_string()))
}

pub fn encode_to_vec(buffer: &PixelBuffer, format: SaveFormat, quality: u8) -> Result<Vec<u8>, IoError> {
    let mut cursor = Cursor::new(Vec::new());
    encode_image(buffer, &mut cursor, format, quality)?;
    Ok(cursor.into_inner())
}

/// Write `buffer` to `path`. The file is only created once encoding succeeded,
/// so a failed export never leaves a truncated file behind.
pub fn export_image(buffer: &PixelBuffer, path: &Path, format: SaveFormat, quality: u8) -> Result<(), IoError> {
    let bytes = encode_to_vec(buffer, format, quality)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
