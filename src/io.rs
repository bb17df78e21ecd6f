use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tga::TgaEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageEncoder, ImageError, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// ============================================================================
// IMAGE LOADING
// ============================================================================

/// Decode any raster format the `image` crate understands into RGBA8.
pub fn load_image(path: &Path) -> Result<RgbaImage, ImageError> {
    Ok(image::open(path)?.to_rgba8())
}

/// Decode an in-memory encoded image (e.g. a stored PNG) into RGBA8.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

// ============================================================================
// ENCODING
// ============================================================================

/// Output formats for exported pictures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    Png,
    Jpeg,
    Bmp,
    Tga,
}

impl SaveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Bmp => "bmp",
            SaveFormat::Tga => "tga",
        }
    }

    /// Parse a format name or file extension. Unknown names map to PNG.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "jpeg" | "jpg" => SaveFormat::Jpeg,
            "bmp" => SaveFormat::Bmp,
            "tga" => SaveFormat::Tga,
            _ => SaveFormat::Png,
        }
    }

    /// Infer from a path's extension, defaulting to PNG.
    pub fn from_path(path: &Path) -> Self {
        Self::from_name(path.extension().and_then(|e| e.to_str()).unwrap_or(""))
    }
}

/// Encode `image` into `writer` in the requested format.
pub fn encode_to<W: Write>(
    image: &RgbaImage,
    writer: &mut W,
    format: SaveFormat,
    quality: u8,
) -> Result<(), ImageError> {
    match format {
        SaveFormat::Png => {
            PngEncoder::new(writer).write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )?;
        }
        SaveFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb_image = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100));
            encoder.encode(
                rgb_image.as_raw(),
                rgb_image.width(),
                rgb_image.height(),
                image::ColorType::Rgb8,
            )?;
        }
        SaveFormat::Bmp => {
            let mut encoder = BmpEncoder::new(writer);
            encoder.encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )?;
        }
        SaveFormat::Tga => {
            TgaEncoder::new(writer).write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )?;
        }
    }
    Ok(())
}

/// Encode and write an image to a file.
pub fn encode_and_write(
    image: &RgbaImage,
    path: &Path,
    format: SaveFormat,
    quality: u8,
) -> Result<(), ImageError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode_to(image, &mut writer, format, quality)?;
    writer.flush()?;
    Ok(())
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut out = Vec::new();
    encode_to(image, &mut out, SaveFormat::Png, 100)?;
    Ok(out)
}

pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut out = Vec::new();
    encode_to(image, &mut out, SaveFormat::Jpeg, quality)?;
    Ok(out)
}

// ============================================================================
// THUMBNAILS
// ============================================================================

/// Largest thumbnail box side. Bigger requests are clamped to it.
pub const MAX_THUMBNAIL_SIZE: u32 = 4096;

/// Scale so the image fits a `max_size` square, keeping the aspect ratio.
///
/// Small images are scaled up to the box as well; each side is at least 1 px.
pub fn make_thumbnail(image: &RgbaImage, max_size: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return RgbaImage::new(0, 0);
    }
    let (new_w, new_h) = thumbnail_size(w, h, max_size);
    image::imageops::resize(image, new_w, new_h, FilterType::Triangle)
}

/// Thumbnail dimensions for a `w`×`h` image fitted into `max_size`
/// (at most [`MAX_THUMBNAIL_SIZE`]).
pub fn thumbnail_size(w: u32, h: u32, max_size: u32) -> (u32, u32) {
    let max_size = max_size.clamp(1, MAX_THUMBNAIL_SIZE);
    let scale = (max_size as f64 / w as f64).min(max_size as f64 / h as f64);
    let new_w = ((w as f64 * scale) as u32).max(1);
    let new_h = ((h as f64 * scale) as u32).max(1);
    (new_w, new_h)
}
