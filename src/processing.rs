use crate::error::{BenchError, Result};
use crate::strategy::{Codec, StrategyConfig};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, GenericImageView, GrayImage, ImageReader, RgbImage};
use oxipng::Options;
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Encoded output of one strategy plus the pixel size it started from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub bytes: Vec<u8>,
    pub source_dimensions: (u32, u32),
}

/// Pure strategy transform: decode `input`, resize per `config`, encode.
///
/// The same bytes and config always produce the same output bytes; no
/// timestamps or other run-dependent data end up in the encoded file.
///
/// # Errors
/// * `BenchError::Decode` if the input is malformed or in an unsupported format
/// * `BenchError::Encode` / `BenchError::PngOptimization` if the codec rejects
///   the image or parameters
pub fn transform(input: &[u8], config: &StrategyConfig) -> Result<Transformed> {
    let mut img = decode_image(input)?;
    let source_dimensions = img.dimensions();
    resize_image(&mut img, config);
    let bytes = encode_image(&img, config)?;
    Ok(Transformed {
        bytes,
        source_dimensions,
    })
}

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()
        .map_err(BenchError::Decode)
}

pub fn resize_image(img: &mut DynamicImage, config: &StrategyConfig) {
    let (width, height) = img.dimensions();
    let (target_width, target_height) = config.resize.target_dimensions(width, height);
    if (target_width, target_height) == (width, height) {
        return;
    }

    crate::verbose!(
        "Resizing {}x{} -> {}x{} ({:?})",
        width,
        height,
        target_width,
        target_height,
        config.filter
    );
    *img = img.resize_exact(target_width, target_height, config.filter);
}

pub fn encode_image(img: &DynamicImage, config: &StrategyConfig) -> Result<Vec<u8>> {
    match config.codec {
        Codec::Jpeg => encode_jpeg(img, config.quality),
        Codec::Png => encode_png(img, config.level),
    }
}

/// JPEG has no alpha channel and no 16-bit samples: the image is reduced
/// to 8-bit gray or RGB, with translucent pixels composited onto white.
fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let flattened = flatten_onto_white(img);

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    flattened
        .write_with_encoder(encoder)
        .map_err(BenchError::Encode)?;
    Ok(buffer)
}

fn flatten_onto_white(img: &DynamicImage) -> DynamicImage {
    let color = img.color();
    match (color.has_color(), color.has_alpha()) {
        (false, false) => DynamicImage::ImageLuma8(img.to_luma8()),
        (true, false) => DynamicImage::ImageRgb8(img.to_rgb8()),
        (false, true) => {
            let gray_alpha = img.to_luma_alpha8();
            let flat = GrayImage::from_fn(img.width(), img.height(), |x, y| {
                let [luma, alpha] = gray_alpha.get_pixel(x, y).0;
                image::Luma([blend_white(luma, alpha)])
            });
            DynamicImage::ImageLuma8(flat)
        }
        (true, true) => {
            let rgba = img.to_rgba8();
            let flat = RgbImage::from_fn(img.width(), img.height(), |x, y| {
                let [r, g, b, alpha] = rgba.get_pixel(x, y).0;
                image::Rgb([
                    blend_white(r, alpha),
                    blend_white(g, alpha),
                    blend_white(b, alpha),
                ])
            });
            DynamicImage::ImageRgb8(flat)
        }
    }
}

fn blend_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (channel as u32, alpha as u32);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

fn encode_png(img: &DynamicImage, level: u8) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    img.write_with_encoder(PngEncoder::new(&mut raw))
        .map_err(BenchError::Encode)?;

    let options = Options::from_preset(level);
    oxipng::optimize_from_memory(&raw, &options)
        .map_err(|e| BenchError::PngOptimization(e.to_string()))
}

/// Writes `bytes` to `output_path` through a temporary file in the same
/// directory, so a failed write never leaves a partial output behind.
pub fn write_output(bytes: &[u8], output_path: &Path) -> Result<()> {
    let dir = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(output_path).map_err(|e| e.error)?;
    Ok(())
}
