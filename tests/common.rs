#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Deterministic noisy pixel source, so encoders have real work to do.
fn noise(x: u32, y: u32, salt: u32) -> u8 {
    let mut v = x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503) ^ salt.wrapping_mul(97);
    v ^= v >> 13;
    v = v.wrapping_mul(0x5bd1_e995);
    (v >> 24) as u8
}

pub fn create_test_jpeg(path: &Path, width: u32, height: u32, quality: u8) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let gradient = ((x + y) % 256) as u8;
        Rgb([
            gradient / 2 + noise(x, y, 1) / 2,
            noise(x, y, 2),
            gradient / 2 + noise(x, y, 3) / 2,
        ])
    });

    let writer = BufWriter::new(File::create(path).unwrap());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);
    DynamicImage::ImageRgb8(img).write_with_encoder(encoder).unwrap();
}

pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    DynamicImage::ImageRgba8(img)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

pub fn create_fake_image(path: &Path) {
    File::create(path)
        .unwrap()
        .write_all(b"fake image data")
        .unwrap();
}

/// `a.jpeg` (500x500) next to `b.txt`.
pub fn create_mixed_input_dir(temp_dir: &Path) -> PathBuf {
    let input_dir = temp_dir.join("in_images");
    std::fs::create_dir(&input_dir).unwrap();
    create_test_jpeg(&input_dir.join("a.jpeg"), 500, 500, 95);
    File::create(input_dir.join("b.txt"))
        .unwrap()
        .write_all(b"not an image")
        .unwrap();
    input_dir
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}
