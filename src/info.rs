use crate::constants::INFO_PREFIX;
use crate::error::{BenchError, Result};
use crate::report::format_file_size;
use image::{ColorType, ImageFormat, ImageReader};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExifEntry {
    pub tag: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub format: Option<ImageFormat>,
    pub width: u32,
    pub height: u32,
    pub color: ColorType,
    pub file_size: u64,
    /// Primary-IFD EXIF fields; empty when the file carries none.
    pub exif: Vec<ExifEntry>,
    pub orientation: Option<u32>,
}

impl ImageInfo {
    pub fn megapixels(&self) -> f64 {
        (self.width as u64 * self.height as u64) as f64 / 1_000_000.0
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }
}

/// Decodes `path` and collects dimensions, color type, size and EXIF.
///
/// A missing or unreadable EXIF block is not an error here; see
/// [`read_exif`] for the strict variant.
pub fn read_image_info(path: &Path) -> Result<ImageInfo> {
    if !path.exists() {
        return Err(BenchError::FileNotFound(path.to_path_buf()));
    }

    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    let img = reader.decode().map_err(BenchError::Decode)?;
    let file_size = fs::metadata(path)
        .map_err(|e| BenchError::Metadata(format!("cannot stat {:?}: {}", path, e)))?
        .len();

    let (exif, orientation) = match read_exif(path) {
        Ok(found) => found,
        Err(e) => {
            crate::verbose!("No EXIF metadata for {:?}: {}", path, e);
            (Vec::new(), None)
        }
    };

    Ok(ImageInfo {
        path: path.to_path_buf(),
        format,
        width: img.width(),
        height: img.height(),
        color: img.color(),
        file_size,
        exif,
        orientation,
    })
}

/// Reads the primary-IFD EXIF fields and the orientation tag.
///
/// Returns empty results when the container has no EXIF block.
///
/// # Errors
/// * `BenchError::Metadata` if the container is unsupported or the EXIF
///   data is malformed
pub fn read_exif(path: &Path) -> Result<(Vec<ExifEntry>, Option<u32>)> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok((Vec::new(), None)),
        Err(e) => return Err(BenchError::Metadata(e.to_string())),
    };

    let entries = exif
        .fields()
        .filter(|field| field.ifd_num == exif::In::PRIMARY)
        .map(|field| ExifEntry {
            tag: field.tag.to_string(),
            value: field.display_value().with_unit(&exif).to_string(),
        })
        .collect();

    let orientation = exif
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0));

    Ok((entries, orientation))
}

pub fn print_image_info(info: &ImageInfo) {
    crate::report!("{} Basic Information:", INFO_PREFIX);
    crate::report!("  📁 File: {:?}", info.path);
    crate::report!("  📏 Dimensions: {}x{} pixels", info.width, info.height);
    crate::report!(
        "  📦 File size: {} bytes ({})",
        info.file_size,
        format_file_size(info.file_size)
    );
    crate::report!("  🎨 Color type: {:?}", info.color);
    match info.format {
        Some(format) => {
            crate::report!("  🎭 Image format: {:?}", format);
        }
        None => {
            crate::report!("  🎭 Image format: unknown");
        }
    }
    crate::report!("  🔢 Megapixels: {:.2} MP", info.megapixels());
    crate::report!("  📐 Aspect ratio: {:.2}:1", info.aspect_ratio());

    if info.exif.is_empty() {
        crate::report!("\n🏷️  EXIF: none");
        return;
    }

    crate::report!("\n🏷️  EXIF ({} fields):", info.exif.len());
    for entry in &info.exif {
        crate::report!("  {:<28} {}", entry.tag, entry.value);
    }
    if let Some(orientation) = info.orientation {
        crate::report!("  🔄 Orientation: {}", orientation);
    }
}
