pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

pub const MAX_PNG_LEVEL: u8 = 6;
pub const DEFAULT_PNG_LEVEL: u8 = 2;

pub const DEFAULT_INPUT: &str = "in_images";
pub const DEFAULT_OUTPUT_DIR: &str = "out_images";
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Infix between the input file stem and the strategy id in output names.
pub const OUTPUT_INFIX: &str = "_compressed_";

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

// Common output message prefixes
pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const COMPRESSION_RATIO_PREFIX: &str = "🎯 Compression ratio:";
pub const ORIGINAL_DIMENSIONS_PREFIX: &str = "📏 Original dimensions:";
pub const COMPRESSED_DIMENSIONS_PREFIX: &str = "📐 Compressed dimensions:";
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const INFO_PREFIX: &str = "📋";
