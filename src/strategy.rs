//! Static registry of compression strategies.
//!
//! Every strategy is a [`StrategyId`] bound to a default [`StrategyConfig`]
//! (codec, quality or optimization level, resize rule and filter). Callers
//! may override the parameters a strategy lists in
//! [`StrategyId::accepted_params`]; nothing else is configurable.

use crate::constants::{DEFAULT_PNG_LEVEL, MAX_PNG_LEVEL, MAX_QUALITY, MIN_QUALITY};
use crate::error::{BenchError, Result};
use image::imageops::FilterType;
use std::fmt;
use std::str::FromStr;

const JPEG_QUALITY_PARAMS: &[&str] = &["quality"];
const JPEG_RESIZE_PARAMS: &[&str] = &["quality", "scale", "width", "height", "filter"];
const PNG_PARAMS: &[&str] = &["level", "scale", "width", "height"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyId {
    Quality60Jpeg,
    Quality70Jpeg,
    Quality75Jpeg,
    Quality85Jpeg,
    Resize90Pct,
    LinearResize90Pct,
    PngLossless,
}

impl StrategyId {
    pub const ALL: [StrategyId; 7] = [
        StrategyId::Quality60Jpeg,
        StrategyId::Quality70Jpeg,
        StrategyId::Quality75Jpeg,
        StrategyId::Quality85Jpeg,
        StrategyId::Resize90Pct,
        StrategyId::LinearResize90Pct,
        StrategyId::PngLossless,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyId::Quality60Jpeg => "quality-60-jpeg",
            StrategyId::Quality70Jpeg => "quality-70-jpeg",
            StrategyId::Quality75Jpeg => "quality-75-jpeg",
            StrategyId::Quality85Jpeg => "quality-85-jpeg",
            StrategyId::Resize90Pct => "resize-90pct",
            StrategyId::LinearResize90Pct => "linear-resize-90pct",
            StrategyId::PngLossless => "png-lossless",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrategyId::Quality60Jpeg
            | StrategyId::Quality70Jpeg
            | StrategyId::Quality75Jpeg
            | StrategyId::Quality85Jpeg => "Re-encode as JPEG at a fixed quality, original dimensions",
            StrategyId::Resize90Pct => "Lanczos3 downscale, then JPEG re-encode",
            StrategyId::LinearResize90Pct => "Linear (triangle) downscale, then JPEG re-encode",
            StrategyId::PngLossless => "Lossless PNG re-encode optimized with oxipng",
        }
    }

    /// Parameter keys this strategy accepts as overrides.
    pub fn accepted_params(&self) -> &'static [&'static str] {
        match self {
            StrategyId::Quality60Jpeg
            | StrategyId::Quality70Jpeg
            | StrategyId::Quality75Jpeg
            | StrategyId::Quality85Jpeg => JPEG_QUALITY_PARAMS,
            StrategyId::Resize90Pct | StrategyId::LinearResize90Pct => JPEG_RESIZE_PARAMS,
            StrategyId::PngLossless => PNG_PARAMS,
        }
    }

    pub fn defaults(&self) -> StrategyConfig {
        match self {
            StrategyId::Quality60Jpeg => StrategyConfig::jpeg(60),
            StrategyId::Quality70Jpeg => StrategyConfig::jpeg(70),
            StrategyId::Quality75Jpeg => StrategyConfig::jpeg(75),
            StrategyId::Quality85Jpeg => StrategyConfig::jpeg(85),
            StrategyId::Resize90Pct => StrategyConfig {
                resize: ResizeRule::Scale(0.9),
                filter: FilterType::Lanczos3,
                ..StrategyConfig::jpeg(75)
            },
            StrategyId::LinearResize90Pct => StrategyConfig {
                resize: ResizeRule::Scale(0.9),
                filter: FilterType::Triangle,
                ..StrategyConfig::jpeg(75)
            },
            StrategyId::PngLossless => StrategyConfig {
                codec: Codec::Png,
                ..StrategyConfig::jpeg(MAX_QUALITY)
            },
        }
    }

    /// Applies a single `key=value` override to `config`, rejecting keys this
    /// strategy does not list and values out of range.
    pub fn apply_param(&self, config: &mut StrategyConfig, key: &str, value: &str) -> Result<()> {
        let key = key.trim().to_lowercase();
        if !self.accepted_params().contains(&key.as_str()) {
            return Err(BenchError::UnknownParameter {
                strategy: self.name().to_string(),
                key,
                accepted: self.accepted_params().join(", "),
            });
        }

        let value = value.trim();
        match key.as_str() {
            "quality" => {
                let quality = parse_number::<u8>(&key, value)?;
                validate_quality(quality)?;
                config.quality = quality;
            }
            "level" => {
                let level = parse_number::<u8>(&key, value)?;
                if level > MAX_PNG_LEVEL {
                    return Err(BenchError::InvalidLevel(level));
                }
                config.level = level;
            }
            "scale" => {
                let scale = parse_number::<f32>(&key, value)?;
                validate_scale(scale)?;
                config.resize = ResizeRule::Scale(scale);
            }
            "width" | "height" => {
                let side = parse_number::<u32>(&key, value)?;
                let (mut width, mut height) = match config.resize {
                    ResizeRule::Dimensions { width, height } => (width, height),
                    _ => (None, None),
                };
                if key == "width" {
                    width = Some(side);
                } else {
                    height = Some(side);
                }
                if side == 0 {
                    return Err(BenchError::InvalidDimensions(
                        width.unwrap_or(0),
                        height.unwrap_or(0),
                    ));
                }
                config.resize = ResizeRule::Dimensions { width, height };
            }
            "filter" => {
                config.filter = parse_filter(value)?;
            }
            _ => unreachable!("accepted_params lists only handled keys"),
        }

        Ok(())
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyId {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        StrategyId::ALL
            .iter()
            .copied()
            .find(|id| id.name() == wanted)
            .ok_or_else(|| BenchError::UnknownStrategy(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Jpeg,
    Png,
}

impl Codec {
    pub fn extension(&self) -> &'static str {
        match self {
            Codec::Jpeg => "jpg",
            Codec::Png => "png",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Codec::Jpeg => "JPEG",
            Codec::Png => "PNG",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeRule {
    /// Keep the source dimensions.
    Original,
    /// Scale both sides by a factor in (0, 1].
    Scale(f32),
    /// Absolute target. A missing side is derived from the aspect ratio.
    Dimensions {
        width: Option<u32>,
        height: Option<u32>,
    },
}

impl ResizeRule {
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        match *self {
            ResizeRule::Original => (width, height),
            ResizeRule::Scale(factor) => (scale_side(width, factor), scale_side(height, factor)),
            ResizeRule::Dimensions {
                width: Some(w),
                height: Some(h),
            } => (w, h),
            ResizeRule::Dimensions {
                width: Some(w),
                height: None,
            } => (w, proportional_side(height, w, width)),
            ResizeRule::Dimensions {
                width: None,
                height: Some(h),
            } => (proportional_side(width, h, height), h),
            ResizeRule::Dimensions { .. } => (width, height),
        }
    }
}

impl fmt::Display for ResizeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizeRule::Original => write!(f, "original size"),
            ResizeRule::Scale(factor) => write!(f, "scale {:.0}%", factor * 100.0),
            ResizeRule::Dimensions { width, height } => {
                let side = |s: &Option<u32>| s.map_or_else(|| "auto".to_string(), |v| v.to_string());
                write!(f, "{}x{}", side(width), side(height))
            }
        }
    }
}

fn scale_side(side: u32, factor: f32) -> u32 {
    (side as f64 * factor as f64).round().max(1.0) as u32
}

fn proportional_side(other: u32, target: u32, side: u32) -> u32 {
    (other as f64 * target as f64 / side.max(1) as f64)
        .round()
        .max(1.0) as u32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyConfig {
    pub codec: Codec,
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// oxipng preset, 0-6. Only used by the PNG codec.
    pub level: u8,
    pub resize: ResizeRule,
    pub filter: FilterType,
}

impl StrategyConfig {
    fn jpeg(quality: u8) -> Self {
        Self {
            codec: Codec::Jpeg,
            quality,
            level: DEFAULT_PNG_LEVEL,
            resize: ResizeRule::Original,
            filter: FilterType::Lanczos3,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_quality(self.quality)?;
        if self.level > MAX_PNG_LEVEL {
            return Err(BenchError::InvalidLevel(self.level));
        }
        match self.resize {
            ResizeRule::Scale(scale) => validate_scale(scale),
            ResizeRule::Dimensions { width, height }
                if width == Some(0) || height == Some(0) =>
            {
                Err(BenchError::InvalidDimensions(
                    width.unwrap_or(0),
                    height.unwrap_or(0),
                ))
            }
            _ => Ok(()),
        }
    }

    /// One-line human readable summary, e.g. `JPEG q60, scale 90% (Lanczos3)`.
    pub fn describe(&self) -> String {
        let codec = match self.codec {
            Codec::Jpeg => format!("{} q{}", self.codec, self.quality),
            Codec::Png => format!("{} level {}", self.codec, self.level),
        };
        match self.resize {
            ResizeRule::Original => format!("{}, {}", codec, self.resize),
            _ => format!("{}, {} ({:?})", codec, self.resize, self.filter),
        }
    }
}

fn validate_quality(quality: u8) -> Result<()> {
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        return Err(BenchError::InvalidQuality(quality));
    }
    Ok(())
}

fn validate_scale(scale: f32) -> Result<()> {
    if !(scale > 0.0 && scale <= 1.0) {
        return Err(BenchError::InvalidScale(scale));
    }
    Ok(())
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        BenchError::InvalidParameter(key.to_string(), format!("cannot parse '{}'", value))
    })
}

pub fn parse_filter(name: &str) -> Result<FilterType> {
    match name.trim().to_lowercase().as_str() {
        "lanczos" | "lanczos3" => Ok(FilterType::Lanczos3),
        "linear" | "triangle" | "bilinear" => Ok(FilterType::Triangle),
        "cubic" | "catmullrom" | "catmull-rom" => Ok(FilterType::CatmullRom),
        "gaussian" => Ok(FilterType::Gaussian),
        "nearest" => Ok(FilterType::Nearest),
        other => Err(BenchError::InvalidParameter(
            "filter".to_string(),
            format!(
                "unknown filter '{}' (expected lanczos3, triangle, catmullrom, gaussian or nearest)",
                other
            ),
        )),
    }
}
