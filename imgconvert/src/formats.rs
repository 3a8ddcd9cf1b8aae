//! Target format table and encode parameter policy.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Formats the converter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetFormat {
    Png,
    Jpeg,
    Webp,
    Bmp,
    Tiff,
    Gif,
    Ico,
}

impl TargetFormat {
    /// Fixed format → file extension mapping.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpeg => "jpg",
            TargetFormat::Webp => "webp",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Tiff => "tiff",
            TargetFormat::Gif => "gif",
            TargetFormat::Ico => "ico",
        }
    }

    /// JPEG and BMP cannot store an alpha channel; sources with
    /// transparency must be flattened before encoding to these targets.
    pub fn supports_alpha(&self) -> bool {
        !matches!(self, TargetFormat::Jpeg | TargetFormat::Bmp)
    }

    /// Quality is only meaningful for the lossy targets.
    pub fn is_lossy(&self) -> bool {
        matches!(self, TargetFormat::Jpeg | TargetFormat::Webp)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFormat::Png => "PNG",
            TargetFormat::Jpeg => "JPEG",
            TargetFormat::Webp => "WebP",
            TargetFormat::Bmp => "BMP",
            TargetFormat::Tiff => "TIFF",
            TargetFormat::Gif => "GIF",
            TargetFormat::Ico => "ICO",
        }
    }

    pub fn all() -> &'static [TargetFormat] {
        &[
            TargetFormat::Png,
            TargetFormat::Jpeg,
            TargetFormat::Webp,
            TargetFormat::Bmp,
            TargetFormat::Tiff,
            TargetFormat::Gif,
            TargetFormat::Ico,
        ]
    }
}

/// Format-specific encode parameters resolved from the run's quality
/// setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    pub quality: Option<u8>,
    pub optimize: bool,
}

/// Encode parameter policy:
/// - JPEG: quality + optimized entropy coding
/// - WebP: quality
/// - PNG: optimized (best) compression
/// - everything else: codec defaults
pub fn encode_options(format: TargetFormat, quality: u8) -> EncodeOptions {
    match format {
        TargetFormat::Jpeg => EncodeOptions {
            quality: Some(quality),
            optimize: true,
        },
        TargetFormat::Webp => EncodeOptions {
            quality: Some(quality),
            optimize: false,
        },
        TargetFormat::Png => EncodeOptions {
            quality: None,
            optimize: true,
        },
        _ => EncodeOptions {
            quality: None,
            optimize: false,
        },
    }
}
