//! Conversion API Module
//!
//! Pure conversion layer over the `image` codec crate: output path
//! resolution, transparency flattening for alpha-less targets, encode
//! parameter mapping, and sequential batch orchestration. Per-file errors
//! are folded into results and never abort the batch.

use crate::errors::{ConvertError, Result};
use crate::formats::{encode_options, EncodeOptions, TargetFormat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::imageops;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Quality used when a lossy encode is requested without an explicit value.
const DEFAULT_QUALITY: u8 = 85;

/// Largest dimension the ICO container accepts; bigger sources are
/// downscaled to fit.
const ICO_MAX_DIMENSION: u32 = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub source_path: PathBuf,
    pub target_format: TargetFormat,
    /// 1..=100, only meaningful for JPEG/WebP.
    pub quality: u8,
    pub destination_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub source_path: String,
    pub output_path: Option<String>,
    pub success: bool,
    pub input_size: u64,
    pub output_size: Option<u64>,
    /// input − output, negative when the output grew; 0 on failure.
    pub bytes_saved: i64,
    pub error: Option<String>,
}

impl ConversionResult {
    fn success(source: &Path, output: &Path, input_size: u64, output_size: u64) -> Self {
        Self {
            source_path: source.display().to_string(),
            output_path: Some(output.display().to_string()),
            success: true,
            input_size,
            output_size: Some(output_size),
            bytes_saved: input_size as i64 - output_size as i64,
            error: None,
        }
    }

    fn failure(source: &Path, input_size: u64, error: ConvertError) -> Self {
        Self {
            source_path: source.display().to_string(),
            output_path: None,
            success: false,
            input_size,
            output_size: None,
            bytes_saved: 0,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub converted: usize,
    pub failed: usize,
    pub total_bytes_saved: i64,
}

impl BatchSummary {
    pub fn record(&mut self, result: &ConversionResult) {
        if result.success {
            self.converted += 1;
            self.total_bytes_saved += result.bytes_saved;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.converted + self.failed
    }
}

/// Emitted after each processed file. Fractions strictly increase in
/// input-list order.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub index: usize,
    pub total: usize,
    pub fraction: f64,
    pub status: String,
}

/// Output lands in `destination_dir` when set, otherwise next to the
/// source. The extension always comes from the fixed format table.
/// Existing outputs are overwritten.
pub fn resolve_output_path(
    source_path: &Path,
    target_format: TargetFormat,
    destination_dir: Option<&Path>,
) -> PathBuf {
    let stem = source_path.file_stem().unwrap_or_default().to_string_lossy();
    let file_name = format!("{}.{}", stem, target_format.extension());

    match destination_dir {
        Some(dir) => dir.join(file_name),
        None => source_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default()
            .join(file_name),
    }
}

/// Compatibility fix for targets without alpha support: sources carrying
/// transparency are composited onto a white canvas, alpha-free sources are
/// converted to plain RGB. Targets that can store alpha pass through
/// unchanged. Deterministic in (image, target_format).
pub fn prepare_for_encode(image: DynamicImage, target_format: TargetFormat) -> DynamicImage {
    if target_format.supports_alpha() {
        return image;
    }

    if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        imageops::overlay(&mut canvas, &rgba, 0, 0);
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    }
}

/// Encode into memory. Writing the file only after the encoder succeeded
/// guarantees no partially written output is left behind.
fn encode_to_buffer(
    image: &DynamicImage,
    format: TargetFormat,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        TargetFormat::Png => {
            let compression = if options.optimize {
                CompressionType::Best
            } else {
                CompressionType::Default
            };
            let encoder = PngEncoder::new_with_quality(&mut buf, compression, FilterType::Adaptive);
            image
                .write_with_encoder(encoder)
                .map_err(|e| ConvertError::Encode(e.to_string()))?;
        }
        TargetFormat::Jpeg => {
            let quality = options.quality.unwrap_or(DEFAULT_QUALITY);
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            image
                .write_with_encoder(encoder)
                .map_err(|e| ConvertError::Encode(e.to_string()))?;
        }
        TargetFormat::Webp => {
            // The image crate's WebP encoder is lossless-only; lossy
            // quality goes through the webp crate, which wants Rgb8/Rgba8.
            let quality = options.quality.unwrap_or(DEFAULT_QUALITY);
            let src = if image.color().has_alpha() {
                DynamicImage::ImageRgba8(image.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(image.to_rgb8())
            };
            let encoder =
                webp::Encoder::from_image(&src).map_err(|e| ConvertError::Encode(e.to_string()))?;
            let memory = if quality >= 100 {
                encoder.encode_lossless()
            } else {
                encoder.encode(quality as f32)
            };
            return Ok(memory.to_vec());
        }
        TargetFormat::Ico => {
            let (width, height) = (image.width(), image.height());
            if width > ICO_MAX_DIMENSION || height > ICO_MAX_DIMENSION {
                let shrunk = image.resize(
                    ICO_MAX_DIMENSION,
                    ICO_MAX_DIMENSION,
                    imageops::FilterType::Lanczos3,
                );
                shrunk
                    .write_to(&mut buf, ImageFormat::Ico)
                    .map_err(|e| ConvertError::Encode(e.to_string()))?;
            } else {
                image
                    .write_to(&mut buf, ImageFormat::Ico)
                    .map_err(|e| ConvertError::Encode(e.to_string()))?;
            }
        }
        TargetFormat::Bmp => {
            image
                .write_to(&mut buf, ImageFormat::Bmp)
                .map_err(|e| ConvertError::Encode(e.to_string()))?;
        }
        TargetFormat::Tiff => {
            image
                .write_to(&mut buf, ImageFormat::Tiff)
                .map_err(|e| ConvertError::Encode(e.to_string()))?;
        }
        TargetFormat::Gif => {
            image
                .write_to(&mut buf, ImageFormat::Gif)
                .map_err(|e| ConvertError::Encode(e.to_string()))?;
        }
    }

    Ok(buf.into_inner())
}

/// Convert a single file. Every failure path returns a result instead of
/// propagating, so one bad file never aborts the batch.
pub fn convert_one(request: &ConversionRequest) -> ConversionResult {
    let source = &request.source_path;
    let input_size = fs::metadata(source).map(|m| m.len()).unwrap_or(0);

    let image = match image::open(source) {
        Ok(img) => img,
        Err(e) => {
            return ConversionResult::failure(
                source,
                input_size,
                ConvertError::Decode(e.to_string()),
            );
        }
    };

    let output_path = resolve_output_path(
        source,
        request.target_format,
        request.destination_dir.as_deref(),
    );

    let prepared = prepare_for_encode(image, request.target_format);
    let options = encode_options(request.target_format, request.quality);

    let encoded = match encode_to_buffer(&prepared, request.target_format, &options) {
        Ok(bytes) => bytes,
        Err(e) => return ConversionResult::failure(source, input_size, e),
    };

    if let Err(e) = fs::write(&output_path, &encoded) {
        let _ = fs::remove_file(&output_path);
        return ConversionResult::failure(source, input_size, ConvertError::Io(e));
    }

    let output_size = fs::metadata(&output_path)
        .map(|m| m.len())
        .unwrap_or(encoded.len() as u64);

    ConversionResult::success(source, &output_path, input_size, output_size)
}

fn status_line(result: &ConversionResult) -> String {
    let name = Path::new(&result.source_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| result.source_path.clone());

    if result.success {
        format!(
            "✅ {} → {} ({})",
            name,
            result.output_path.as_deref().unwrap_or("?"),
            shared_utils::progress::format_signed_bytes(result.bytes_saved)
        )
    } else {
        format!(
            "❌ {}: {}",
            name,
            result.error.as_deref().unwrap_or("unknown error")
        )
    }
}

/// Process requests strictly in input order on the calling thread. The
/// cancellation token is checked before each file; once tripped the
/// remaining files are left untouched and the summary covers only the
/// files actually attempted.
pub fn convert_batch<F>(
    requests: &[ConversionRequest],
    cancel: &AtomicBool,
    mut on_event: F,
) -> (BatchSummary, Vec<ConversionResult>)
where
    F: FnMut(ProgressEvent),
{
    let total = requests.len();
    let mut summary = BatchSummary::default();
    let mut results = Vec::with_capacity(total);

    for (index, request) in requests.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            tracing::warn!(processed = index, total, "Batch cancelled, stopping");
            break;
        }

        let result = convert_one(request);
        summary.record(&result);

        on_event(ProgressEvent {
            index,
            total,
            fraction: (index + 1) as f64 / total as f64,
            status: status_line(&result),
        });

        results.push(result);
    }

    (summary, results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use proptest::prelude::*;

    fn rgba_image(width: u32, height: u32, pixel: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(pixel)))
    }

    #[test]
    fn test_resolve_output_path_with_destination() {
        let out = resolve_output_path(
            Path::new("/photos/cat.png"),
            TargetFormat::Jpeg,
            Some(Path::new("/out")),
        );
        assert_eq!(out, PathBuf::from("/out/cat.jpg"));
    }

    #[test]
    fn test_resolve_output_path_sibling() {
        let out = resolve_output_path(Path::new("/photos/cat.png"), TargetFormat::Webp, None);
        assert_eq!(out, PathBuf::from("/photos/cat.webp"));
    }

    #[test]
    fn test_resolve_output_path_strips_source_extension() {
        let out = resolve_output_path(Path::new("/a/b.image.tiff"), TargetFormat::Png, None);
        assert_eq!(out, PathBuf::from("/a/b.image.png"));
    }

    #[test]
    fn test_flatten_transparent_to_white_for_jpeg() {
        let img = rgba_image(4, 4, [0, 0, 0, 0]);
        let prepared = prepare_for_encode(img, TargetFormat::Jpeg);

        assert!(!prepared.color().has_alpha());
        let rgb = prepared.to_rgb8();
        for pixel in rgb.pixels() {
            assert_eq!(pixel.0, [255, 255, 255], "transparent pixels flatten to white");
        }
    }

    #[test]
    fn test_flatten_partial_alpha_blends_toward_white() {
        // 50% black over white lands mid-gray.
        let img = rgba_image(2, 2, [0, 0, 0, 128]);
        let prepared = prepare_for_encode(img, TargetFormat::Bmp);

        let rgb = prepared.to_rgb8();
        for pixel in rgb.pixels() {
            for channel in pixel.0 {
                assert!((120..=135).contains(&channel), "got {}", channel);
            }
        }
    }

    #[test]
    fn test_opaque_source_converted_to_plain_rgb() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(3, 3, image::Luma([90])));
        let prepared = prepare_for_encode(img, TargetFormat::Jpeg);
        assert_eq!(prepared.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn test_mode_passes_through_for_alpha_targets() {
        let img = rgba_image(3, 3, [10, 20, 30, 40]);
        let before = img.color();
        let prepared = prepare_for_encode(img, TargetFormat::Png);
        assert_eq!(prepared.color(), before);

        let gray = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(3, 3, image::Luma([7])));
        let prepared = prepare_for_encode(gray, TargetFormat::Webp);
        assert_eq!(prepared.color(), image::ColorType::L8);
    }

    #[test]
    fn test_prepare_is_deterministic() {
        let a = prepare_for_encode(rgba_image(4, 4, [5, 6, 7, 100]), TargetFormat::Jpeg);
        let b = prepare_for_encode(rgba_image(4, 4, [5, 6, 7, 100]), TargetFormat::Jpeg);
        assert_eq!(a.to_rgb8().as_raw(), b.to_rgb8().as_raw());
    }

    #[test]
    fn test_encode_to_buffer_jpeg_is_nonempty() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            8,
            8,
            image::Rgb([200, 100, 50]),
        ));
        let opts = encode_options(TargetFormat::Jpeg, 85);
        let bytes = encode_to_buffer(&img, TargetFormat::Jpeg, &opts).expect("encode");
        assert!(!bytes.is_empty());
        // JPEG SOI marker
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_to_buffer_ico_downscales_large_source() {
        let img = rgba_image(512, 512, [1, 2, 3, 255]);
        let opts = encode_options(TargetFormat::Ico, 85);
        let bytes = encode_to_buffer(&img, TargetFormat::Ico, &opts).expect("encode");

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Ico).expect("decode");
        let (w, h) = decoded.dimensions();
        assert!(w <= ICO_MAX_DIMENSION && h <= ICO_MAX_DIMENSION);
    }

    #[test]
    fn test_convert_batch_empty_makes_no_calls() {
        let cancel = AtomicBool::new(false);
        let mut events = 0;
        let (summary, results) = convert_batch(&[], &cancel, |_| events += 1);

        assert_eq!(summary.converted, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.total_bytes_saved, 0);
        assert!(results.is_empty());
        assert_eq!(events, 0);
    }

    proptest! {
        #[test]
        fn summary_counts_partition_results(
            outcomes in proptest::collection::vec((any::<bool>(), -10_000i64..10_000), 0..64)
        ) {
            let mut summary = BatchSummary::default();
            let mut expected_saved = 0i64;

            for (success, saved) in &outcomes {
                let result = ConversionResult {
                    source_path: "x.png".to_string(),
                    output_path: success.then(|| "x.jpg".to_string()),
                    success: *success,
                    input_size: 0,
                    output_size: None,
                    bytes_saved: if *success { *saved } else { 0 },
                    error: (!success).then(|| "boom".to_string()),
                };
                if *success {
                    expected_saved += *saved;
                }
                summary.record(&result);
            }

            prop_assert_eq!(summary.converted + summary.failed, outcomes.len());
            prop_assert_eq!(summary.total_bytes_saved, expected_saved);
        }
    }
}
