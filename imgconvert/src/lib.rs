//! imgconvert - batch image conversion between classic formats
//!
//! The conversion core is a pure policy layer over the `image` codec crate:
//! per-file output path resolution, transparency flattening for targets
//! without alpha support, format-specific encode parameters, and sequential
//! batch orchestration with per-file error isolation.

pub mod conversion_api;
pub mod errors;
pub mod formats;

pub use conversion_api::{
    convert_batch, convert_one, prepare_for_encode, resolve_output_path, BatchSummary,
    ConversionRequest, ConversionResult, ProgressEvent,
};
pub use errors::{ConvertError, Result};
pub use formats::{encode_options, EncodeOptions, TargetFormat};
