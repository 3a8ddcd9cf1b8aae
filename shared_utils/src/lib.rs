//! Shared Utilities for the batch image convert tools
//!
//! This crate provides common functionality shared across the workspace:
//! - Progress bar with ETA
//! - Safety checks (dangerous directory detection)
//! - Batch file collection utilities
//! - Common logging and reporting

pub mod batch;
pub mod logging;
pub mod progress;
pub mod report;
pub mod safety;

pub use batch::{collect_files, has_extension, IMAGE_EXTENSIONS};
pub use progress::{create_progress_bar, format_bytes, format_duration, format_signed_bytes};
pub use report::{print_failure_list, print_simple_summary, print_summary_report, RunTotals};
pub use safety::check_dangerous_directory;
