//! Report Module
//!
//! Provides summary reporting functionality for batch conversion runs.

use crate::progress::{format_duration, format_signed_bytes};
use std::path::PathBuf;
use std::time::Duration;

/// Aggregate counters a run hands to the reporter.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTotals {
    pub converted: usize,
    pub failed: usize,
    pub bytes_saved: i64,
}

impl RunTotals {
    pub fn total(&self) -> usize {
        self.converted + self.failed
    }

    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            100.0
        } else {
            (self.converted as f64 / self.total() as f64) * 100.0
        }
    }
}

pub fn print_summary_report(totals: &RunTotals, duration: Duration, operation_name: &str) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════════════════════╗");
    println!(
        "║                        📊 {} Summary Report                        ║",
        operation_name
    );
    println!("╠══════════════════════════════════════════════════════════════════════════════╣");
    println!(
        "║  📁 Files Processed:    {:>10}                                         ║",
        totals.total()
    );
    println!(
        "║  ✅ Converted:          {:>10}                                         ║",
        totals.converted
    );
    println!(
        "║  ❌ Failed:             {:>10}                                         ║",
        totals.failed
    );
    println!(
        "║  📈 Success Rate:       {:>9.1}%                                         ║",
        totals.success_rate()
    );
    println!("╠══════════════════════════════════════════════════════════════════════════════╣");
    println!(
        "║  💾 Bytes Saved:        {:>10}                                         ║",
        format_signed_bytes(totals.bytes_saved)
    );
    println!("╠══════════════════════════════════════════════════════════════════════════════╣");
    println!(
        "║  ⏱️  Total Time:         {:>10}                                         ║",
        format_duration(duration)
    );
    if totals.total() > 0 {
        let avg_time = duration.as_secs_f64() / totals.total() as f64;
        println!(
            "║  ⏱️  Avg Time/File:      {:>9.2}s                                         ║",
            avg_time
        );
    }
    println!("╚══════════════════════════════════════════════════════════════════════════════╝");
}

pub fn print_simple_summary(totals: &RunTotals) {
    println!(
        "\n✅ Complete: {} converted, {} failed, {} saved",
        totals.converted,
        totals.failed,
        format_signed_bytes(totals.bytes_saved)
    );
}

pub fn print_failure_list(errors: &[(PathBuf, String)]) {
    if errors.is_empty() {
        return;
    }
    println!();
    println!("❌ Errors encountered:");
    println!(
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    );
    for (path, error) in errors {
        println!("   {} → {}", path.display(), error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate_empty() {
        let totals = RunTotals::default();
        assert!(
            (totals.success_rate() - 100.0).abs() < 0.01,
            "Empty run should have 100% success rate"
        );
    }

    #[test]
    fn test_success_rate_mixed() {
        let totals = RunTotals {
            converted: 3,
            failed: 1,
            bytes_saved: 0,
        };
        assert_eq!(totals.total(), 4);
        assert!((totals.success_rate() - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_success_rate_all_fail() {
        let totals = RunTotals {
            converted: 0,
            failed: 10,
            bytes_saved: 0,
        };
        assert!((totals.success_rate() - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_print_summary_report_no_panic() {
        let totals = RunTotals {
            converted: 2,
            failed: 1,
            bytes_saved: -512,
        };
        print_summary_report(&totals, Duration::from_secs(10), "Test");
    }

    #[test]
    fn test_print_summary_report_empty() {
        print_summary_report(&RunTotals::default(), Duration::from_secs(1), "Test");
    }

    #[test]
    fn test_print_simple_summary_no_panic() {
        let totals = RunTotals {
            converted: 5,
            failed: 0,
            bytes_saved: 2048,
        };
        print_simple_summary(&totals);
    }

    #[test]
    fn test_print_failure_list_no_panic() {
        print_failure_list(&[]);
        print_failure_list(&[(PathBuf::from("a.png"), "decode failed".to_string())]);
    }
}
