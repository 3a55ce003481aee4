use crate::batch::{BenchmarkResult, RunSummary};
use crate::constants::{
    COMPRESSED_DIMENSIONS_PREFIX, COMPRESSED_SIZE_PREFIX, COMPRESSION_RATIO_PREFIX,
    ORIGINAL_DIMENSIONS_PREFIX, ORIGINAL_SIZE_PREFIX, SUCCESS_PREFIX, WARNING_PREFIX,
};
use crate::strategy::StrategyId;
use std::collections::BTreeMap;
use std::time::Duration;

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Calculate compression ratio as a percentage
///
/// Positive means reduction, negative means the output grew.
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - compressed_size as f64) / original_size as f64) * 100.0
}

fn describe_ratio(ratio: f64) -> String {
    if ratio >= 0.0 {
        format!("{:.1}% smaller", ratio)
    } else {
        format!("{:.1}% larger", ratio.abs())
    }
}

fn format_dimensions((width, height): (u32, u32)) -> String {
    format!("{}x{}", width, height)
}

/// One report line for a successful strategy run.
pub fn format_result(result: &BenchmarkResult) -> String {
    let name = result
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| result.input.display().to_string());

    let dimensions = if result.dimensions_preserved() {
        format!("{} kept", format_dimensions(result.output_dimensions))
    } else {
        format!(
            "{} -> {}",
            format_dimensions(result.source_dimensions),
            format_dimensions(result.output_dimensions)
        )
    };

    format!(
        "{} [{}] {}: {} -> {} ({}), {} in {:.2?} -> {}",
        SUCCESS_PREFIX,
        result.strategy,
        name,
        format_file_size(result.original_size),
        format_file_size(result.compressed_size),
        describe_ratio(result.compression_ratio()),
        dimensions,
        result.duration,
        result.output.display()
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyStats {
    pub strategy: StrategyId,
    pub runs: usize,
    pub total_original: u64,
    pub total_compressed: u64,
    pub total_duration: Duration,
}

impl StrategyStats {
    pub fn compression_ratio(&self) -> f64 {
        calculate_compression_ratio(self.total_original, self.total_compressed)
    }

    pub fn average_duration(&self) -> Duration {
        if self.runs == 0 {
            return Duration::ZERO;
        }
        self.total_duration / self.runs as u32
    }
}

/// Aggregates results per strategy, ordered as in the registry.
pub fn summarize_by_strategy(results: &[BenchmarkResult]) -> Vec<StrategyStats> {
    let mut stats: BTreeMap<StrategyId, StrategyStats> = BTreeMap::new();
    for result in results {
        let entry = stats.entry(result.strategy).or_insert(StrategyStats {
            strategy: result.strategy,
            runs: 0,
            total_original: 0,
            total_compressed: 0,
            total_duration: Duration::ZERO,
        });
        entry.runs += 1;
        entry.total_original += result.original_size;
        entry.total_compressed += result.compressed_size;
        entry.total_duration += result.duration;
    }
    stats.into_values().collect()
}

pub fn print_summary(summary: &RunSummary) {
    if summary.tallies.is_empty() {
        return;
    }

    let failed_files = summary.tallies.iter().filter(|t| t.failed > 0).count();

    crate::report!("\n📊 Benchmark Summary:");
    crate::report!(
        "  📁 Files processed: {} ({} with failures)",
        summary.tallies.len(),
        failed_files
    );
    crate::report!("  {} Successful runs: {}", SUCCESS_PREFIX, summary.total_succeeded());
    if summary.total_failed() > 0 {
        crate::report!("  {}  Failed runs: {}", WARNING_PREFIX, summary.total_failed());
    }
    crate::report!("  ⏱️  Total time: {:.2?}", summary.elapsed);

    let stats = summarize_by_strategy(&summary.results);
    if !stats.is_empty() {
        crate::report!("\n📈 Per strategy:");
        for stat in &stats {
            crate::report!(
                "  {:<20} runs: {:<3} {} -> {} ({}), avg {:.2?}",
                stat.strategy.name(),
                stat.runs,
                format_file_size(stat.total_original),
                format_file_size(stat.total_compressed),
                describe_ratio(stat.compression_ratio()),
                stat.average_duration()
            );
        }
    }

    crate::report!("\n📋 Per file:");
    for tally in &summary.tallies {
        let marker = if tally.failed == 0 {
            SUCCESS_PREFIX
        } else {
            WARNING_PREFIX
        };
        crate::report!(
            "  {} {:?}: {} succeeded, {} failed",
            marker, tally.path, tally.succeeded, tally.failed
        );
    }
}

/// Prints the registry with default parameters and accepted override keys.
pub fn print_strategies() {
    crate::report!("📋 Available strategies:");
    for id in StrategyId::ALL {
        crate::report!("  {:<20} {}", id.name(), id.description());
        crate::report!("  {:<20} defaults: {}", "", id.defaults().describe());
        crate::report!(
            "  {:<20} params:   {}",
            "",
            id.accepted_params().join(", ")
        );
    }
}

/// Multi-line report for a single result, used when only one file and one
/// strategy ran.
pub fn print_result_details(result: &BenchmarkResult) {
    crate::report!(
        "{} {} ({})",
        ORIGINAL_SIZE_PREFIX,
        result.original_size,
        format_file_size(result.original_size)
    );
    crate::report!(
        "{} {} ({})",
        COMPRESSED_SIZE_PREFIX,
        result.compressed_size,
        format_file_size(result.compressed_size)
    );
    crate::report!(
        "{} {:.1}%",
        COMPRESSION_RATIO_PREFIX,
        result.compression_ratio()
    );
    crate::report!(
        "{} {}",
        ORIGINAL_DIMENSIONS_PREFIX,
        format_dimensions(result.source_dimensions)
    );
    crate::report!(
        "{} {}",
        COMPRESSED_DIMENSIONS_PREFIX,
        format_dimensions(result.output_dimensions)
    );
    if result.dimensions_preserved() {
        crate::report!("   Dimensions are the same as the original.");
    } else {
        crate::report!("   Dimensions differ from the original.");
    }
    crate::report!("⏱️  Duration: {:.2?}", result.duration);
    crate::report!("📁 Output: {}", result.output.display());
}
