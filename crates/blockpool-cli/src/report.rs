//! Exercise report and its text / JSON renderings.

use blockpool::PoolStats;
use serde::Serialize;

/// Outcome of one `blockpool` run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Number of blocks in the pool.
    pub blocks: usize,
    /// Block size given on the command line.
    pub requested_block_size: usize,
    /// Block size after word rounding.
    pub block_size: usize,
    /// Size of the pool buffer in bytes.
    pub total_size: usize,
    /// Number of rounds executed.
    pub rounds: u32,
    /// Blocks obtained before exhaustion, per round.
    pub acquired_per_round: Vec<usize>,
    /// Pool counters at the end of the run.
    pub stats: PoolStats,
    /// Wall time of the exercise in microseconds.
    pub elapsed_us: u64,
}

/// Multi-line human-readable report.
#[must_use]
pub fn format_text(report: &Report) -> String {
    let stats = &report.stats;
    let mut out = String::new();
    out.push_str(&format!(
        "Pool: {} blocks x {} bytes ({} bytes total)\n",
        format_number(report.blocks),
        report.block_size,
        format_number(report.total_size)
    ));
    if report.block_size != report.requested_block_size {
        out.push_str(&format!(
            "Block size rounded up from {} bytes\n",
            report.requested_block_size
        ));
    }
    out.push_str(&format!("Rounds: {}\n", report.rounds));
    out.push_str(&format!("Duration: {}\n", format_elapsed(report.elapsed_us)));
    out.push_str(&format!(
        "Acquires: {}  Releases: {}  Exhaustions: {}  High water: {}\n",
        format_number(stats.acquires),
        format_number(stats.releases),
        format_number(stats.exhaustions),
        format_number(stats.high_water)
    ));
    out.push_str(&format!("Hit rate: {:.1}%\n", stats.hit_rate() * 100.0));
    out
}

/// One-line summary for quiet mode.
#[must_use]
pub fn format_summary(report: &Report) -> String {
    format!(
        "{} blocks x {} bytes: {} acquires, {} exhaustions",
        report.blocks, report.block_size, report.stats.acquires, report.stats.exhaustions
    )
}

/// Pretty-printed JSON report.
pub fn format_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Format an elapsed time given in microseconds.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_elapsed(micros: u64) -> String {
    match micros {
        0..=999 => format!("{micros}µs"),
        1_000..=999_999 => format!("{:.2}ms", micros as f64 / 1e3),
        _ => format!("{:.3}s", micros as f64 / 1e6),
    }
}

/// Group the decimal digits of `n` in threes, separated by commas.
#[must_use]
pub fn format_number(n: impl std::fmt::Display) -> String {
    let digits = n.to_string();
    let head = match digits.len() % 3 {
        0 => 3.min(digits.len()),
        rem => rem,
    };
    let mut groups = vec![&digits[..head]];
    groups.extend((head..digits.len()).step_by(3).map(|i| &digits[i..i + 3]));
    groups.join(",")
}
