use std::time::Instant;

use sb_core::memory::{MemoryCard, MemorySurface};
use sb_core::{BlockConfig, Reconciler};

pub struct PerfBudgetOptions {
    pub cards: usize,
    pub iterations: usize,
}

const BUDGET_FULL_PASS_P99_MS: f64 = 8.0;
const BUDGET_CLEAN_PASS_P99_MS: f64 = 1.0;
const BUDGET_INVALIDATED_PASS_P99_MS: f64 = 8.0;

fn synthetic_feed(cards: usize) -> MemorySurface {
    MemorySurface::with_cards((0..cards).map(|i| {
        let name = format!("streamer{}", i);
        let tag = format!("tag{}", i % 50);
        MemoryCard::new(Some(&name), &[&tag, "talk", "game"])
    }))
}

fn synthetic_config(cards: usize) -> BlockConfig {
    let mut config = BlockConfig::default();
    for i in (0..cards).step_by(5) {
        config.blocked_streamers.insert(format!("streamer{}", i));
    }
    for i in (0..50).step_by(10) {
        config.blocked_tags.insert(format!("tag{}", i));
    }
    config
}

pub fn run_perf_budget(opts: PerfBudgetOptions) -> Result<(), String> {
    if opts.iterations == 0 {
        return Err("Iterations must be at least 1".to_string());
    }

    println!("Performance Budget Check");
    println!("==================================================");
    println!("Feed: {} cards, {} iterations", opts.cards, opts.iterations);

    let config = synthetic_config(opts.cards);

    println!("Measuring full passes...");
    let mut full = Vec::with_capacity(opts.iterations);
    for _ in 0..opts.iterations {
        let mut surface = synthetic_feed(opts.cards);
        let mut reconciler = Reconciler::new(config.clone());
        let start = Instant::now();
        let _ = reconciler.apply(&mut surface);
        full.push(start.elapsed().as_secs_f64() * 1000.0);
    }

    let mut surface = synthetic_feed(opts.cards);
    let mut reconciler = Reconciler::new(config);
    let first = reconciler.apply(&mut surface);
    println!("  {} hidden on first pass", first.hidden.len());

    println!("Measuring clean passes...");
    let mut clean = Vec::with_capacity(opts.iterations);
    for _ in 0..opts.iterations {
        let start = Instant::now();
        let report = reconciler.apply(&mut surface);
        clean.push(start.elapsed().as_secs_f64() * 1000.0);
        if report.changes() > 0 {
            return Err("Clean pass changed visibility".to_string());
        }
    }

    println!("Measuring invalidated passes...");
    let mut invalidated = Vec::with_capacity(opts.iterations);
    for _ in 0..opts.iterations {
        reconciler.invalidate_all();
        let start = Instant::now();
        let _ = reconciler.apply(&mut surface);
        invalidated.push(start.elapsed().as_secs_f64() * 1000.0);
    }

    for samples in [&mut full, &mut clean, &mut invalidated] {
        samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    }

    let mut passed = true;
    println!();
    println!("Results");
    println!("--------------------------------------------------");

    passed &= report_budget("Full Pass P99", percentile(&full, 0.99), BUDGET_FULL_PASS_P99_MS, "ms");
    passed &= report_budget("Clean Pass P99", percentile(&clean, 0.99), BUDGET_CLEAN_PASS_P99_MS, "ms");
    passed &= report_budget(
        "Invalidated Pass P99",
        percentile(&invalidated, 0.99),
        BUDGET_INVALIDATED_PASS_P99_MS,
        "ms",
    );

    println!();
    println!("==================================================");

    if passed {
        println!("✓ All performance budgets passed");
        Ok(())
    } else {
        Err("Performance budget exceeded".to_string())
    }
}

fn report_budget(name: &str, actual: f64, limit: f64, unit: &str) -> bool {
    let passed = actual <= limit;
    let status = if passed { "✓" } else { "✗" };
    println!(
        "{} {}: {:.3} {} (limit: {:.2} {})",
        status, name, actual, unit, limit, unit
    );
    passed
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64) * p).ceil() as usize;
    let idx = idx.saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_picks_upper_rank() {
        let samples = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&samples, 0.5), 2.0);
        assert_eq!(percentile(&samples, 0.99), 4.0);
        assert_eq!(percentile(&[], 0.99), 0.0);
    }

    #[test]
    fn test_synthetic_config_blocks_a_fraction() {
        let mut surface = synthetic_feed(100);
        let report = Reconciler::new(synthetic_config(100)).apply(&mut surface);
        assert!(report.hidden.len() >= 20);
        assert!(report.hidden.len() < 100);
    }
}
