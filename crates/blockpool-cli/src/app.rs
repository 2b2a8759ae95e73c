//! Application entry point and dispatch.

use std::time::Instant;

use anyhow::{ensure, Context, Result};

use blockpool::{Block, BlockPool};

use crate::config::AppConfig;
use crate::report::{format_json, format_summary, format_text, Report};

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    // Handle shell completion
    if let Some(shell) = config.completion {
        crate::completion::write_completion(shell, &mut std::io::stdout());
        return Ok(());
    }

    let report = exercise(config)?;

    if config.json {
        println!("{}", format_json(&report)?);
    } else if config.quiet {
        println!("{}", format_summary(&report));
    } else {
        print!("{}", format_text(&report));
    }
    Ok(())
}

/// Create the pool, run the configured rounds, and destroy it.
///
/// Each round acquires blocks until the pool is exhausted, stamps every block
/// with its own index, checks that no stamp was clobbered by another block,
/// and releases everything.
pub fn exercise(config: &AppConfig) -> Result<Report> {
    let pool_config = config.pool_config();
    let mut pool = BlockPool::from_config(&pool_config).context("creating block pool")?;
    let print_blocks = config.verbose && !config.quiet && !config.json;

    let started = Instant::now();
    let mut acquired_per_round = Vec::new();
    for round in 0..config.rounds {
        let held = fill(&mut pool, round, print_blocks)?;
        for block in &held {
            let stamp: usize = pool.read(block)?;
            ensure!(
                stamp == block.index(),
                "block {} holds stamp {stamp} while lent",
                block.index()
            );
        }
        acquired_per_round.push(held.len());
        tracing::debug!(round, acquired = held.len(), "round finished");
        for block in held {
            pool.release(block);
        }
    }
    let elapsed = started.elapsed();

    let report = Report {
        blocks: pool.block_count(),
        requested_block_size: pool_config.block_size,
        block_size: pool.block_size(),
        total_size: pool.total_size(),
        rounds: config.rounds,
        acquired_per_round,
        stats: pool.stats(),
        elapsed_us: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
    };
    pool.destroy();
    tracing::info!(rounds = report.rounds, acquires = report.stats.acquires, "exercise finished");
    Ok(report)
}

fn fill(pool: &mut BlockPool, round: u32, print_blocks: bool) -> Result<Vec<Block>> {
    let mut held = Vec::with_capacity(pool.block_count());
    while let Some(block) = pool.acquire() {
        pool.write(&block, &block.index())?;
        if print_blocks {
            println!(
                "round {round}: block {} at offset {}",
                block.index(),
                pool.offset_of(&block)
            );
        }
        held.push(block);
    }
    Ok(held)
}
