//! Application configuration from CLI flags and environment.

use blockpool::config::{DEFAULT_BLOCK_COUNT, DEFAULT_BLOCK_SIZE};
use blockpool::PoolConfig;
use clap::Parser;

/// blockpool: exercise a fixed-block memory pool and report its usage.
#[derive(Parser, Debug)]
#[command(name = "blockpool", version, about)]
pub struct AppConfig {
    /// Number of blocks to reserve.
    #[arg(short, long, default_value_t = DEFAULT_BLOCK_COUNT, env = "BLOCKPOOL_BLOCKS")]
    pub blocks: usize,

    /// Nominal block size in bytes (rounded up to the pointer width).
    #[arg(short = 's', long, default_value_t = DEFAULT_BLOCK_SIZE, env = "BLOCKPOOL_BLOCK_SIZE")]
    pub block_size: usize,

    /// Number of acquire-all / release-all rounds.
    #[arg(short, long, default_value = "1")]
    pub rounds: u32,

    /// Emit the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Quiet mode (only print the summary line).
    #[arg(short, long)]
    pub quiet: bool,

    /// Print every acquired block.
    #[arg(short, long)]
    pub verbose: bool,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Pool shape requested on the command line.
    #[must_use]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            block_count: self.blocks,
            block_size: self.block_size,
        }
    }
}
