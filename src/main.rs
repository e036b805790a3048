use anyhow::Result;
use clap::Parser;
use mimalloc::MiMalloc;
use mutmap::cli;
use mutmap::pipeline;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.quiet {
            EnvFilter::new("warn")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let stats = pipeline::run(&args)?;
    tracing::info!(
        mutants = stats.mutants,
        failed_mutants = stats.failed_mutants,
        total_variants = stats.total_variants,
        snps = stats.snps,
        insertions = stats.insertions,
        deletions = stats.deletions,
        merged_mutations = stats.merged_mutations,
        "mutmap: processing complete"
    );
    Ok(())
}
