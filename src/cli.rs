use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mutmap",
    about = "Consolidate, annotate and merge variant calls into per-mutant mutation tables",
    version
)]
pub struct Args {
    /// Reference genome FASTA
    pub reference: PathBuf,

    /// Mutant genome FASTAs (or precomputed diff tables with --snps)
    #[arg(required = true)]
    pub mutants: Vec<PathBuf>,

    /// Reference gene annotation table (GFF-like, tab-separated)
    #[arg(short = 'G', long = "annotation", value_name = "GFF")]
    pub annotation: PathBuf,

    /// Output mutation table (TSV)
    #[arg(short = 'o', long = "out", value_name = "TSV")]
    pub out: PathBuf,

    /// Number of threads (CPUs) to use
    #[arg(short = 'p', long = "threads", default_value_t = 1)]
    pub threads: u8,

    /// Mutant inputs are precomputed diff tables; skip the aligner
    #[arg(long)]
    pub snps: bool,

    /// Set logging level to WARN
    #[arg(short = 'q', long)]
    pub quiet: bool,
}
