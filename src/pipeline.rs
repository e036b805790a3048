use crate::aligner;
use crate::annotation::{self, GeneFeature};
use crate::attributes::{self, MutationRow};
use crate::cli::Args;
use crate::error::PipelineError;
use crate::join::{self, FeatureIndex};
use crate::merge::{self, MergedMutation};
use crate::variant::{self, VariantKind};
use anyhow::Result;
use crossfire::mpmc;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;

pub const TABLE_HEADER: &str =
    "Mutant\tReference\tMutation\tStartPos\tEndPos\tGene\tProduct\tFeature_Type\tMutation_Size";

#[derive(Debug, Default)]
pub struct Stats {
    pub mutants: u64,
    pub failed_mutants: u64,
    pub total_variants: u64,
    pub snps: u64,
    pub insertions: u64,
    pub deletions: u64,
    pub merged_mutations: u64,
}

#[derive(Debug)]
struct MutantResult {
    merged: Vec<MergedMutation>,
    snps: u64,
    insertions: u64,
    deletions: u64,
}

#[derive(Debug)]
struct WorkItem {
    idx: usize,
    input: PathBuf,
}

#[derive(Debug)]
struct ResultItem {
    idx: usize,
    mutant: String,
    result: Result<MutantResult>,
}

/// Run the whole pipeline: build the feature index once, process every mutant
/// (in parallel when requested), and write the final table in input order.
///
/// A failing mutant is logged and counted but does not abort the others; the
/// run only errors out when no mutant succeeded or on a structural input
/// problem (unreadable reference or annotation).
pub fn run(args: &Args) -> Result<Stats> {
    let reference_id = aligner::reference_id(&args.reference)?;
    let features = annotation::load_features(&args.annotation)?;
    let index = FeatureIndex::build(&features);
    tracing::info!(
        reference = %reference_id,
        features = features.len(),
        mutants = args.mutants.len(),
        "feature index built"
    );

    let work_dir = std::env::temp_dir().join(format!("mutmap_{}", std::process::id()));
    std::fs::create_dir_all(&work_dir)?;

    let mut results: Vec<Option<ResultItem>> = Vec::new();
    results.resize_with(args.mutants.len(), || None);

    if args.threads > 1 {
        crossfire::detect_backoff_cfg();
        let worker_count = args.threads as usize;
        let cap = worker_count.saturating_mul(4).max(8);
        let (tx_work, rx_work) = mpmc::bounded_blocking::<WorkItem>(cap);
        let (tx_res, rx_res) = mpmc::unbounded_blocking::<ResultItem>();

        let features_ref = &features;
        let index_ref = &index;
        let reference_ref = reference_id.as_str();
        let work_dir_ref = work_dir.as_path();
        let reference_path = args.reference.as_path();
        let precomputed = args.snps;

        thread::scope(|scope| -> Result<()> {
            for _ in 0..worker_count {
                let rx_work = rx_work.clone();
                let tx_res = tx_res.clone();
                scope.spawn(move || {
                    while let Ok(item) = rx_work.recv() {
                        let mutant = aligner::mutant_name(&item.input);
                        let result = process_mutant(
                            reference_path,
                            &item.input,
                            &mutant,
                            reference_ref,
                            features_ref,
                            index_ref,
                            precomputed,
                            work_dir_ref,
                        );
                        let _ = tx_res.send(ResultItem { idx: item.idx, mutant, result });
                    }
                });
            }
            drop(tx_res);

            for (idx, input) in args.mutants.iter().enumerate() {
                tx_work.send(WorkItem { idx, input: input.clone() })?;
            }
            drop(tx_work);

            while let Ok(item) = rx_res.recv() {
                let idx = item.idx;
                results[idx] = Some(item);
            }
            Ok(())
        })?;
    } else {
        for (idx, input) in args.mutants.iter().enumerate() {
            let mutant = aligner::mutant_name(input);
            let result = process_mutant(
                &args.reference,
                input,
                &mutant,
                &reference_id,
                &features,
                &index,
                args.snps,
                &work_dir,
            );
            results[idx] = Some(ResultItem { idx, mutant, result });
        }
    }

    let _ = std::fs::remove_dir_all(&work_dir);

    let out_file = File::create(&args.out)?;
    let mut writer = BufWriter::new(out_file);
    writeln!(writer, "{TABLE_HEADER}")?;

    let mut stats = Stats { mutants: args.mutants.len() as u64, ..Stats::default() };
    for item in results.into_iter().flatten() {
        match item.result {
            Ok(mutant_result) => {
                stats.snps += mutant_result.snps;
                stats.insertions += mutant_result.insertions;
                stats.deletions += mutant_result.deletions;
                stats.total_variants +=
                    mutant_result.snps + mutant_result.insertions + mutant_result.deletions;
                stats.merged_mutations += mutant_result.merged.len() as u64;
                for row in &mutant_result.merged {
                    writeln!(
                        writer,
                        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                        row.mutant,
                        row.reference,
                        row.mutation,
                        row.start,
                        row.end,
                        row.gene,
                        row.product,
                        row.feature_type,
                        row.size
                    )?;
                }
            }
            Err(e) => {
                stats.failed_mutants += 1;
                tracing::error!(mutant = %item.mutant, error = %e, "mutant failed; continuing");
            }
        }
    }
    writer.flush()?;

    if stats.mutants > 0 && stats.failed_mutants == stats.mutants {
        return Err(PipelineError::InvalidInput("all mutants failed".to_string()).into());
    }
    Ok(stats)
}

/// Classify, join, extract and merge one mutant genome's variants.
#[allow(clippy::too_many_arguments)]
fn process_mutant(
    reference: &Path,
    input: &Path,
    mutant: &str,
    reference_id: &str,
    features: &[GeneFeature],
    index: &FeatureIndex,
    precomputed: bool,
    work_dir: &Path,
) -> Result<MutantResult> {
    let raw = aligner::diff_records(reference, input, mutant, precomputed, work_dir)?;
    let variants = variant::classify_diff_records(mutant, &raw)?;

    let (mut snps, mut insertions, mut deletions) = (0u64, 0u64, 0u64);
    for v in &variants {
        match v.kind {
            VariantKind::Snp => snps += 1,
            VariantKind::Insertion => insertions += 1,
            VariantKind::Deletion => deletions += 1,
        }
    }

    let pairs = index.overlap_pairs(&variants, features);
    let annotated = join::annotate(&variants, features, &pairs);
    let mut rows: Vec<MutationRow> = annotated
        .iter()
        .map(|a| attributes::extract_row(a, reference_id))
        .collect();

    // The merger requires same-kind contiguous fragments to be consecutive.
    // Group by kind, then genomic position; the classifier ordinal keeps the
    // sort fully deterministic.
    rows.sort_by(|a, b| {
        (a.mutation.as_str(), a.start, a.ordinal).cmp(&(b.mutation.as_str(), b.start, b.ordinal))
    });

    let merged = merge::merge_indel_fragments(&rows)?;
    tracing::debug!(
        mutant,
        variants = variants.len(),
        merged = merged.len(),
        "mutant processed"
    );
    Ok(MutantResult { merged, snps, insertions, deletions })
}
