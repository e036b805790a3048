use crate::attributes::MutationRow;
use crate::error::PipelineError;
use anyhow::Result;

/// Terminal table entity: a mutation row with its computed genomic size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedMutation {
    pub mutant: String,
    pub reference: String,
    pub mutation: String,
    pub start: u64,
    pub end: u64,
    pub gene: String,
    pub product: String,
    pub feature_type: String,
    pub size: u64,
}

/// Accumulator for one in-progress run of contiguous same-kind fragments.
#[derive(Debug)]
struct Run {
    mutant: String,
    reference: String,
    mutation: String,
    start: u64,
    end: u64,
    gene: String,
    product: String,
    feature_type: String,
    size: u64,
    /// Start of the most recently consumed row, for the ordering check.
    last_start: u64,
}

impl Run {
    fn open(row: &MutationRow) -> Self {
        Self {
            mutant: row.mutant.clone(),
            reference: row.reference.clone(),
            mutation: row.mutation.clone(),
            start: row.start,
            end: row.end,
            gene: row.gene.clone(),
            product: row.product.clone(),
            feature_type: row.feature_type.clone(),
            size: row.end - row.start,
            last_start: row.start,
        }
    }

    fn emit(self) -> MergedMutation {
        // Fragments are single-base, so the incremental size always equals
        // the genomic span. Checked here rather than silently recomputed.
        debug_assert_eq!(self.size, self.end - self.start);
        MergedMutation {
            mutant: self.mutant,
            reference: self.reference,
            mutation: self.mutation,
            start: self.start,
            end: self.end,
            gene: self.gene,
            product: self.product,
            feature_type: self.feature_type,
            size: self.size,
        }
    }
}

/// Merge consecutive fragments of the same mutation kind that are contiguous
/// in reference coordinates into single mutation events.
///
/// Input must already be ordered so that rows for one mutant and one kind with
/// adjacent start positions appear consecutively (the pipeline sorts by
/// (kind, start, ordinal) per mutant). A row merges into the open run iff its
/// (mutant, kind) match the run's AND its start equals the run's current end;
/// any mismatch flushes the run and opens a new one. The final run is always
/// flushed, so a trailing fragment is emitted exactly once.
///
/// A row whose (mutant, kind) match the open run but whose start lies before
/// the previous row's start means the ordering precondition was violated
/// upstream; that is reported as an error instead of silently mis-merging.
/// Equal starts are legal: the diff table reports a multi-base insertion as
/// several rows sharing one reference position, and those flush into separate
/// single-base rows like any other failed match.
pub fn merge_indel_fragments(rows: &[MutationRow]) -> Result<Vec<MergedMutation>> {
    let mut merged = Vec::new();
    let mut open: Option<Run> = None;

    for row in rows {
        if let Some(run) = open.as_mut() {
            let same_group = run.mutant == row.mutant && run.mutation == row.mutation;
            if same_group && row.start < run.last_start {
                return Err(PipelineError::MergeOrderingViolation {
                    mutant: row.mutant.clone(),
                    kind: row.mutation.clone(),
                    row_start: row.start,
                    prev_start: run.last_start,
                }
                .into());
            }
            if same_group && row.start == run.end {
                run.end = row.end;
                run.size += 1;
                run.last_start = row.start;
                continue;
            }
        }
        if let Some(finished) = open.replace(Run::open(row)) {
            merged.push(finished.emit());
        }
    }

    // Flush-on-end: the last run is emitted unconditionally.
    if let Some(run) = open {
        merged.push(run.emit());
    }

    Ok(merged)
}
