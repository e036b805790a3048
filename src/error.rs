use thiserror::Error;

/// Typed failure kinds for the pipeline.
///
/// Application flow uses `anyhow::Result`; these variants exist so callers can
/// tell a structural input problem (fatal at startup) apart from a per-mutant
/// collaborator failure (isolated, run continues) and from an internal
/// precondition violation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing or structurally unusable input. Fatal at startup.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An external tool (aligner, diff extractor) exited abnormally for one
    /// mutant. Fatal for that mutant only.
    #[error("{tool} failed for mutant '{mutant}': {message}")]
    CollaboratorFailure {
        tool: String,
        mutant: String,
        message: String,
    },

    /// Merge input arrived out of the order the merge algorithm requires.
    /// A programming/upstream-ordering bug, checked rather than mis-merged.
    #[error(
        "merge ordering violation for mutant '{mutant}' ({kind}): \
         row start {row_start} precedes previous start {prev_start}"
    )]
    MergeOrderingViolation {
        mutant: String,
        kind: String,
        row_start: u64,
        prev_start: u64,
    },
}
