//! mutmap: consolidate raw genomic-variant calls into annotated, deduplicated
//! mutation tables, one per mutant genome.
//!
//! The post-alignment pipeline, stage by stage:
//!
//! 1. [`annotation`] parses a gene-annotation table into queryable intervals.
//! 2. [`variant`] classifies raw alignment-diff records into typed variant
//!    intervals (SNP / insertion / deletion).
//! 3. [`join`] intersects variants against the feature index and keeps, per
//!    variant, the feature with the largest overlap.
//! 4. [`attributes`] unpacks the joined feature's packed attribute string into
//!    discrete table fields.
//! 5. [`merge`] folds runs of adjacent same-kind indel fragments into single
//!    mutation events with the genomic span as their size.
//!
//! Alignment and diff detection themselves are external collaborators invoked
//! at the [`aligner`] boundary.
//!
//! # Library usage
//!
//! ```no_run
//! use mutmap::annotation::load_features;
//! use mutmap::join::{annotate, FeatureIndex};
//! use mutmap::merge::merge_indel_fragments;
//! use mutmap::variant::classify_diff_records;
//!
//! // let features = load_features(path_to_annotation)?;
//! // let index = FeatureIndex::build(&features);
//! // let variants = classify_diff_records("M1", &raw_diff_table)?;
//! // let pairs = index.overlap_pairs(&variants, &features);
//! // let annotated = annotate(&variants, &features, &pairs);
//! ```

pub mod aligner;
pub mod annotation;
pub mod attributes;
pub mod cli;
pub mod error;
pub mod join;
pub mod merge;
pub mod pipeline;
pub mod variant;

mod types;

// Flat re-exports for the most commonly used types.
pub use annotation::{FeatureType, GeneFeature};
pub use attributes::MutationRow;
pub use error::PipelineError;
pub use join::{AnnotatedVariant, FeatureIndex, OverlapPair};
pub use merge::MergedMutation;
pub use types::FeatureId;
pub use variant::{VariantKind, VariantRecord};
