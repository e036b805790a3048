use crate::annotation::GeneFeature;
use crate::types::{FeatureId, HashMap, HashMapExt};
use crate::variant::VariantRecord;
use coitrees::{BasicCOITree, Interval, IntervalTree as CoitreeIntervalTree};

/// One overlapping (variant, feature) pair reported by the interval join,
/// with the length of the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapPair {
    pub variant_idx: usize,
    pub feature: FeatureId,
    pub overlap_len: u64,
}

/// A variant paired with the single best-overlapping feature, or none.
#[derive(Debug, Clone, Copy)]
pub struct AnnotatedVariant<'a> {
    pub variant: &'a VariantRecord,
    pub feature: Option<&'a GeneFeature>,
}

/// Interval index over the feature list, one tree per reference sequence.
pub struct FeatureIndex {
    trees: HashMap<String, BasicCOITree<FeatureId, u32>>,
}

impl FeatureIndex {
    pub fn build(features: &[GeneFeature]) -> Self {
        let mut per_seq: HashMap<String, Vec<Interval<FeatureId>>> = HashMap::new();
        for (id, feature) in features.iter().enumerate() {
            // COITree intervals are end-inclusive; convert [start, end) ->
            // [start, end-1].
            let first = feature.start as i32;
            let last = feature.end.saturating_sub(1) as i32;
            if last >= first {
                per_seq
                    .entry(feature.seqid.clone())
                    .or_default()
                    .push(Interval::new(first, last, id as FeatureId));
            }
        }
        let trees = per_seq
            .into_iter()
            .map(|(seqid, intervals)| (seqid, BasicCOITree::new(&intervals)))
            .collect();
        Self { trees }
    }

    /// All overlapping (variant, feature) pairs on matching sequence ids.
    pub fn overlap_pairs(
        &self,
        variants: &[VariantRecord],
        features: &[GeneFeature],
    ) -> Vec<OverlapPair> {
        let mut pairs = Vec::new();
        for (variant_idx, variant) in variants.iter().enumerate() {
            let Some(tree) = self.trees.get(&variant.seqid) else {
                continue;
            };
            let (vstart, vend) = variant.interval();
            tree.query(vstart as i32, vend.saturating_sub(1) as i32, |node| {
                let feature = &features[node.metadata as usize];
                let overlap_len = overlap_length((vstart, vend), (feature.start, feature.end));
                if overlap_len > 0 {
                    pairs.push(OverlapPair {
                        variant_idx,
                        feature: node.metadata,
                        overlap_len,
                    });
                }
            });
        }
        pairs
    }
}

/// Correctness-first O(V·F) fallback with the same output contract as
/// `FeatureIndex::overlap_pairs`. Pair order may differ; selection does not
/// depend on it.
pub fn overlap_pairs_naive(
    variants: &[VariantRecord],
    features: &[GeneFeature],
) -> Vec<OverlapPair> {
    let mut pairs = Vec::new();
    for (variant_idx, variant) in variants.iter().enumerate() {
        for (id, feature) in features.iter().enumerate() {
            if feature.seqid != variant.seqid {
                continue;
            }
            let overlap_len = overlap_length(variant.interval(), (feature.start, feature.end));
            if overlap_len > 0 {
                pairs.push(OverlapPair {
                    variant_idx,
                    feature: id as FeatureId,
                    overlap_len,
                });
            }
        }
    }
    pairs
}

fn overlap_length(a: (u64, u64), b: (u64, u64)) -> u64 {
    let lo = a.0.max(b.0);
    let hi = a.1.min(b.1);
    hi.saturating_sub(lo)
}

/// Pick the winning feature among one variant's candidate overlaps: greatest
/// overlap length, ties broken by the earliest feature in index order. Pure in
/// the candidate set, independent of discovery order.
pub fn select_best(candidates: &[OverlapPair]) -> Option<FeatureId> {
    candidates
        .iter()
        .min_by_key(|p| (std::cmp::Reverse(p.overlap_len), p.feature))
        .map(|p| p.feature)
}

/// Resolve all pairs into exactly one `AnnotatedVariant` per input variant.
/// Variants with no overlapping feature carry `feature: None`.
pub fn annotate<'a>(
    variants: &'a [VariantRecord],
    features: &'a [GeneFeature],
    pairs: &[OverlapPair],
) -> Vec<AnnotatedVariant<'a>> {
    let mut per_variant: Vec<Vec<OverlapPair>> = vec![Vec::new(); variants.len()];
    for pair in pairs {
        per_variant[pair.variant_idx].push(*pair);
    }
    variants
        .iter()
        .zip(per_variant.iter())
        .map(|(variant, candidates)| AnnotatedVariant {
            variant,
            feature: select_best(candidates).map(|id| &features[id as usize]),
        })
        .collect()
}
