use anyhow::Result;

/// The base placeholder in a diff record: an insertion has no reference base,
/// a deletion has no mutant base.
pub const GAP: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VariantKind {
    Snp,
    Insertion,
    Deletion,
}

impl VariantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::Snp => "SNP",
            VariantKind::Insertion => "insertion",
            VariantKind::Deletion => "deletion",
        }
    }
}

/// One classified single-base difference between a mutant genome and the
/// reference. Multi-base indels only arise later, when the merge step joins
/// adjacent fragments.
#[derive(Debug, Clone)]
pub struct VariantRecord {
    pub mutant: String,
    pub seqid: String,
    /// 1-based reference position as reported by the aligner.
    pub position: u64,
    pub ref_base: String,
    pub mut_base: String,
    pub kind: VariantKind,
    /// 1-based row number within the source diff table, running across all
    /// kinds. Carried explicitly so ordering never depends on list order.
    pub ordinal: u64,
}

impl VariantRecord {
    /// Human-readable per-record label, e.g. `SNP_104` or `deletion_7`.
    pub fn label(&self) -> String {
        format!("{}_{}", self.kind.as_str(), self.ordinal)
    }

    /// Half-open interval on the reference: [position-1, position).
    pub fn interval(&self) -> (u64, u64) {
        (self.position - 1, self.position)
    }
}

fn classify(ref_base: &str, mut_base: &str) -> Option<VariantKind> {
    match (ref_base == GAP, mut_base == GAP) {
        (false, false) => Some(VariantKind::Snp),
        (true, false) => Some(VariantKind::Insertion),
        (false, true) => Some(VariantKind::Deletion),
        // Both bases missing is not a variant; the aligner never emits this.
        (true, true) => None,
    }
}

/// Parse one genome's raw diff table into classified variant records.
///
/// Rows are tab-separated with at least 14 fields; only [1]=position,
/// [2]=reference base, [3]=mutant base and [14]=reference sequence id are
/// consumed. Header lines (first field not a positive integer) are skipped
/// silently; data rows with fewer than 14 fields are skipped with a warning.
/// Input order is preserved, which the merge step's adjacency test relies on.
pub fn classify_diff_records(mutant: &str, raw: &str) -> Result<Vec<VariantRecord>> {
    let mut records = Vec::new();
    let mut ordinal: u64 = 0;

    for line in raw.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        let Some(Ok(position)) = fields.first().map(|f| f.trim().parse::<u64>()) else {
            // Preamble or column-header line.
            continue;
        };
        if position == 0 {
            continue;
        }
        if fields.len() < 14 {
            tracing::warn!(
                mutant,
                fields = fields.len(),
                "skipping malformed diff record (fewer than 14 fields)"
            );
            continue;
        }
        ordinal += 1;

        let ref_base = fields[1].trim();
        let mut_base = fields[2].trim();
        let Some(kind) = classify(ref_base, mut_base) else {
            tracing::warn!(mutant, position, "skipping diff record with two placeholders");
            continue;
        };

        records.push(VariantRecord {
            mutant: mutant.to_string(),
            seqid: fields[13].trim().to_string(),
            position,
            ref_base: ref_base.to_string(),
            mut_base: mut_base.to_string(),
            kind,
            ordinal,
        });
    }

    Ok(records)
}
