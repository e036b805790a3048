use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Feature classes retained from the annotation table. Everything else
/// (gene, region, repeat_region, ...) is dropped silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureType {
    Cds,
    MiscRna,
    RRna,
    TRna,
}

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Cds => "CDS",
            FeatureType::MiscRna => "misc_RNA",
            FeatureType::RRna => "rRNA",
            FeatureType::TRna => "tRNA",
        }
    }
}

impl FromStr for FeatureType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CDS" => Ok(FeatureType::Cds),
            "misc_RNA" => Ok(FeatureType::MiscRna),
            "rRNA" => Ok(FeatureType::RRna),
            "tRNA" => Ok(FeatureType::TRna),
            _ => Err(()),
        }
    }
}

/// One annotated region of the reference genome.
///
/// Coordinate conventions:
/// - The annotation table is 1-based inclusive (GFF-like).
/// - We store 0-based half-open [start, end): `start` -> `start - 1`,
///   `end` kept as-is.
#[derive(Debug, Clone)]
pub struct GeneFeature {
    pub seqid: String,
    pub start: u64,
    pub end: u64,
    /// Semicolon-delimited key=value pairs, spaces already replaced with
    /// underscores, with `Feature_Type=<type>` appended.
    pub attributes: String,
    pub feature_type: FeatureType,
}

/// Load gene features from a GFF-like annotation table.
///
/// Rows need at least 9 tab-separated fields: seqid, source, feature type,
/// start, end, score, strand, frame, attributes. Rows with fewer fields are
/// skipped with a warning; rows whose feature type is not in the retained set,
/// and comment lines, are skipped silently.
pub fn load_features(path: &Path) -> Result<Vec<GeneFeature>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open annotation table {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut features = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 9 {
            tracing::warn!(
                line = lineno + 1,
                fields = fields.len(),
                "skipping malformed annotation row (fewer than 9 fields)"
            );
            continue;
        }
        let Ok(feature_type) = fields[2].parse::<FeatureType>() else {
            continue;
        };
        let (Ok(start_1), Ok(end)) = (fields[3].parse::<u64>(), fields[4].parse::<u64>()) else {
            tracing::warn!(line = lineno + 1, "skipping annotation row with non-numeric coordinates");
            continue;
        };
        if start_1 == 0 || start_1 > end {
            tracing::warn!(
                line = lineno + 1,
                start = start_1,
                end,
                "skipping annotation row with inverted or zero coordinates"
            );
            continue;
        }

        // Downstream field handling splits on whitespace; keep attribute
        // values whitespace-free.
        let mut attributes = fields[8].replace(' ', "_");
        attributes.push_str(";Feature_Type=");
        attributes.push_str(feature_type.as_str());

        features.push(GeneFeature {
            seqid: fields[0].to_string(),
            // 1-based inclusive -> 0-based half-open.
            start: start_1 - 1,
            end,
            attributes,
            feature_type,
        });
    }

    tracing::debug!(features = features.len(), "loaded feature index");
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_from_str(content: &str) -> Vec<GeneFeature> {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let mut path = std::env::temp_dir();
        path.push(format!(
            "mutmap_ann_{}_{}.gff",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        let features = load_features(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        features
    }

    #[test]
    fn keeps_only_allowed_feature_types() {
        let table = "chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene=abc\n\
                     chr1\tsrc\tCDS\t1\t100\t.\t+\t.\tgene=abc\n\
                     chr1\tsrc\ttRNA\t200\t275\t.\t-\t.\tgene=trn\n\
                     chr1\tsrc\trepeat_region\t300\t400\t.\t+\t.\tnote=rep\n";
        let features = load_from_str(table);
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].feature_type, FeatureType::Cds);
        assert_eq!(features[1].feature_type, FeatureType::TRna);
    }

    #[test]
    fn converts_to_zero_based_half_open() {
        let features = load_from_str("chr1\tsrc\tCDS\t1\t100\t.\t+\t.\tgene=abc\n");
        assert_eq!(features[0].start, 0);
        assert_eq!(features[0].end, 100);
        assert!(features[0].start < features[0].end);
    }

    #[test]
    fn rewrites_attribute_spaces_and_appends_feature_type() {
        let features =
            load_from_str("chr1\tsrc\tCDS\t10\t50\t.\t+\t.\tgene=abc;product=DNA polymerase III\n");
        assert_eq!(
            features[0].attributes,
            "gene=abc;product=DNA_polymerase_III;Feature_Type=CDS"
        );
    }

    #[test]
    fn skips_short_and_inverted_rows() {
        let table = "chr1\tsrc\tCDS\n\
                     chr1\tsrc\tCDS\t50\t10\t.\t+\t.\tgene=bad\n\
                     chr1\tsrc\tCDS\t10\t50\t.\t+\t.\tgene=ok\n";
        let features = load_from_str(table);
        assert_eq!(features.len(), 1);
        assert!(features[0].attributes.starts_with("gene=ok"));
    }
}
