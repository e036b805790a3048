use crate::join::AnnotatedVariant;

/// Placeholder for absent annotation fields in the final table.
pub const NA: &str = "NA";

/// One row of the flattened, per-mutant mutation table, before indel merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRow {
    pub mutant: String,
    pub reference: String,
    /// Base mutation category ("SNP", "insertion", "deletion"); the per-record
    /// ordinal suffix has already been stripped.
    pub mutation: String,
    pub start: u64,
    pub end: u64,
    pub gene: String,
    pub product: String,
    pub feature_type: String,
    /// Classifier ordinal, kept as an explicit ordering key for the stable
    /// sort ahead of merging.
    pub ordinal: u64,
}

/// Value of `<key>=` in a packed semicolon-delimited attribute string, i.e.
/// everything from after the `=` up to the next `;` or end of string. `NA`
/// when the key is absent.
///
/// Leading whitespace and underscores of each segment are ignored: the `"; "`
/// attribute spelling becomes `;_` after the load-time space rewrite, and the
/// key must still match behind it.
pub fn attribute_value(attributes: &str, key: &str) -> String {
    attributes
        .split(';')
        .find_map(|pair| {
            pair.trim_start_matches([' ', '_'])
                .strip_prefix(key)?
                .strip_prefix('=')
        })
        .map(|value| value.to_string())
        .unwrap_or_else(|| NA.to_string())
}

/// Strip the per-record ordinal from a mutation label: `SNP_104` -> `SNP`,
/// `insertion_7` -> `insertion`. Labels without an underscore pass through.
pub fn base_mutation(label: &str) -> &str {
    label.split('_').next().unwrap_or(label)
}

/// Unpack an annotated variant into a table row, defaulting gene, product and
/// feature type to `NA` when no feature overlapped.
pub fn extract_row(annotated: &AnnotatedVariant<'_>, reference: &str) -> MutationRow {
    let variant = annotated.variant;
    let (gene, product, feature_type) = match annotated.feature {
        Some(feature) => (
            attribute_value(&feature.attributes, "gene"),
            attribute_value(&feature.attributes, "product"),
            attribute_value(&feature.attributes, "Feature_Type"),
        ),
        None => (NA.to_string(), NA.to_string(), NA.to_string()),
    };
    let (start, end) = variant.interval();
    MutationRow {
        mutant: variant.mutant.clone(),
        reference: reference.to_string(),
        mutation: base_mutation(&variant.label()).to_string(),
        start,
        end,
        gene,
        product,
        feature_type,
        ordinal: variant.ordinal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{FeatureType, GeneFeature};
    use crate::variant::{VariantKind, VariantRecord};

    #[test]
    fn attribute_value_reads_up_to_semicolon() {
        let attrs = "gene=abc;product=DNA_polymerase_III;Feature_Type=CDS";
        assert_eq!(attribute_value(attrs, "gene"), "abc");
        assert_eq!(attribute_value(attrs, "product"), "DNA_polymerase_III");
        assert_eq!(attribute_value(attrs, "Feature_Type"), "CDS");
        assert_eq!(attribute_value(attrs, "locus_tag"), "NA");
    }

    #[test]
    fn attribute_value_does_not_match_key_suffixes() {
        // `gene` must not match inside `pseudogene`.
        let attrs = "pseudogene=xyz;gene=abc";
        assert_eq!(attribute_value(attrs, "gene"), "abc");
    }

    #[test]
    fn attribute_value_tolerates_space_after_semicolon() {
        // "gene=abc; product=enzyme" after the load-time space rewrite.
        let attrs = "gene=abc;_product=enzyme;_Feature_Type=CDS";
        assert_eq!(attribute_value(attrs, "product"), "enzyme");
        assert_eq!(attribute_value(attrs, "Feature_Type"), "CDS");
    }

    #[test]
    fn base_mutation_strips_from_first_underscore() {
        assert_eq!(base_mutation("SNP_104"), "SNP");
        assert_eq!(base_mutation("insertion_7"), "insertion");
        assert_eq!(base_mutation("deletion_12_extra"), "deletion");
        assert_eq!(base_mutation("SNP"), "SNP");
    }

    #[test]
    fn extract_row_defaults_to_na_without_feature() {
        let variant = VariantRecord {
            mutant: "M1".to_string(),
            seqid: "chr1".to_string(),
            position: 5,
            ref_base: "A".to_string(),
            mut_base: "G".to_string(),
            kind: VariantKind::Snp,
            ordinal: 1,
        };
        let annotated = AnnotatedVariant { variant: &variant, feature: None };
        let row = extract_row(&annotated, "ref");
        assert_eq!(row.mutation, "SNP");
        assert_eq!((row.start, row.end), (4, 5));
        assert_eq!(row.gene, "NA");
        assert_eq!(row.product, "NA");
        assert_eq!(row.feature_type, "NA");
    }

    #[test]
    fn extract_row_reads_feature_attributes() {
        let feature = GeneFeature {
            seqid: "chr1".to_string(),
            start: 0,
            end: 100,
            attributes: "gene=abc;product=enzyme;Feature_Type=CDS".to_string(),
            feature_type: FeatureType::Cds,
        };
        let variant = VariantRecord {
            mutant: "M1".to_string(),
            seqid: "chr1".to_string(),
            position: 5,
            ref_base: "A".to_string(),
            mut_base: "G".to_string(),
            kind: VariantKind::Snp,
            ordinal: 1,
        };
        let annotated = AnnotatedVariant { variant: &variant, feature: Some(&feature) };
        let row = extract_row(&annotated, "ref");
        assert_eq!(row.gene, "abc");
        assert_eq!(row.product, "enzyme");
        assert_eq!(row.feature_type, "CDS");
        assert_eq!(row.reference, "ref");
    }
}
