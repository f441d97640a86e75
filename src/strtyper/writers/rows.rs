//! Fixed-column text rows for variants and their reads.

use crate::strtyper::{allele::Allele, variant::Variant};
use itertools::Itertools;

pub const BED_HEADERS: [&str; 4] = ["chrom", "start", "end", "repeat_unit"];

pub const VARIANT_TSV_HEADERS: [&str; 5] = ["chrom", "start", "end", "repeat_unit", "genotype"];

pub const ALLELE_TSV_HEADERS: [&str; 5] = ["read", "copy_number", "size", "read_start", "allele"];

pub const ALLELE_SUMMARY_HEADERS: [&str; 4] = ["reads", "copy_numbers", "sizes", "read_starts"];

pub fn variant_to_bed(variant: &Variant) -> Vec<String> {
    vec![
        variant.chrom.clone(),
        variant.start.to_string(),
        variant.end.to_string(),
        variant.repeat_unit.clone(),
    ]
}

/// The genotype summary is emitted as computed; call `summarize_genotype` first.
pub fn variant_to_tsv(variant: &Variant) -> Vec<String> {
    vec![
        variant.chrom.clone(),
        variant.start.to_string(),
        variant.end.to_string(),
        variant.repeat_unit.clone(),
        variant.genotype_summary.clone(),
    ]
}

pub fn allele_to_tsv(allele: &Allele) -> Vec<String> {
    vec![
        allele.read_id.clone(),
        format_copy_number(allele.copy_number),
        allele.size.to_string(),
        allele.read_start.to_string(),
        allele
            .genotype
            .map(|label| label.to_string())
            .unwrap_or_default(),
    ]
}

/// Comma-joined reads, copy numbers, sizes and read starts, in allele order.
pub fn summarize_alleles(alleles: &[Allele]) -> (String, String, String, String) {
    let reads = alleles.iter().map(|a| a.read_id.as_str()).join(",");
    let copy_numbers = alleles
        .iter()
        .map(|a| format_copy_number(a.copy_number))
        .join(",");
    let sizes = alleles.iter().map(|a| a.size).join(",");
    let read_starts = alleles.iter().map(|a| a.read_start).join(",");
    (reads, copy_numbers, sizes, read_starts)
}

/// Copy numbers always carry a decimal point (`20.0`, `40.3`).
fn format_copy_number(copy_number: f64) -> String {
    format!("{:?}", copy_number)
}
