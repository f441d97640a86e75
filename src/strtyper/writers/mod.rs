mod rows;
mod write_bed;
mod write_tsv;

pub use rows::{
    allele_to_tsv, summarize_alleles, variant_to_bed, variant_to_tsv, ALLELE_SUMMARY_HEADERS,
    ALLELE_TSV_HEADERS, BED_HEADERS, VARIANT_TSV_HEADERS,
};
pub use write_bed::BedWriter;
pub use write_tsv::TsvWriter;
