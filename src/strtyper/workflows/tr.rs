use crate::strtyper::{genotype::Genotyper, variant::Variant};

pub struct Params {
    /// Keep only loci expanded by at least this many bases (discovery mode)
    pub min_expansion: Option<f64>,
    /// Expanded reads required to keep a locus in discovery mode
    pub min_support: usize,
}

/// Genotypes one variant and finalizes its coordinates and summary.
///
/// Returns `None` when discovery filtering rejects the locus.
pub fn analyze(mut variant: Variant, genotyper: &Genotyper, params: &Params) -> Option<Variant> {
    if variant.alleles.is_empty() {
        log::debug!("{}: no supporting reads", variant);
    }
    genotyper.genotype(&mut variant);

    if let Some(min_expansion) = params.min_expansion {
        if !variant.above_min_expansion(min_expansion, params.min_support) {
            log::debug!(
                "{}: fewer than {} reads expanded by {}bp",
                variant,
                params.min_support,
                min_expansion
            );
            return None;
        }
    }

    variant.update_coords();
    variant.summarize_genotype();
    Some(variant)
}
