use super::cluster::ClusterEngine;
use crate::strtyper::{allele::GenotypeLabel, variant::Variant};
use itertools::Itertools;

/// Calls genotypes for variants using a shared clustering engine.
#[derive(Debug, Clone)]
pub struct Genotyper {
    engine: ClusterEngine,
    /// Report genotypes as repeat sizes rather than copy numbers
    report_in_size: bool,
}

impl Genotyper {
    pub fn new(engine: ClusterEngine, report_in_size: bool) -> Self {
        Genotyper {
            engine,
            report_in_size,
        }
    }

    pub fn engine(&self) -> &ClusterEngine {
        &self.engine
    }

    /// Clusters the reads of `variant` by size, labels each cluster and
    /// assigns every read the label of its cluster.
    ///
    /// Reads outside all retained clusters are labelled `Unassigned`.
    /// Genotypes from an earlier call are replaced.
    pub fn genotype(&self, variant: &mut Variant) {
        let sizes = variant
            .alleles
            .iter()
            .map(|a| a.size)
            .sorted_by(f64::total_cmp)
            .collect_vec();
        let clusters = self.engine.cluster(&sizes);

        variant.genotypes = clusters
            .iter()
            .map(|cluster| {
                let values = if self.report_in_size {
                    cluster.clone()
                } else {
                    variant
                        .alleles
                        .iter()
                        .filter(|a| cluster.contains(&a.size))
                        .map(|a| a.copy_number)
                        .collect_vec()
                };
                round_to_tenth(mean(&values))
            })
            .collect();

        let genotypes = &variant.genotypes;
        for allele in variant.alleles.iter_mut() {
            let mut matches = clusters
                .iter()
                .positions(|cluster| cluster.contains(&allele.size));
            let label = match matches.next() {
                Some(index) => GenotypeLabel::Assigned(genotypes[index]),
                None => GenotypeLabel::Unassigned,
            };
            if matches.next().is_some() {
                log::warn!(
                    "{}:{}-{}: size {} of read {} found in more than one cluster",
                    variant.chrom,
                    variant.start,
                    variant.end,
                    allele.size,
                    allele.read_id
                );
            }
            allele.genotype = Some(label);
        }

        log::debug!(
            "{}:{}-{}: {} reads in {} clusters",
            variant.chrom,
            variant.start,
            variant.end,
            variant.alleles.len(),
            variant.genotypes.len()
        );
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

// Exact ties go to the even digit: 100.25 -> 100.2
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}
