use super::allele::{Allele, GenotypeLabel};
use crate::utils::{median, Result};
use itertools::Itertools;
use std::fmt;

/// A tandem repeat locus together with the reads measured across it.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub chrom: String,
    /// Refined from the supporting reads by `update_coords`
    pub start: u32,
    pub end: u32,
    ref_start: u32,
    ref_end: u32,
    pub repeat_unit: String,
    pub alleles: Vec<Allele>,
    /// One label per retained cluster, in clustering order
    pub genotypes: Vec<f64>,
    pub genotype_summary: String,
}

impl Variant {
    pub fn new(
        chrom: impl Into<String>,
        start: u32,
        end: u32,
        repeat_unit: impl Into<String>,
    ) -> Result<Self> {
        if start > end {
            return Err(format!("Invalid locus: start {} > end {}", start, end));
        }
        Ok(Variant {
            chrom: chrom.into(),
            start,
            end,
            ref_start: start,
            ref_end: end,
            repeat_unit: repeat_unit.into(),
            alleles: Vec::new(),
            genotypes: Vec::new(),
            genotype_summary: String::new(),
        })
    }

    /// Reference interval as given at construction, untouched by `update_coords`.
    pub fn ref_interval(&self) -> (u32, u32) {
        (self.ref_start, self.ref_end)
    }

    pub fn ref_size(&self) -> u32 {
        self.ref_end - self.ref_start + 1
    }

    /// Support per genotype label: assigned labels in descending order, then
    /// the unassigned label, which is kept only when no read was assigned.
    pub fn get_genotype(&self) -> Vec<(GenotypeLabel, usize)> {
        let mut counts: Vec<(GenotypeLabel, usize)> = Vec::new();
        for label in self.alleles.iter().filter_map(|a| a.genotype) {
            match counts.iter_mut().find(|(seen, _)| *seen == label) {
                Some((_, count)) => *count += 1,
                None => counts.push((label, 1)),
            }
        }

        let only_label = counts.len() <= 1;
        let (assigned, unassigned): (Vec<_>, Vec<_>) =
            counts.into_iter().partition(|(label, _)| label.is_assigned());

        assigned
            .into_iter()
            .sorted_by(|(a, _), (b, _)| {
                let a = a.value().unwrap_or(f64::NEG_INFINITY);
                let b = b.value().unwrap_or(f64::NEG_INFINITY);
                b.total_cmp(&a)
            })
            .chain(unassigned.into_iter().filter(|_| only_label))
            .collect()
    }

    pub fn summarize_genotype(&mut self) {
        self.genotype_summary = self
            .get_genotype()
            .iter()
            .map(|(label, support)| format!("{}({})", label, support))
            .join(";");
    }

    /// Moves start and end to the median genomic coordinates of the reads.
    pub fn update_coords(&mut self) {
        if self.alleles.is_empty() {
            return;
        }
        let genome_starts = self.alleles.iter().map(|a| a.genome_start).collect_vec();
        let genome_ends = self.alleles.iter().map(|a| a.genome_end).collect_vec();
        if let (Some(start), Some(end)) = (median(&genome_starts), median(&genome_ends)) {
            self.start = start.floor() as u32;
            self.end = end.floor() as u32;
        }
    }

    /// Checks whether enough reads carry a repeat at least `min_expansion`
    /// bases longer than the reference interval.
    pub fn above_min_expansion(&self, min_expansion: f64, min_reads: usize) -> bool {
        if self.genotypes.is_empty() {
            return false;
        }
        let ref_size = self.ref_size() as f64;

        let mut num_reads = 0;
        for genotype in self.genotypes.iter().sorted_by(|a, b| b.total_cmp(a)) {
            num_reads += self
                .alleles
                .iter()
                .filter(|a| a.genotype == Some(GenotypeLabel::Assigned(*genotype)))
                .filter(|a| a.size - ref_size >= min_expansion)
                .count();
        }
        log::trace!(
            "{}: {} reads expanded by at least {} over {}bp",
            self,
            num_reads,
            min_expansion,
            ref_size
        );
        num_reads >= min_reads
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled(size: f64, genotype: GenotypeLabel) -> Allele {
        let mut allele = Allele::new("read", 0, "CAG", size / 3.0, size, 100, 149);
        allele.genotype = Some(genotype);
        allele
    }

    fn variant_with_alleles(alleles: Vec<Allele>) -> Variant {
        let mut variant = Variant::new("chr1", 100, 149, "CAG").unwrap();
        variant.alleles = alleles;
        variant
    }

    #[test]
    fn test_new_rejects_inverted_interval() {
        assert_eq!(
            Variant::new("chr1", 200, 100, "CAG"),
            Err("Invalid locus: start 200 > end 100".to_string())
        );
        assert!(Variant::new("chr1", 100, 100, "A").is_ok());
    }

    #[test]
    fn test_get_genotype_sorted_descending() {
        let variant = variant_with_alleles(vec![
            labelled(100.0, GenotypeLabel::Assigned(100.0)),
            labelled(150.0, GenotypeLabel::Assigned(151.0)),
            labelled(101.0, GenotypeLabel::Assigned(100.0)),
            labelled(152.0, GenotypeLabel::Assigned(151.0)),
            labelled(99.0, GenotypeLabel::Assigned(100.0)),
        ]);
        assert_eq!(
            variant.get_genotype(),
            vec![
                (GenotypeLabel::Assigned(151.0), 2),
                (GenotypeLabel::Assigned(100.0), 3)
            ]
        );
    }

    #[test]
    fn test_get_genotype_drops_unassigned() {
        let variant = variant_with_alleles(vec![
            labelled(100.0, GenotypeLabel::Assigned(100.0)),
            labelled(500.0, GenotypeLabel::Unassigned),
            labelled(100.0, GenotypeLabel::Assigned(100.0)),
        ]);
        assert_eq!(
            variant.get_genotype(),
            vec![(GenotypeLabel::Assigned(100.0), 2)]
        );
    }

    #[test]
    fn test_get_genotype_keeps_sole_unassigned() {
        let variant = variant_with_alleles(vec![
            labelled(60.0, GenotypeLabel::Unassigned),
            labelled(70.0, GenotypeLabel::Unassigned),
        ]);
        assert_eq!(
            variant.get_genotype(),
            vec![(GenotypeLabel::Unassigned, 2)]
        );
    }

    #[test]
    fn test_get_genotype_ignores_unlabelled_reads() {
        let variant = variant_with_alleles(vec![Allele::new("r", 0, "CAG", 1.0, 3.0, 1, 2)]);
        assert!(variant.get_genotype().is_empty());
    }

    #[test]
    fn test_summarize_genotype() {
        let mut variant = variant_with_alleles(vec![
            labelled(60.0, GenotypeLabel::Unassigned),
            labelled(100.0, GenotypeLabel::Assigned(33.3)),
            labelled(150.0, GenotypeLabel::Assigned(50.0)),
            labelled(100.0, GenotypeLabel::Assigned(33.3)),
        ]);
        variant.summarize_genotype();
        assert_eq!(variant.genotype_summary, "50.0(1);33.3(2)");
    }

    #[test]
    fn test_summarize_genotype_without_alleles() {
        let mut variant = variant_with_alleles(Vec::new());
        variant.summarize_genotype();
        assert_eq!(variant.genotype_summary, "");
    }

    #[test]
    fn test_update_coords_empty_is_noop() {
        let mut variant = variant_with_alleles(Vec::new());
        variant.update_coords();
        assert_eq!((variant.start, variant.end), (100, 149));
    }

    #[test]
    fn test_update_coords_single_allele() {
        let mut variant = variant_with_alleles(vec![Allele::new("r", 0, "CAG", 1.0, 3.0, 97, 160)]);
        variant.update_coords();
        assert_eq!((variant.start, variant.end), (97, 160));
        assert_eq!(variant.ref_interval(), (100, 149));
    }

    #[test]
    fn test_update_coords_even_count_floors() {
        let mut variant = variant_with_alleles(vec![
            Allele::new("r1", 0, "CAG", 1.0, 3.0, 98, 150),
            Allele::new("r2", 0, "CAG", 1.0, 3.0, 101, 153),
            Allele::new("r3", 0, "CAG", 1.0, 3.0, 99, 152),
            Allele::new("r4", 0, "CAG", 1.0, 3.0, 95, 151),
        ]);
        variant.update_coords();
        // starts 95,98,99,101 -> 98.5; ends 150,151,152,153 -> 151.5
        assert_eq!((variant.start, variant.end), (98, 151));
    }

    #[test]
    fn test_above_min_expansion_counts_expanded_reads() {
        let mut variant = variant_with_alleles(vec![
            labelled(180.0, GenotypeLabel::Assigned(120.0)),
            labelled(185.0, GenotypeLabel::Assigned(120.0)),
            labelled(60.0, GenotypeLabel::Assigned(120.0)),
        ]);
        variant.genotypes = vec![120.0];
        assert!(variant.above_min_expansion(30.0, 2));
        assert!(!variant.above_min_expansion(30.0, 3));
    }

    #[test]
    fn test_above_min_expansion_uses_reference_interval() {
        let mut variant = variant_with_alleles(vec![
            Allele::new("r1", 0, "CAG", 1.0, 180.0, 100, 250),
            Allele::new("r2", 0, "CAG", 1.0, 185.0, 100, 250),
        ]);
        for allele in variant.alleles.iter_mut() {
            allele.genotype = Some(GenotypeLabel::Assigned(182.5));
        }
        variant.genotypes = vec![182.5];
        variant.update_coords();
        assert_eq!((variant.start, variant.end), (100, 250));
        // reference size stays 50 after the update, so both reads are expanded
        assert!(variant.above_min_expansion(100.0, 2));
    }

    #[test]
    fn test_above_min_expansion_ignores_unassigned() {
        let mut variant = variant_with_alleles(vec![
            labelled(300.0, GenotypeLabel::Unassigned),
            labelled(310.0, GenotypeLabel::Unassigned),
            labelled(55.0, GenotypeLabel::Assigned(55.0)),
        ]);
        variant.genotypes = vec![55.0];
        assert!(!variant.above_min_expansion(30.0, 1));
    }

    #[test]
    fn test_above_min_expansion_without_genotypes() {
        let variant = variant_with_alleles(vec![labelled(500.0, GenotypeLabel::Unassigned)]);
        assert!(!variant.above_min_expansion(0.0, 0));
    }

    #[test]
    fn test_display() {
        let variant = Variant::new("chrX", 5, 10, "GGC").unwrap();
        assert_eq!(variant.to_string(), "chrX:5-10");
    }
}
