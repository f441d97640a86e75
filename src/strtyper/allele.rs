use std::fmt;

/// Genotype assigned to a single read after clustering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GenotypeLabel {
    /// Representative value of the cluster the read belongs to.
    Assigned(f64),
    /// The read fell outside every retained cluster.
    Unassigned,
}

impl GenotypeLabel {
    pub fn value(&self) -> Option<f64> {
        match self {
            GenotypeLabel::Assigned(value) => Some(*value),
            GenotypeLabel::Unassigned => None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, GenotypeLabel::Assigned(_))
    }
}

impl fmt::Display for GenotypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenotypeLabel::Assigned(value) => write!(f, "{:.1}", value),
            GenotypeLabel::Unassigned => write!(f, "-"),
        }
    }
}

/// Repeat measurement taken from one read spanning a locus.
#[derive(Debug, Clone, PartialEq)]
pub struct Allele {
    pub read_id: String,
    /// Offset within the read where the repeat begins
    pub read_start: usize,
    pub repeat_unit: String,
    pub copy_number: f64,
    /// Repeat length in bases, the feature used for clustering
    pub size: f64,
    pub genome_start: u32,
    pub genome_end: u32,
    /// `None` until the owning variant is genotyped
    pub genotype: Option<GenotypeLabel>,
}

impl Allele {
    pub fn new(
        read_id: impl Into<String>,
        read_start: usize,
        repeat_unit: impl Into<String>,
        copy_number: f64,
        size: f64,
        genome_start: u32,
        genome_end: u32,
    ) -> Self {
        Allele {
            read_id: read_id.into(),
            read_start,
            repeat_unit: repeat_unit.into(),
            copy_number,
            size,
            genome_start,
            genome_end,
            genotype: None,
        }
    }
}
