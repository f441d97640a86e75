pub mod allele;
pub mod genotype;
pub mod locus;
pub mod variant;
pub mod workflows;
pub mod writers;
