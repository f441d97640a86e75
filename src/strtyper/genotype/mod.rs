mod cluster;
mod genotyper;

pub use cluster::{ClusterConfig, ClusterEngine};
pub use genotyper::Genotyper;
