use itertools::Itertools;
use kodama::{linkage, Dendrogram, Method};
use std::f64::consts::PI;

// Keeps the likelihood finite for groups of identical sizes
const MIN_VARIANCE: f64 = 1.0;

/// Read-only settings shared by every genotyping call.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    /// Minimum number of reads a cluster needs to be retained
    pub min_reads: usize,
    /// Largest number of clusters tried when choosing a partition
    pub max_num_clusters: usize,
    /// When set, cluster by distance: sizes at most `eps` apart are linked
    pub eps: Option<f64>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            min_reads: 4,
            max_num_clusters: 3,
            eps: None,
        }
    }
}

impl ClusterConfig {
    pub fn new(min_reads: usize, max_num_clusters: usize, eps: Option<f64>) -> Self {
        ClusterConfig {
            min_reads,
            max_num_clusters,
            eps,
        }
    }
}

/// Groups repeat sizes into alleles.
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    config: ClusterConfig,
}

impl ClusterEngine {
    pub fn new(config: ClusterConfig) -> Self {
        ClusterEngine { config }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Partitions `sizes` into clusters with at least `min_reads` members each.
    ///
    /// Clusters are disjoint and ordered by descending mean; members of a
    /// cluster are ascending. Sizes in undersized groups are left out.
    pub fn cluster(&self, sizes: &[f64]) -> Vec<Vec<f64>> {
        if sizes.is_empty() {
            return Vec::new();
        }
        let sizes = sizes.iter().copied().sorted_by(f64::total_cmp).collect_vec();

        let groups = match self.config.eps {
            Some(eps) => cluster_by_distance(&sizes, eps),
            None => cluster_by_model(&sizes, self.config.max_num_clusters),
        };

        let mut clusters = Vec::with_capacity(groups.len());
        for group in groups {
            if group.len() < self.config.min_reads {
                log::trace!(
                    "Discarding cluster of {} reads (minimum {})",
                    group.len(),
                    self.config.min_reads
                );
                continue;
            }
            let members = group
                .into_iter()
                .map(|i| sizes[i])
                .sorted_by(f64::total_cmp)
                .collect_vec();
            clusters.push(members);
        }

        clusters.sort_by(|a, b| mean(b).total_cmp(&mean(a)));
        clusters
    }
}

/// Single-linkage groups of sorted sizes, split wherever neighbours are
/// more than `eps` apart.
fn cluster_by_distance(sizes: &[f64], eps: f64) -> Vec<Vec<usize>> {
    let num_sizes = sizes.len();
    if num_sizes == 1 {
        return vec![vec![0]];
    }
    let dendrogram = build_dendrogram(sizes, Method::Single);
    cut_dendrogram(&dendrogram, num_sizes, |_, dissimilarity| dissimilarity <= eps)
}

/// Ward partitions with 1..=max_num_clusters groups, scored by BIC.
fn cluster_by_model(sizes: &[f64], max_num_clusters: usize) -> Vec<Vec<usize>> {
    let num_sizes = sizes.len();
    let num_distinct = sizes.iter().dedup().count();
    let max_k = max_num_clusters.min(num_distinct).max(1);
    if max_k == 1 {
        return vec![(0..num_sizes).collect()];
    }

    let dendrogram = build_dendrogram(sizes, Method::Ward);
    let mut best: Option<(f64, Vec<Vec<usize>>)> = None;
    for k in 1..=max_k {
        // undo the last k - 1 merges
        let groups = cut_dendrogram(&dendrogram, num_sizes, |step_index, _| {
            step_index + k < num_sizes
        });
        let score = bic(sizes, &groups);
        log::trace!("k={} BIC={:.3}", k, score);
        if best.as_ref().map_or(true, |(best_score, _)| score < *best_score) {
            best = Some((score, groups));
        }
    }

    best.map(|(_, groups)| groups).unwrap_or_default()
}

fn build_dendrogram(sizes: &[f64], method: Method) -> Dendrogram<f64> {
    let mut dists = sizes
        .iter()
        .tuple_combinations::<(_, _)>()
        .map(|(a, b)| (a - b).abs())
        .collect_vec();
    assert_eq!(sizes.len() * (sizes.len() - 1) / 2, dists.len());
    linkage(&mut dists, sizes.len(), method)
}

/// Flattens a dendrogram, keeping the merges `is_merged` accepts.
///
/// Accepted merges must be closed downwards: a step is only accepted when
/// every step below it is.
fn cut_dendrogram<F>(
    dendrogram: &Dendrogram<f64>,
    num_sizes: usize,
    is_merged: F,
) -> Vec<Vec<usize>>
where
    F: Fn(usize, f64) -> bool,
{
    let mut num_groups = 0;
    let num_nodes = 2 * num_sizes - 1;
    let mut membership = vec![None; num_nodes];

    for (step_index, step) in dendrogram.steps().iter().enumerate().rev() {
        let cluster = step_index + num_sizes;
        if is_merged(step_index, step.dissimilarity) {
            if membership[cluster].is_none() {
                membership[cluster] = Some(num_groups);
                num_groups += 1;
            }

            membership[step.cluster1] = membership[cluster];
            membership[step.cluster2] = membership[cluster];
        }
    }

    let mut groups = Vec::with_capacity(num_sizes);
    for group in membership.into_iter().take(num_sizes) {
        if let Some(group) = group {
            groups.push(group);
        } else {
            groups.push(num_groups);
            num_groups += 1;
        }
    }

    let mut sizes_by_group = vec![Vec::new(); num_groups];
    for (size_index, group) in groups.iter().enumerate() {
        sizes_by_group[*group].push(size_index);
    }

    sizes_by_group
}

/// Bayesian information criterion of a hard-assignment 1-D Gaussian mixture.
fn bic(sizes: &[f64], groups: &[Vec<usize>]) -> f64 {
    let total = sizes.len() as f64;
    let log_likelihood: f64 = groups
        .iter()
        .filter(|group| !group.is_empty())
        .map(|group| {
            let values = group.iter().map(|&i| sizes[i]).collect_vec();
            let count = values.len() as f64;
            let center = mean(&values);
            let sum_sq = values.iter().map(|x| (x - center).powi(2)).sum::<f64>();
            let variance = (sum_sq / count).max(MIN_VARIANCE);
            count * (count / total).ln()
                - 0.5 * count * (2.0 * PI * variance).ln()
                - 0.5 * sum_sq / variance
        })
        .sum();
    let num_params = (3 * groups.len() - 1) as f64;
    num_params * total.ln() - 2.0 * log_likelihood
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(min_reads: usize, max_num_clusters: usize) -> ClusterEngine {
        ClusterEngine::new(ClusterConfig::new(min_reads, max_num_clusters, None))
    }

    fn assert_disjoint_subset(sizes: &[f64], clusters: &[Vec<f64>]) {
        let mut remaining = sizes.to_vec();
        for value in clusters.iter().flatten() {
            let pos = remaining
                .iter()
                .position(|x| x == value)
                .expect("cluster member missing from input");
            remaining.remove(pos);
        }
    }

    #[test]
    fn test_default_config() {
        let config = ClusterConfig::default();
        assert_eq!(config.min_reads, 4);
        assert_eq!(config.max_num_clusters, 3);
        assert_eq!(config.eps, None);
    }

    #[test]
    fn test_cluster_empty() {
        assert!(engine(1, 3).cluster(&[]).is_empty());
    }

    #[test]
    fn test_cluster_two_alleles() {
        let sizes = [98.0, 100.0, 102.0, 150.0, 152.0];
        let clusters = engine(2, 3).cluster(&sizes);
        assert_eq!(clusters, vec![vec![150.0, 152.0], vec![98.0, 100.0, 102.0]]);
    }

    #[test]
    fn test_cluster_single_read_below_minimum() {
        assert!(engine(4, 3).cluster(&[60.0]).is_empty());
    }

    #[test]
    fn test_cluster_single_read_kept() {
        assert_eq!(engine(1, 3).cluster(&[60.0]), vec![vec![60.0]]);
    }

    #[test]
    fn test_cluster_unimodal_stays_together() {
        let sizes = [99.0, 100.0, 100.0, 101.0, 102.0, 98.0, 100.0, 101.0];
        let clusters = engine(2, 3).cluster(&sizes);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), sizes.len());
    }

    #[test]
    fn test_cluster_identical_sizes() {
        let clusters = engine(2, 3).cluster(&[75.0; 6]);
        assert_eq!(clusters, vec![vec![75.0; 6]]);
    }

    #[test]
    fn test_cluster_outlier_left_unassigned() {
        let sizes = [100.0, 100.0, 101.0, 102.0, 99.0, 300.0];
        let clusters = engine(2, 3).cluster(&sizes);
        assert_eq!(clusters, vec![vec![99.0, 100.0, 100.0, 101.0, 102.0]]);
        assert_disjoint_subset(&sizes, &clusters);
    }

    #[test]
    fn test_cluster_respects_max_num_clusters() {
        let sizes = [10.0, 11.0, 12.0, 50.0, 51.0, 52.0, 90.0, 91.0, 92.0];
        assert_eq!(engine(1, 3).cluster(&sizes).len(), 3);
        let clusters = engine(1, 2).cluster(&sizes);
        assert!(clusters.len() <= 2);
        assert_disjoint_subset(&sizes, &clusters);
    }

    #[test]
    fn test_cluster_unsorted_input() {
        let sizes = [152.0, 100.0, 98.0, 150.0, 102.0];
        let clusters = engine(2, 3).cluster(&sizes);
        assert_eq!(clusters, vec![vec![150.0, 152.0], vec![98.0, 100.0, 102.0]]);
    }

    #[test]
    fn test_cluster_is_deterministic() {
        let sizes = [40.0, 41.0, 42.0, 43.0, 80.0, 81.0, 83.0, 120.0, 122.0, 60.0];
        let engine = engine(2, 3);
        let first = engine.cluster(&sizes);
        for _ in 0..10 {
            assert_eq!(engine.cluster(&sizes), first);
        }
    }

    #[test]
    fn test_cluster_members_meet_minimum() {
        let sizes = [40.0, 41.0, 42.0, 43.0, 80.0, 81.0, 83.0, 120.0, 122.0, 60.0];
        let clusters = engine(3, 3).cluster(&sizes);
        assert!(clusters.iter().all(|c| c.len() >= 3));
        assert_disjoint_subset(&sizes, &clusters);
    }

    #[test]
    fn test_cluster_by_distance() {
        let config = ClusterConfig::new(2, 1, Some(2.0));
        let sizes = [10.0, 11.0, 12.0, 30.0, 31.0, 32.0, 33.0, 60.0];
        let clusters = ClusterEngine::new(config).cluster(&sizes);
        assert_eq!(
            clusters,
            vec![vec![30.0, 31.0, 32.0, 33.0], vec![10.0, 11.0, 12.0]]
        );
    }

    #[test]
    fn test_cluster_by_distance_single_read() {
        let config = ClusterConfig::new(1, 3, Some(5.0));
        assert_eq!(ClusterEngine::new(config).cluster(&[7.0]), vec![vec![7.0]]);
    }

    #[test]
    fn test_bic_prefers_separated_groups() {
        let sizes = [98.0, 100.0, 102.0, 150.0, 152.0];
        let one = bic(&sizes, &[vec![0, 1, 2, 3, 4]]);
        let two = bic(&sizes, &[vec![0, 1, 2], vec![3, 4]]);
        assert!(two < one);
    }
}
