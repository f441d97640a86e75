use itertools::Itertools;

/// Median of genomic positions; an even count averages the two middle values.
pub fn median<T>(positions: &[T]) -> Option<f64>
where
    T: Copy + Into<i64>,
{
    if positions.is_empty() {
        return None;
    }
    let sorted: Vec<i64> = positions
        .iter()
        .map(|&p| p.into())
        .sorted_unstable()
        .collect_vec();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) as f64 / 2.0)
    } else {
        Some(sorted[mid] as f64)
    }
}
