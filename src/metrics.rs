//! Classification metrics.

/// Fraction of positions where `predicted` equals `truth`.
///
/// Returns 0 for empty input.
pub fn accuracy(truth: &[usize], predicted: &[usize]) -> f64 {
    debug_assert_eq!(truth.len(), predicted.len());
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / truth.len() as f64
}
