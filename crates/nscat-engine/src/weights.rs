//! Weighted combination of per-element curves.

use indexmap::IndexMap;

/// `f_total = sum_X (w_X n_X / sum_Y w_Y n_Y) f_X` over the element
/// labels present in `curves`. Labels missing from `counts` or `weights`
/// contribute nothing; a vanishing denominator yields a zero curve.
pub fn weight_by_elements(
    curves: &IndexMap<String, Vec<f64>>,
    counts: &IndexMap<String, usize>,
    weights: &IndexMap<String, f64>,
) -> Vec<f64> {
    let len = curves.values().map(Vec::len).max().unwrap_or(0);
    let mut total = vec![0.0; len];

    let denominator: f64 = curves
        .keys()
        .map(|label| {
            let n = counts.get(label).copied().unwrap_or(0) as f64;
            let w = weights.get(label).copied().unwrap_or(0.0);
            w * n
        })
        .sum();
    if denominator.abs() < 1e-300 {
        return total;
    }

    for (label, curve) in curves {
        let n = counts.get(label).copied().unwrap_or(0) as f64;
        let w = weights.get(label).copied().unwrap_or(0.0);
        let factor = w * n / denominator;
        for (acc, x) in total.iter_mut().zip(curve.iter()) {
            *acc += factor * x;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map<T: Clone>(pairs: &[(&str, T)]) -> IndexMap<String, T> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn factors_are_normalized_by_weighted_counts() {
        let curves = map(&[("H", vec![1.0, 1.0]), ("O", vec![3.0, 5.0])]);
        let counts = map(&[("H", 2usize), ("O", 1usize)]);
        let weights = map(&[("H", 1.0), ("O", 2.0)]);
        // Denominator 1*2 + 2*1 = 4; factors H 0.5, O 0.5.
        let total = weight_by_elements(&curves, &counts, &weights);
        assert_eq!(total, vec![2.0, 3.0]);
    }

    #[test]
    fn equal_weights_give_the_count_weighted_mean() {
        let curves = map(&[("A", vec![2.0]), ("B", vec![8.0])]);
        let counts = map(&[("A", 3usize), ("B", 1usize)]);
        let weights = map(&[("A", 1.0), ("B", 1.0)]);
        let total = weight_by_elements(&curves, &counts, &weights);
        assert!((total[0] - (3.0 * 2.0 + 8.0) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn vanishing_denominator_yields_zeros() {
        let curves = map(&[("A", vec![2.0, 4.0])]);
        let counts = map(&[("A", 0usize)]);
        let weights = map(&[("A", 1.0)]);
        assert_eq!(weight_by_elements(&curves, &counts, &weights), vec![0.0, 0.0]);
    }
}
