/// Ranks of the values starting from 1. Tied values get their average rank.
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order = (0..values.len()).collect::<Vec<_>>();

    order.sort_by(|a, b| values[*a].total_cmp(&values[*b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;

    while i < order.len() {
        let mut j = i + 1;

        while j < order.len() && values[order[j]] == values[order[i]] {
            j += 1;
        }

        // Positions i..j share the average of ranks i + 1..=j.
        let rank = (i + j + 1) as f64 / 2.0;

        for index in &order[i..j] {
            ranks[*index] = rank;
        }

        i = j;
    }

    ranks
}

/// Pearson correlation coefficient of two series.
///
/// Return `None` if series have different length, less than
/// two points, or any of them is constant.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }

    let n = a.len() as f64;

    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_a = 0.0;
    let mut variance_b = 0.0;

    for (a, b) in a.iter().zip(b) {
        let a = a - mean_a;
        let b = b - mean_b;

        covariance += a * b;

        variance_a += a * a;
        variance_b += b * b;
    }

    if variance_a == 0.0 || variance_b == 0.0 {
        return None;
    }

    Some((covariance / (variance_a * variance_b).sqrt()).clamp(-1.0, 1.0))
}

#[inline]
/// Spearman rank correlation coefficient of two series.
pub fn spearman(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }

    pearson(&ranks(a), &ranks(b))
}

#[test]
fn test_ranks() {
    assert_eq!(ranks(&[3.0, 1.0, 2.0]), [3.0, 1.0, 2.0]);
    assert_eq!(ranks(&[1.0, 2.0, 2.0, 5.0]), [1.0, 2.5, 2.5, 4.0]);
    assert_eq!(ranks(&[7.0, 7.0, 7.0]), [2.0, 2.0, 2.0]);
    assert!(ranks(&[]).is_empty());
}

#[test]
fn test_correlations() {
    assert_eq!(spearman(&[1.0, 2.0, 3.0, 4.0], &[10.0, 20.0, 30.0, 1000.0]), Some(1.0));
    assert_eq!(spearman(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), Some(-1.0));

    let correlation = pearson(&[1.0, 2.0, 3.0, 4.0], &[10.0, 20.0, 30.0, 1000.0]);

    assert!(matches!(correlation, Some(value) if value > 0.7 && value < 1.0));

    // Undefined cases.
    assert_eq!(spearman(&[1.0], &[2.0]), None);
    assert_eq!(spearman(&[1.0, 2.0], &[5.0, 5.0]), None);
    assert_eq!(pearson(&[1.0, 2.0], &[1.0, 2.0, 3.0]), None);

    // Ties get average ranks: ranks are [1, 2.5, 2.5, 4] and [1, 2, 3, 4].
    let correlation = spearman(&[1.0, 2.0, 2.0, 3.0], &[1.0, 2.0, 3.0, 4.0]).unwrap_or_default();

    assert!((correlation - 0.9486832980505138).abs() < 1e-12);
}
