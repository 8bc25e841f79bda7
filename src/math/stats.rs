/// Summary statistics over a slice of values (weights, losses, predictions).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

/// Population min/max/mean/std of `values`. Empty input yields all zeros so
/// diagnostics on a fresh network never divide by zero.
pub fn summary_stats(values: &[f64]) -> SummaryStats {
    if values.is_empty() {
        return SummaryStats { min: 0.0, max: 0.0, mean: 0.0, std: 0.0 };
    }

    let n = values.len() as f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    let mean = sum / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

    SummaryStats { min, max, mean, std: variance.sqrt() }
}
