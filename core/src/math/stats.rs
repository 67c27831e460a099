pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    /// Unbiased sample variance (N - 1 denominator).
    pub fn sample_variance(samples: &[f64]) -> f64 {
        if samples.len() < 2 {
            return 0.0;
        }
        let mean = Self::mean(samples);
        let sum_sq: f64 = samples.iter().map(|&v| (v - mean).powi(2)).sum();
        sum_sq / (samples.len() - 1) as f64
    }
}
