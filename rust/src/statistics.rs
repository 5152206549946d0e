//! Probability and sample statistics helpers.

use std::f64::consts::SQRT_2;

use statrs::function::erf::erf;

/// Number of bisection steps used by [`normal_inv_cdf`].
const INV_CDF_ITERATIONS: usize = 100;

/// Bisection bracket for [`normal_inv_cdf`].
const INV_CDF_BOUND: f64 = 8.0;

/// Standard normal cumulative distribution function.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / SQRT_2))
}

/// Inverse of the standard normal CDF.
///
/// Probabilities beyond 0.99 / 0.999 (and below 0.01 / 0.001) snap to the
/// tabulated z-values 2.33 / 3.29 (and their negatives). Everything else is
/// solved by bisection over `[-8, 8]`.
pub fn normal_inv_cdf(p: f64) -> f64 {
    if p > 0.999 {
        return 3.29;
    }
    if p > 0.99 {
        return 2.33;
    }
    if p < 0.001 {
        return -3.29;
    }
    if p < 0.01 {
        return -2.33;
    }

    let mut low = -INV_CDF_BOUND;
    let mut high = INV_CDF_BOUND;
    for _ in 0..INV_CDF_ITERATIONS {
        let mid = (low + high) / 2.0;
        if normal_cdf(mid) < p {
            low = mid;
        } else {
            high = mid;
        }
    }
    high
}

/// Probability of finishing by `target` under a normal approximation.
///
/// With zero standard deviation the outcome is certain: 1.0 when
/// `target >= expected`, else 0.0.
pub fn on_time_probability(expected: f64, standard_deviation: f64, target: f64) -> f64 {
    if standard_deviation > 0.0 {
        normal_cdf((target - expected) / standard_deviation)
    } else if target >= expected {
        1.0
    } else {
        0.0
    }
}

/// Linearly interpolated percentile of a sample set.
///
/// `p` is in `[0, 100]`. Sorts a copy, takes the fractional rank
/// `p / 100 * (count - 1)` and interpolates between its neighbours.
/// Returns 0.0 for an empty set or an out-of-range `p`.
pub fn percentile(samples: &[f64], p: f64) -> f64 {
    if samples.is_empty() || !(0.0..=100.0).contains(&p) {
        return 0.0;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Running summary of a sample set: count, extremes, mean and spread.
///
/// Partial summaries combine with [`Summary::merge`], which is associative, so
/// samples can be reduced in any grouping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sum of squared deviations from the mean.
    m2: f64,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: 0.0,
            m2: 0.0,
        }
    }
}

impl Summary {
    pub fn from_samples(samples: &[f64]) -> Self {
        samples.iter().fold(Self::default(), |mut summary, &x| {
            summary.push(x);
            summary
        })
    }

    /// Add one sample (Welford update).
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        self.min = self.min.min(x);
        self.max = self.max.max(x);
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Combine two partial summaries (Chan et al. pairwise update).
    pub fn merge(self, other: Self) -> Self {
        if self.count == 0 {
            return other;
        }
        if other.count == 0 {
            return self;
        }
        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        let weight = other.count as f64 / count as f64;
        Self {
            count,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            mean: self.mean + delta * weight,
            m2: self.m2 + other.m2 + delta * delta * self.count as f64 * weight,
        }
    }

    /// Population variance (divides by `count`, not `count - 1`).
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    pub fn standard_deviation(&self) -> f64 {
        self.variance().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_cdf_reference_values() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((normal_cdf(1.0) - 0.841_344_746).abs() < 1e-6);
        assert!((normal_cdf(-1.96) - 0.024_997_895).abs() < 1e-6);
    }

    #[test]
    fn test_normal_inv_cdf_tail_shortcuts() {
        assert_eq!(normal_inv_cdf(0.9995), 3.29);
        assert_eq!(normal_inv_cdf(0.995), 2.33);
        assert_eq!(normal_inv_cdf(0.0005), -3.29);
        assert_eq!(normal_inv_cdf(0.005), -2.33);
    }

    #[test]
    fn test_normal_inv_cdf_bisection() {
        assert!(normal_inv_cdf(0.5).abs() < 1e-9);
        assert!((normal_inv_cdf(0.975) - 1.959_963_985).abs() < 1e-6);
        for p in [0.02, 0.1, 0.3, 0.7, 0.9, 0.98] {
            assert!((normal_cdf(normal_inv_cdf(p)) - p).abs() < 1e-9);
        }
    }

    #[test]
    fn test_on_time_probability_zero_deviation() {
        assert_eq!(on_time_probability(10.0, 0.0, 10.0), 1.0);
        assert_eq!(on_time_probability(10.0, 0.0, 9.0), 0.0);
    }

    #[test]
    fn test_on_time_probability_normal() {
        assert!((on_time_probability(10.0, 2.0, 10.0) - 0.5).abs() < 1e-12);
        assert!((on_time_probability(10.0, 2.0, 12.0) - normal_cdf(1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_interpolates() {
        let samples = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&samples, 0.0), 1.0);
        assert_eq!(percentile(&samples, 100.0), 4.0);
        assert!((percentile(&samples, 50.0) - 2.5).abs() < 1e-12);
        // rank = 0.25 * 3 = 0.75
        assert!((percentile(&samples, 25.0) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_degenerate_inputs() {
        assert_eq!(percentile(&[], 50.0), 0.0);
        assert_eq!(percentile(&[1.0, 2.0], -1.0), 0.0);
        assert_eq!(percentile(&[1.0, 2.0], 100.5), 0.0);
        assert_eq!(percentile(&[1.0, 2.0], f64::NAN), 0.0);
        assert_eq!(percentile(&[7.0], 30.0), 7.0);
    }

    #[test]
    fn test_summary_population_statistics() {
        let summary = Summary::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(summary.count, 8);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
        assert!((summary.mean - 5.0).abs() < 1e-12);
        assert!((summary.standard_deviation() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_merge_matches_sequential() {
        let samples: Vec<f64> = (0..50).map(|i| ((i * 37) % 11) as f64).collect();
        let whole = Summary::from_samples(&samples);
        let merged = samples
            .chunks(7)
            .map(Summary::from_samples)
            .fold(Summary::default(), Summary::merge);

        assert_eq!(merged.count, whole.count);
        assert_eq!(merged.min, whole.min);
        assert_eq!(merged.max, whole.max);
        assert!((merged.mean - whole.mean).abs() < 1e-9);
        assert!((merged.variance() - whole.variance()).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::default();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.variance(), 0.0);
        assert_eq!(Summary::default().merge(summary), summary);
    }
}
