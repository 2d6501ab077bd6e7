use std::collections::VecDeque;

/// Minimum number of samples before a window variance is considered
/// meaningful. Below this, [`SignalWindow::variance`] returns 0.0 so a
/// couple of startup samples cannot fake a motion signal.
pub const MIN_VARIANCE_SAMPLES: usize = 5;

/// Fixed-capacity sliding buffer of the most recent samples for one
/// source. Insertion evicts the oldest entry once full.
#[derive(Debug, Clone)]
pub struct SignalWindow<T = f64> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T> SignalWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one when at capacity.
    pub fn push(&mut self, sample: T) {
        while self.samples.len() >= self.capacity.max(1) {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }

    /// Current contents as one contiguous slice, oldest first.
    pub fn as_contiguous(&mut self) -> &[T] {
        self.samples.make_contiguous()
    }
}

impl SignalWindow<f64> {
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Population variance of the current contents, or 0.0 while fewer
    /// than [`MIN_VARIANCE_SAMPLES`] samples are present.
    pub fn variance(&self) -> f64 {
        if self.samples.len() < MIN_VARIANCE_SAMPLES {
            return 0.0;
        }
        let mean = self.mean();
        self.samples
            .iter()
            .map(|s| {
                let d = s - mean;
                d * d
            })
            .sum::<f64>()
            / self.samples.len() as f64
    }
}

/// Population variance of a standalone slice. The fine-signal adapter
/// uses this over a single sample's components rather than across the
/// time window.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_evicts_oldest_at_capacity() {
        let mut window = SignalWindow::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            window.push(v);
        }
        assert_eq!(window.len(), 3);
        let contents: Vec<f64> = window.iter().copied().collect();
        assert_eq!(contents, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn evicted_sample_leaves_statistics() {
        // One wild outlier, then enough calm samples to push it out.
        let mut window = SignalWindow::new(5);
        window.push(1000.0);
        for _ in 0..5 {
            window.push(10.0);
        }
        assert_eq!(window.variance(), 0.0);
        assert_eq!(window.mean(), 10.0);
    }

    #[test]
    fn variance_sentinel_below_min_samples() {
        let mut window = SignalWindow::new(50);
        for v in [1.0, 100.0, 1.0, 100.0] {
            window.push(v);
        }
        assert_eq!(window.len(), 4);
        assert_eq!(window.variance(), 0.0);

        window.push(1.0);
        assert!(window.variance() > 0.0);
    }

    #[test]
    fn population_variance_matches_definition() {
        // var([1,2,3,4]) = 1.25 (population)
        let v = population_variance(&[1.0, 2.0, 3.0, 4.0]);
        assert!((v - 1.25).abs() < 1e-12);
        assert_eq!(population_variance(&[]), 0.0);
        assert_eq!(population_variance(&[7.0]), 0.0);
    }

    #[test]
    fn window_variance_matches_population_variance() {
        let samples = [3.0, 7.0, 7.0, 19.0, 24.0];
        let mut window = SignalWindow::new(10);
        for s in samples {
            window.push(s);
        }
        let expected = population_variance(&samples);
        assert!((window.variance() - expected).abs() < 1e-12);
    }
}
