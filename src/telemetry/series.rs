use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// How much history the series buffer keeps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retention {
    /// Keep every sample for the whole session
    #[default]
    Unbounded,
    /// Keep the newest `n` samples
    Count(usize),
    /// Keep samples no older than this many seconds relative to the newest one
    Span(f64),
}

/// Paired `(time, altitude)` samples backing the plot.
///
/// Time and altitude are stored together, one entry per sample, so the two
/// sequences always have the same length and index correspondence.
#[derive(Clone, Debug, Default)]
pub struct SeriesBuffer {
    samples: VecDeque<[f64; 2]>,
    retention: Retention,
}

impl SeriesBuffer {
    pub fn new(retention: Retention) -> Self {
        Self {
            samples: VecDeque::new(),
            retention,
        }
    }

    /// Appends a sample, then evicts the oldest samples the retention policy no
    /// longer allows.
    pub fn push(&mut self, time: f64, altitude: f64) {
        self.samples.push_back([time, altitude]);
        self.evict();
    }

    fn evict(&mut self) {
        match self.retention {
            Retention::Unbounded => {}
            Retention::Count(max) => {
                while self.samples.len() > max {
                    self.samples.pop_front();
                }
            }
            Retention::Span(span_s) => {
                let Some(newest) = self.samples.back().map(|s| s[0]) else {
                    return;
                };
                while let Some(oldest) = self.samples.front() {
                    if newest - oldest[0] <= span_s {
                        break;
                    }
                    self.samples.pop_front();
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<[f64; 2]> {
        self.samples.back().copied()
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s[0])
    }

    pub fn altitudes(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s[1])
    }

    /// Samples as plot points, oldest first.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.samples.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unbounded_keeps_everything_in_order() {
        let mut buffer = SeriesBuffer::new(Retention::Unbounded);
        buffer.push(0., 100.);
        buffer.push(1., 105.5);
        buffer.push(2., 110.25);

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.points(), vec![[0., 100.], [1., 105.5], [2., 110.25]]);
        assert_eq!(buffer.times().count(), buffer.altitudes().count());
    }

    #[test]
    fn test_count_retention_drops_oldest() {
        let mut buffer = SeriesBuffer::new(Retention::Count(2));
        buffer.push(0., 1.);
        buffer.push(1., 2.);
        buffer.push(2., 3.);

        assert_eq!(buffer.points(), vec![[1., 2.], [2., 3.]]);
    }

    #[test]
    fn test_count_retention_of_zero_keeps_nothing() {
        let mut buffer = SeriesBuffer::new(Retention::Count(0));
        buffer.push(0., 1.);
        assert!(buffer.is_empty());
        assert_eq!(buffer.last(), None);
    }

    #[test]
    fn test_span_retention_drops_samples_older_than_span() {
        let mut buffer = SeriesBuffer::new(Retention::Span(10.));
        for t in 0..=15 {
            buffer.push(t as f64, 100. + t as f64);
        }

        let times: Vec<f64> = buffer.times().collect();
        assert_eq!(times.first(), Some(&5.));
        assert_eq!(times.last(), Some(&15.));
        assert_eq!(buffer.len(), 11);
    }

    #[test]
    fn test_clear() {
        let mut buffer = SeriesBuffer::new(Retention::Unbounded);
        buffer.push(0., 1.);
        buffer.clear();
        assert!(buffer.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_count_retention_keeps_newest_suffix(
            altitudes in proptest::collection::vec(-1000f64..40000f64, 0..200),
            max in 1usize..50,
        ) {
            let mut buffer = SeriesBuffer::new(Retention::Count(max));
            for (i, altitude) in altitudes.iter().enumerate() {
                buffer.push(i as f64, *altitude);
            }

            let kept: Vec<f64> = buffer.altitudes().collect();
            let expected_len = altitudes.len().min(max);
            prop_assert_eq!(kept.len(), expected_len);
            prop_assert_eq!(&kept[..], &altitudes[altitudes.len() - expected_len..]);
        }
    }
}
