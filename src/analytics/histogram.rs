//! Equal-width histogram of simulated prices, the data behind a
//! terminal-price distribution plot.

use crate::error::{PricingError, PricingResult};
use serde::Serialize;

pub const DEFAULT_BINS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` increasing bin edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// Non-finite samples left out of the bins
    pub skipped: usize,
}

impl Histogram {
    /// Bin `samples` into `bins` equal-width buckets spanning `[min, max]`.
    ///
    /// The last bucket is closed on the right so the maximum is counted.
    /// When every finite sample is equal, the range is widened by 0.5 on
    /// each side.
    pub fn from_samples(samples: &[f64], bins: usize) -> PricingResult<Self> {
        if bins == 0 {
            return Err(PricingError::InvalidConfiguration {
                field: "bins".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        let finite = || samples.iter().copied().filter(|x| x.is_finite());
        let skipped = samples.len() - finite().count();
        let (mut lo, mut hi) = finite().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });

        if lo > hi {
            return Err(PricingError::InvalidConfiguration {
                field: "samples".to_string(),
                reason: "no finite samples to bin".to_string(),
            });
        }
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for x in finite() {
            let idx = (((x - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Ok(Histogram {
            edges,
            counts,
            skipped,
        })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Index of the bucket that contains `value`, if it lies in range
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        let bins = self.counts.len();
        let (lo, hi) = (self.edges[0], self.edges[bins]);
        if !(lo..=hi).contains(&value) {
            return None;
        }
        let width = (hi - lo) / bins as f64;
        Some((((value - lo) / width) as usize).min(bins - 1))
    }

    /// Render horizontal bars, one line per bucket, `width` characters max
    pub fn render_text(&self, width: usize) -> String {
        let max = self.counts.iter().copied().max().unwrap_or(0).max(1);
        let mut out = String::new();
        for (i, &count) in self.counts.iter().enumerate() {
            let bar = count * width / max;
            out.push_str(&format!(
                "{:>10.2} - {:>10.2} | {:<w$} {}\n",
                self.edges[i],
                self.edges[i + 1],
                "#".repeat(bar),
                count,
                w = width
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_sum_to_finite_samples() {
        let samples = [1.0, 2.0, 2.5, 3.0, 4.0, f64::NAN, 5.0, f64::INFINITY];
        let hist = Histogram::from_samples(&samples, 4).unwrap();

        assert_eq!(hist.edges.len(), 5);
        assert_eq!(hist.total(), 6);
        assert_eq!(hist.skipped, 2);
        assert_eq!(hist.counts, vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_constant_samples() {
        let hist = Histogram::from_samples(&[7.0; 10], 5).unwrap();
        assert_eq!(hist.total(), 10);
        assert_eq!(hist.edges[0], 6.5);
        assert_eq!(hist.edges[5], 7.5);
        assert_eq!(hist.bin_of(7.0), Some(2));
    }

    #[test]
    fn test_rejects_degenerate_input() {
        assert!(Histogram::from_samples(&[1.0, 2.0], 0).is_err());
        assert!(Histogram::from_samples(&[f64::NAN], 3).is_err());
        assert!(Histogram::from_samples(&[], 3).is_err());
    }

    #[test]
    fn test_render_text_has_one_line_per_bin() {
        let hist = Histogram::from_samples(&[1.0, 2.0, 3.0], 3).unwrap();
        assert_eq!(hist.render_text(20).lines().count(), 3);
    }
}
