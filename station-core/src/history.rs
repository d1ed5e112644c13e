//! Rolling temperature window and the bar heights derived from it.

use std::collections::VecDeque;

use crate::config::{DEFAULT_GRAPH_LEVELS, DEFAULT_HISTORY_LEN};

/// Fixed-length, oldest-first window of temperature samples.
///
/// The window starts filled with zeros. `min`/`max` are accumulators seeded by the
/// first real reading, whether or not it entered the window; they only ever widen.
#[derive(Debug, Clone)]
pub struct TemperatureHistory {
    samples: VecDeque<f64>,
    levels: u8,
    range: Option<(f64, f64)>,
    graph: Vec<u8>,
    pushed: bool,
}

impl Default for TemperatureHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN, DEFAULT_GRAPH_LEVELS)
    }
}

impl TemperatureHistory {
    /// `len` slots, bar heights in `0..=levels`.
    pub fn new(len: usize, levels: u8) -> Self {
        let len = len.max(1);
        Self {
            samples: std::iter::repeat_n(0.0, len).collect(),
            levels,
            range: None,
            graph: vec![0; len],
            pushed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    /// Newest sample that entered the window, `None` while only pre-fill is present.
    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied().filter(|_| self.pushed)
    }

    pub fn min(&self) -> Option<f64> {
        self.range.map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<f64> {
        self.range.map(|(_, max)| max)
    }

    pub fn levels(&self) -> u8 {
        self.levels
    }

    pub fn graph(&self) -> &[u8] {
        &self.graph
    }

    /// Drop the oldest sample, append `sample`, widen min/max, then rebuild the graph.
    pub fn push(&mut self, sample: f64) {
        self.samples.pop_front();
        self.samples.push_back(sample);
        self.pushed = true;

        self.range = Some(match self.range {
            None => (sample, sample),
            Some((min, max)) => (min.min(sample), max.max(sample)),
        });

        self.graph = self.recompute_graph();
    }

    /// Seed min/max from `sample` if nothing has been seen yet. The window does not move.
    pub fn seed(&mut self, sample: f64) {
        if self.range.is_none() {
            self.range = Some((sample, sample));
            self.graph = self.recompute_graph();
        }
    }

    /// Linear map of every sample from `[min, max]` onto `[0, levels]`, floored.
    ///
    /// Before the first sample, or while `min == max`, every bar is 0. Pre-fill
    /// zeros that fall outside the observed range are clamped.
    pub fn recompute_graph(&self) -> Vec<u8> {
        let (min, max) = match self.range {
            Some((min, max)) if max > min => (min, max),
            _ => return vec![0; self.samples.len()],
        };

        let levels = f64::from(self.levels);
        self.samples
            .iter()
            .map(|&t| {
                let scaled = ((t - min) / (max - min) * levels).floor();
                scaled.clamp(0.0, levels) as u8
            })
            .collect()
    }
}
