//! Bounded per-zone sample history.
//!
//! One sample per control tick, capped at one day of one-minute samples.
//! The limiter reads the two most recent samples to estimate the floor
//! temperature rise rate; reports read the whole ring.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One day at one-minute resolution.
pub const HISTORY_CAPACITY: usize = 1440;

/// A single control-tick snapshot of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneSample {
    pub timestamp: NaiveDateTime,
    pub floor_temp: f64,
    pub air_temp: f64,
    pub target: f64,
    pub output: f64,
}

/// Ring of recent zone samples, oldest evicted past capacity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneHistory {
    samples: VecDeque<ZoneSample>,
}

impl ZoneHistory {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    pub fn push(&mut self, sample: ZoneSample) {
        if self.samples.len() == HISTORY_CAPACITY {
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

    pub fn latest(&self) -> Option<&ZoneSample> {
        self.samples.back()
    }

    /// The two most recent samples, newest last.
    pub fn last_two(&self) -> Option<(&ZoneSample, &ZoneSample)> {
        let n = self.samples.len();
        if n < 2 {
            return None;
        }
        Some((&self.samples[n - 2], &self.samples[n - 1]))
    }

    /// Observed floor temperature rise rate in °C/hour, from the two most
    /// recent samples. `None` when there are fewer than two samples or the
    /// samples are not strictly ordered in time.
    pub fn floor_rise_rate_per_hour(&self) -> Option<f64> {
        let (prev, last) = self.last_two()?;
        let dt_s = (last.timestamp - prev.timestamp).num_seconds();
        if dt_s <= 0 {
            return None;
        }
        Some((last.floor_temp - prev.floor_temp) * 3600.0 / dt_s as f64)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZoneSample> {
        self.samples.iter()
    }
}
