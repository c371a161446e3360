//! Spot-price state: current value plus a bounded history ring.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One week of hourly prices.
pub const PRICE_HISTORY_CAPACITY: usize = 168;

/// One recorded price update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    /// Price in currency per kWh.
    pub price: f64,
}

/// Current spot price and its recent history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceState {
    current: Option<f64>,
    history: VecDeque<PricePoint>,
}

impl PriceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a price update. Non-finite or negative prices are ignored.
    pub fn record(&mut self, price: f64, now: NaiveDateTime) -> bool {
        if !price.is_finite() || price < 0.0 {
            return false;
        }
        self.current = Some(price);
        if self.history.len() == PRICE_HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(PricePoint {
            timestamp: now,
            price,
        });
        true
    }

    pub fn current(&self) -> Option<f64> {
        self.current
    }

    pub fn history(&self) -> impl Iterator<Item = &PricePoint> {
        self.history.iter()
    }

    /// Mean of the recorded history, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.history.is_empty() {
            return None;
        }
        Some(self.history.iter().map(|p| p.price).sum::<f64>() / self.history.len() as f64)
    }
}
