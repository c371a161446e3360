//! Energy report types, serializable for API collaborators.

use serde::{Deserialize, Serialize};

/// Reporting period selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Day,
    Week,
    Month,
    Lifetime,
}

/// Totals for one period, plus context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyReport {
    pub period: ReportPeriod,
    pub kwh: f64,
    pub cost: f64,
    pub current_price: Option<f64>,
    pub heating_degree_days: f64,
}
