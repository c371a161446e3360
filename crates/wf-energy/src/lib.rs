//! wf-energy: spot-price reaction and consumption accounting for warmflow.
//!
//! Two concerns live here:
//! - the thermal-mass optimizer: reacting to an injected spot price by
//!   charging the floor mass while energy is cheap and coasting on stored
//!   heat while it is expensive
//! - consumption accounting: integrating per-zone heating power into kWh and
//!   cost, bucketed by calendar day/week/month with rollover driven by the
//!   periodic logging tick
//!
//! Price acquisition is a collaborator's job; only the reaction to a price
//! value is implemented here.

pub mod account;
pub mod optimizer;
pub mod price;
pub mod report;

pub use account::EnergyAccount;
pub use optimizer::{OptimizerConfig, PriceAction, ThermalMassOptimizer};
pub use price::{PricePoint, PriceState, PRICE_HISTORY_CAPACITY};
pub use report::{EnergyReport, ReportPeriod};
