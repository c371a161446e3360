//! wf-control: per-zone feedback control for warmflow.
//!
//! Two pieces run in sequence every control tick:
//! - [`PidController`]: classic PID with anti-windup, thermal-inertia
//!   anticipation and output smoothing, producing a raw heating output
//!   in percent
//! - [`FloorProtection`]: a safety limiter that clamps the raw output
//!   against floor-material limits, independent of what the PID asked for
//!
//! # Design Principles
//!
//! - **State out, config in**: controller gains are a config struct shared
//!   across zones; the mutable [`PidState`] is strictly one per zone
//! - **Safety is not an error**: the limiter never fails, it clamps and
//!   reports what it did so the engine can emit events
//! - **Caller owns time**: every update takes `now`, nothing reads the clock

pub mod error;
pub mod limiter;
pub mod pid;

pub use error::{ControlError, ControlResult};
pub use limiter::{FloorProtection, LimiterAction, LimiterOutcome};
pub use pid::{PidConfig, PidController, PidState};
