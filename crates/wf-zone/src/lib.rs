//! wf-zone: zone data model and registry for warmflow.
//!
//! A zone is one independently controlled heating circuit: its configuration
//! (technology, floor material, temperature ladder), its live sensor state,
//! its committed actuator output, and a bounded history of recent samples.
//! The registry owns all zones, resolves external string names to compact
//! [`wf_core::ZoneId`]s, and enforces configuration invariants on add/update.

pub mod error;
pub mod history;
pub mod material;
pub mod registry;
pub mod zone;

pub use error::{ZoneError, ZoneResult};
pub use history::{ZoneHistory, ZoneSample, HISTORY_CAPACITY};
pub use material::{FloorMaterial, MaterialLimits};
pub use registry::ZoneRegistry;
pub use zone::{FaultCode, HeatingTech, OperatingMode, SensorUpdate, Zone, ZoneSpec};
