//! wf-engine: the warmflow zone control engine.
//!
//! One owned [`Engine`] aggregate holds every zone, its controller state,
//! schedules, energy accounting, weather and occupancy state, and an
//! outbound event queue. There is no global state and no internal timer:
//! an external driver calls the tick entry points on its own cadence and
//! collaborators inject sensor readings, prices, weather and presence
//! between ticks.
//!
//! # Concurrency model
//!
//! Every tick takes `&mut Engine`, so at most one tick executes at a time by
//! construction. Zones are independent; the control tick fans per-zone work
//! out with rayon over disjoint mutable slots.
//!
//! # Error model
//!
//! Command-API validation failures are typed errors returned synchronously
//! and never partially applied. Faults inside a tick are isolated per zone
//! and recorded as fault codes. Safety clamps are events, not errors.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod maintenance;
pub mod occupancy;
pub mod status;
pub mod target;
pub mod weather;

pub use config::{EngineConfig, TickIntervals, ZoneConfig};
pub use engine::{parse_mode, Engine};
pub use error::{CommandError, CommandResult};
pub use events::EngineEvent;
pub use maintenance::{MaintenanceConfig, MaintenanceReport};
pub use occupancy::{GeofencingConfig, GeofencingState, GeofencingUpdate, OccupancyState};
pub use status::ZoneStatus;
pub use weather::{OutdoorConditions, WeatherConfig};
