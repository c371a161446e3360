//! wf-core: stable foundation for warmflow.
//!
//! Contains:
//! - ids (stable compact IDs for zones)
//! - numeric (float helpers: finite checks, half-degree rounding, blending)
//! - clock (time-of-day windows with midnight wrap)
//! - error (shared error types)

pub mod clock;
pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use clock::*;
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
