//! spellres - estimate hostile spell resistance from combat telemetry.
//!
//! - [`combat`] classifies individual damage events into partial-resist buckets and turns the
//!   bucket counts into a resistance estimate
//! - [`data`] loads the equipment, zone and school catalogs plus recorded report exports
//! - [`scan`] drives a whole target through every report and persists the result table
//! - [`parallel`] holds the rayon worker pool used by the scanner

pub mod cli;
pub mod combat;
pub mod data;
pub mod error;
pub mod parallel;
pub mod scan;

pub use error::{Result, SpellresError};
