//! Entity projection module
//!
//! - `measurement`: Closed set of measurement types and their metadata
//! - `sensor`: One entity per (sensor, measurement type)
//! - `projector`: Builds the entity set and keeps it in sync with snapshots

pub mod measurement;
pub mod projector;
pub mod sensor;

pub use projector::EntityProjector;
