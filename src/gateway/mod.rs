//! AgriNode gateway integration module
//!
//! - `client`: HTTP client for the gateway endpoints
//! - `coordinator`: Periodic refresh and snapshot publication

pub mod client;
pub mod coordinator;

pub use client::{EntryInfo, GatewayClient};
pub use coordinator::{CoordinatorState, SensorCoordinator};
