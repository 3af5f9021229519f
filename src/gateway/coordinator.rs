//! SensorCoordinator: periodic refresh of the gateway snapshot
//!
//! Each cycle fetches the sensor directory (only while none is cached), then
//! the latest reading of every known sensor, one request at a time. The
//! outcome is published into a single-slot `watch` cell that entities read.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::error::BridgeError;
use crate::gateway::client::SensorGateway;
use crate::models::{SensorDescriptor, Snapshot};

/// What readers see after the most recent cycle.
///
/// A failed cycle keeps the previous snapshot but clears
/// `last_update_success`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoordinatorState {
    pub snapshot: Snapshot,
    pub last_update_success: bool,
    pub last_error: Option<String>,
    pub last_updated_at: Option<DateTime<Utc>>,
}

pub struct SensorCoordinator {
    gateway: Arc<dyn SensorGateway>,
    /// Populated once and kept for the coordinator's lifetime; only refetched
    /// while empty. Also serializes cycles.
    directory: Mutex<BTreeMap<String, SensorDescriptor>>,
    state: watch::Sender<CoordinatorState>,
}

impl SensorCoordinator {
    pub fn new(gateway: Arc<dyn SensorGateway>) -> Self {
        let (state, _) = watch::channel(CoordinatorState::default());
        Self {
            gateway,
            directory: Mutex::new(BTreeMap::new()),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> CoordinatorState {
        self.state.borrow().clone()
    }

    /// Fetch a fresh snapshot without publishing it
    pub async fn refresh(&self) -> Result<Snapshot, BridgeError> {
        let mut directory = self.directory.lock().await;

        if directory.is_empty() {
            *directory = self.gateway.list_sensors().await?;
            tracing::debug!("[Coordinator] Sensor directory holds {} sensors", directory.len());
        }

        let mut data = BTreeMap::new();
        for sensor_id in directory.keys() {
            if let Some(reading) = self.gateway.get_latest_reading(sensor_id).await? {
                data.insert(sensor_id.clone(), reading);
            }
        }

        Ok(Snapshot {
            sensors: directory.clone(),
            data,
        })
    }

    /// Run one cycle and publish its outcome
    pub async fn update(&self) -> Result<Snapshot, BridgeError> {
        match self.refresh().await {
            Ok(snapshot) => {
                tracing::debug!(
                    "[Coordinator] Cycle complete: {} sensors, {} with data",
                    snapshot.sensors.len(),
                    snapshot.data.len()
                );
                let published = snapshot.clone();
                self.state.send_modify(|state| {
                    state.snapshot = published;
                    state.last_update_success = true;
                    state.last_error = None;
                    state.last_updated_at = Some(Utc::now());
                });
                Ok(snapshot)
            }
            Err(e) => {
                let err = BridgeError::UpdateFailed(format!("Error communicating with API: {}", e));
                tracing::error!("[Coordinator] {}", err);
                let message = err.to_string();
                self.state.send_modify(|state| {
                    state.last_update_success = false;
                    state.last_error = Some(message);
                });
                Err(err)
            }
        }
    }

    /// Initial cycle during setup; a failure means the bridge is not ready
    pub async fn first_refresh(&self) -> Result<Snapshot, BridgeError> {
        self.update().await
    }

    /// Poll every `period` until `shutdown` flips. The first tick is one full
    /// period away since setup has already refreshed.
    pub async fn run(self: Arc<Self>, period: Duration, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            "[Coordinator] Starting background poll (interval: {}s)",
            period.as_secs()
        );

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.update().await {
                        tracing::debug!(
                            "[Coordinator] Retrying in {}s after failed cycle: {}",
                            period.as_secs(),
                            e
                        );
                    }
                }
                _ = shutdown.changed() => break,
            }
        }

        tracing::info!("[Coordinator] Background poll stopped");
    }
}
