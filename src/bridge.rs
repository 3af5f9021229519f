//! Bridge lifecycle: setup, background tasks, teardown

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::{GatewayConfig, PollerConfig};
use crate::entity::EntityProjector;
use crate::error::BridgeError;
use crate::gateway::{EntryInfo, GatewayClient, SensorCoordinator};

/// Shared state handed to the API handlers
#[derive(Clone)]
pub struct BridgeState {
    pub entry: EntryInfo,
    pub coordinator: Arc<SensorCoordinator>,
    pub projector: Arc<EntityProjector>,
}

/// A running bridge. Owns the gateway session through the coordinator; the
/// session is released by `shutdown`.
pub struct Bridge {
    state: BridgeState,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Bridge {
    /// Validate the gateway, take the first snapshot, build entities, and
    /// start polling. Fails without creating entities when the gateway is
    /// unreachable or the first cycle fails.
    pub async fn setup(gateway: &GatewayConfig, poller: &PollerConfig) -> Result<Self, BridgeError> {
        let client = GatewayClient::new(gateway)?;

        let entry = client.check_status().await?;
        tracing::info!("[Bridge] Connected to {} at {}", entry.title, client.base_url());

        let coordinator = Arc::new(SensorCoordinator::new(Arc::new(client)));
        coordinator.first_refresh().await?;

        let projector = Arc::new(EntityProjector::build(&coordinator.current()));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let tasks = vec![
            tokio::spawn(
                coordinator
                    .clone()
                    .run(poller.scan_interval(), shutdown_rx.clone()),
            ),
            tokio::spawn(projector.clone().run(coordinator.subscribe(), shutdown_rx)),
        ];

        Ok(Self {
            state: BridgeState {
                entry,
                coordinator,
                projector,
            },
            shutdown_tx,
            tasks,
        })
    }

    pub fn state(&self) -> BridgeState {
        self.state.clone()
    }

    /// Stop background tasks and drop the gateway session
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);

        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!("[Bridge] Background task ended abnormally: {}", e);
            }
        }

        tracing::info!("[Bridge] {} unloaded", self.state.entry.title);
    }
}
