//! EntityProjector: derives entities from coordinator snapshots

use std::sync::Arc;

use tokio::sync::{watch, RwLock};

use crate::entity::measurement::MeasurementType;
use crate::entity::sensor::{EntityState, SensorEntity};
use crate::gateway::CoordinatorState;

/// Holds the entity set built from the first snapshot and re-renders it on
/// every published state.
pub struct EntityProjector {
    entities: RwLock<Vec<SensorEntity>>,
}

impl EntityProjector {
    /// One entity per (sensor, measurement type) present in `state`. The set
    /// is fixed here; combinations that show up later are not added.
    pub fn build(state: &CoordinatorState) -> Self {
        let snapshot = &state.snapshot;
        let mut entities = Vec::new();

        for (sensor_id, descriptor) in &snapshot.sensors {
            for measurement in MeasurementType::ALL {
                if snapshot.has_measurement(sensor_id, measurement.key()) {
                    let mut entity = SensorEntity::new(descriptor, measurement);
                    entity.handle_update(state);
                    entities.push(entity);
                }
            }
        }

        tracing::info!(
            "[Projector] Built {} entities for {} sensors",
            entities.len(),
            snapshot.sensors.len()
        );

        Self {
            entities: RwLock::new(entities),
        }
    }

    pub async fn handle_update(&self, state: &CoordinatorState) {
        let mut entities = self.entities.write().await;
        for entity in entities.iter_mut() {
            entity.handle_update(state);
        }

        tracing::debug!(
            "[Projector] Rendered {} entities ({} available)",
            entities.len(),
            entities.iter().filter(|e| e.available()).count()
        );
    }

    pub async fn entities(&self) -> Vec<EntityState> {
        self.entities
            .read()
            .await
            .iter()
            .map(SensorEntity::state)
            .collect()
    }

    pub async fn entity(&self, unique_id: &str) -> Option<EntityState> {
        self.entities
            .read()
            .await
            .iter()
            .find(|e| e.unique_id() == unique_id)
            .map(SensorEntity::state)
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    /// Re-render on each published state until `shutdown` flips or the
    /// coordinator goes away
    pub async fn run(
        self: Arc<Self>,
        mut updates: watch::Receiver<CoordinatorState>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = updates.borrow_and_update().clone();
                    self.handle_update(&state).await;
                }
                _ = shutdown.changed() => break,
            }
        }

        tracing::info!("[Projector] Stopped");
    }
}
