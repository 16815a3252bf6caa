//! Serialized access to the reconciler
//!
//! babeld is a single process-wide resource, so at most one
//! reconcile-and-restart sequence may run at a time. `MeshService` holds an
//! async mutex across each whole workflow; request layers share one
//! instance behind an `Arc`.

use crate::reconciler::Reconciler;
use meshconf_common::{MeshOverview, Outcome, Result};
use tokio::sync::Mutex;
use tracing::debug;

pub struct MeshService {
    reconciler: Mutex<Reconciler>,
}

impl MeshService {
    pub fn new(reconciler: Reconciler) -> Self {
        Self {
            reconciler: Mutex::new(reconciler),
        }
    }

    pub async fn survey(&self) -> Result<MeshOverview> {
        let reconciler = self.reconciler.lock().await;
        reconciler.survey()
    }

    pub async fn enable(&self, interface: &str) -> Result<Outcome> {
        let reconciler = self.reconciler.lock().await;
        debug!("Acquired supervision lock for enable {}", interface);
        let request = reconciler.prepare_enable(interface);
        reconciler.enable(&request).await
    }

    pub async fn disable(&self, interface: &str) -> Result<Outcome> {
        let reconciler = self.reconciler.lock().await;
        debug!("Acquired supervision lock for disable {}", interface);
        let request = reconciler.prepare_disable(interface);
        reconciler.disable(&request).await
    }
}
