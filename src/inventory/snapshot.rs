//! In-memory subnet inventory.
//!
//! Serves pre-fetched partitions keyed by network id, or a fixed failure
//! when the cloud must not be contacted.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::error::InventoryError;

use super::provider::SubnetInventory;
use super::types::SubnetPartition;

/// Inventory answering from a fixed snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    networks: HashMap<String, SubnetPartition>,
    unavailable: Option<String>,
}

impl StaticInventory {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the partition of one network.
    #[must_use]
    pub fn with_network(mut self, network_id: impl Into<String>, partition: SubnetPartition) -> Self {
        self.networks.insert(network_id.into(), partition);
        self
    }

    /// Creates an inventory whose every lookup fails with `reason`.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            networks: HashMap::new(),
            unavailable: Some(reason.into()),
        }
    }
}

#[async_trait]
impl SubnetInventory for StaticInventory {
    async fn list_subnets(
        &self,
        network_id: &str,
        region: &str,
    ) -> Result<SubnetPartition, InventoryError> {
        if let Some(reason) = &self.unavailable {
            return Err(InventoryError::network(reason.clone()));
        }

        debug!("Serving subnets of {network_id} ({region}) from snapshot");
        self.networks.get(network_id).cloned().ok_or_else(|| {
            InventoryError::invalid_response(format!(
                "network {network_id} is not in the inventory snapshot"
            ))
        })
    }

    fn source_name(&self) -> &'static str {
        "snapshot"
    }
}
