//! Subnet inventory trait definition.
//!
//! This module defines the interface the rule engine uses to look up the
//! subnets of an existing network.

use async_trait::async_trait;

use crate::error::InventoryError;

use super::types::SubnetPartition;

/// Trait for cloud subnet inventories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubnetInventory: Send + Sync {
    /// Lists the subnets of `network_id` in `region`, split by whether they
    /// auto-assign public addresses.
    async fn list_subnets(
        &self,
        network_id: &str,
        region: &str,
    ) -> Result<SubnetPartition, InventoryError>;

    /// Gets the inventory source name, for reports.
    fn source_name(&self) -> &'static str;
}
