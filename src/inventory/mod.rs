//! Cloud inventory module.
//!
//! The rule engine never talks to the cloud directly: it is handed a
//! [`SubnetInventory`] and asks it for the public/private subnet split of an
//! existing network.

mod ec2;
mod provider;
mod snapshot;
mod types;

#[cfg(test)]
pub use provider::MockSubnetInventory;
pub use ec2::Ec2Inventory;
pub use provider::SubnetInventory;
pub use snapshot::StaticInventory;
pub use types::{SubnetPartition, SubnetVisibility};
