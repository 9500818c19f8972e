//! AWS EC2 subnet inventory.
//!
//! Looks up the subnets of a VPC with `DescribeSubnets` and partitions them
//! by their `MapPublicIpOnLaunch` attribute.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ec2::Client;
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ec2::types::Filter;
use tracing::{debug, info};

use crate::error::InventoryError;

use super::provider::SubnetInventory;
use super::types::SubnetPartition;

/// Error codes EC2 returns for bad or insufficient credentials.
const AUTH_ERROR_CODES: &[&str] = &[
    "AuthFailure",
    "UnauthorizedOperation",
    "InvalidClientTokenId",
    "ExpiredToken",
    "SignatureDoesNotMatch",
];

/// Subnet inventory backed by the EC2 API.
#[derive(Debug, Default, Clone)]
pub struct Ec2Inventory {
    /// Optional named profile from the shared AWS config.
    profile: Option<String>,
}

impl Ec2Inventory {
    /// Creates an inventory using the default credential chain.
    #[must_use]
    pub const fn new() -> Self {
        Self { profile: None }
    }

    /// Uses a named profile instead of the default one.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Builds a client for the given region.
    async fn client(&self, region: &str) -> Client {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;
        Client::new(&config)
    }
}

#[async_trait]
impl SubnetInventory for Ec2Inventory {
    async fn list_subnets(
        &self,
        network_id: &str,
        region: &str,
    ) -> Result<SubnetPartition, InventoryError> {
        info!("Listing subnets of {network_id} in {region}");

        let client = self.client(region).await;
        let filter = Filter::builder().name("vpc-id").values(network_id).build();

        let mut partition = SubnetPartition::default();
        let mut next_token: Option<String> = None;

        loop {
            let output = client
                .describe_subnets()
                .filters(filter.clone())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(classify_error)?;

            for subnet in output.subnets() {
                let cidr = subnet.cidr_block().ok_or_else(|| {
                    InventoryError::invalid_response(format!(
                        "subnet {} has no IPv4 CIDR block",
                        subnet.subnet_id().unwrap_or("<unknown>")
                    ))
                })?;
                let public = subnet.map_public_ip_on_launch().unwrap_or(false);
                debug!("Subnet {cidr} public={public}");
                partition.push(cidr, public);
            }

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        if partition.public.is_empty() && partition.private.is_empty() {
            return Err(InventoryError::invalid_response(format!(
                "no subnets found for network {network_id} in {region}"
            )));
        }

        debug!(
            "Network {network_id}: {} public, {} private subnets",
            partition.public.len(),
            partition.private.len()
        );
        Ok(partition)
    }

    fn source_name(&self) -> &'static str {
        "aws-ec2"
    }
}

/// Maps an SDK failure onto the inventory error tiers.
fn classify_error<E, R>(err: SdkError<E, R>) -> InventoryError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => InventoryError::network(message),
        SdkError::ServiceError(service) => {
            if service
                .err()
                .code()
                .is_some_and(|code| AUTH_ERROR_CODES.contains(&code))
            {
                InventoryError::AuthenticationFailed { message }
            } else {
                InventoryError::invalid_response(message)
            }
        }
        _ => InventoryError::invalid_response(message),
    }
}
