//! Types returned by subnet inventories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the public/private split a subnet falls on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SubnetVisibility {
    /// Subnet auto-assigns public addresses.
    Public,
    /// Subnet does not auto-assign public addresses.
    Private,
}

impl fmt::Display for SubnetVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// CIDR blocks of one network, split by visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetPartition {
    /// CIDRs of subnets that auto-assign public addresses.
    pub public: Vec<String>,
    /// CIDRs of all other subnets.
    pub private: Vec<String>,
}

impl SubnetPartition {
    /// Creates a partition from two CIDR lists.
    #[must_use]
    pub fn new<P, Q>(public: P, private: Q) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        Q: IntoIterator,
        Q::Item: Into<String>,
    {
        Self {
            public: public.into_iter().map(Into::into).collect(),
            private: private.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the CIDRs on the requested side.
    #[must_use]
    pub fn cidrs(&self, visibility: SubnetVisibility) -> &[String] {
        match visibility {
            SubnetVisibility::Public => &self.public,
            SubnetVisibility::Private => &self.private,
        }
    }

    /// Adds one subnet according to its auto-assign attribute.
    pub fn push(&mut self, cidr: impl Into<String>, auto_assign_public: bool) {
        if auto_assign_public {
            self.public.push(cidr.into());
        } else {
            self.private.push(cidr.into());
        }
    }
}
