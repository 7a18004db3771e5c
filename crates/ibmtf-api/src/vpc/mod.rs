// VPC infrastructure: virtual server instances and network interfaces.

pub mod client;
pub mod models;

pub use client::{
    DEFAULT_VERSION, GetInstanceNetworkInterfaceOptions, GetInstanceOptions,
    ListInstanceNetworkInterfacesOptions, ListInstancesOptions, VpcClient, regional_url,
};
pub use models::*;
