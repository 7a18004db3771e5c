// ibm_is_instance_network_interface: look up one interface of a VPC
// instance, both by name.

use serde_json::Value;
use tracing::debug;

use ibmtf_api::vpc::{ListInstanceNetworkInterfacesOptions, ListInstancesOptions};

use crate::error::CoreError;
use crate::flatten::{flatten_floating_ips, flatten_security_groups, flatten_subnet};
use crate::lookup::{composite_id, find_by_name};
use crate::provider::{DataSource, HandlerFuture};
use crate::schema::{Schema, SchemaMap, ValueType};
use crate::session::ClientSession;
use crate::state::ResourceData;

pub struct InstanceNetworkInterface;

fn deleted_block() -> SchemaMap {
    SchemaMap::from([(
        "more_info",
        Schema::computed(ValueType::String)
            .describe("Link to documentation about deleted resources."),
    )])
}

fn reference_block(with_address: bool) -> SchemaMap {
    let mut block = SchemaMap::from([
        ("crn", Schema::computed(ValueType::String).describe("The CRN.")),
        (
            "deleted",
            Schema::computed(ValueType::List)
                .block(deleted_block())
                .describe("Present if the referenced resource has been deleted."),
        ),
        ("href", Schema::computed(ValueType::String).describe("The URL.")),
        ("id", Schema::computed(ValueType::String).describe("The unique identifier.")),
        ("name", Schema::computed(ValueType::String).describe("The user-defined name.")),
    ]);
    if with_address {
        block.insert(
            "address",
            Schema::computed(ValueType::String).describe("The globally unique IP address."),
        );
    }
    block
}

impl DataSource for InstanceNetworkInterface {
    fn name(&self) -> &'static str {
        "ibm_is_instance_network_interface"
    }

    fn schema(&self) -> SchemaMap {
        SchemaMap::from([
            (
                "instance_name",
                Schema::required(ValueType::String).describe("The instance name."),
            ),
            (
                "network_interface_name",
                Schema::required(ValueType::String).describe("The network interface name."),
            ),
            (
                "allow_ip_spoofing",
                Schema::computed(ValueType::Bool)
                    .describe("Whether source IP spoofing is allowed on this interface."),
            ),
            (
                "created_at",
                Schema::computed(ValueType::String)
                    .describe("The date and time that the network interface was created."),
            ),
            (
                "floating_ips",
                Schema::computed(ValueType::List)
                    .block(reference_block(true))
                    .describe("The floating IPs associated with this network interface."),
            ),
            (
                "href",
                Schema::computed(ValueType::String).describe("The URL for this network interface."),
            ),
            (
                "name",
                Schema::computed(ValueType::String)
                    .describe("The user-defined name for this network interface."),
            ),
            (
                "port_speed",
                Schema::computed(ValueType::Int)
                    .describe("The network interface port speed in Mbps."),
            ),
            (
                "primary_ipv4_address",
                Schema::computed(ValueType::String).describe("The primary IPv4 address."),
            ),
            (
                "resource_type",
                Schema::computed(ValueType::String).describe("The resource type."),
            ),
            (
                "security_groups",
                Schema::computed(ValueType::List)
                    .block(reference_block(false))
                    .describe("Collection of security groups."),
            ),
            (
                "status",
                Schema::computed(ValueType::String)
                    .describe("The status of the network interface."),
            ),
            (
                "subnet",
                Schema::computed(ValueType::List)
                    .block(reference_block(false))
                    .describe("The associated subnet."),
            ),
            (
                "type",
                Schema::computed(ValueType::String)
                    .describe("The type of this network interface as it relates to an instance."),
            ),
        ])
    }

    fn read<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let instance_name = data.require_str("instance_name")?.to_owned();
            let nic_name = data.require_str("network_interface_name")?.to_owned();
            debug!(
                instance_name = %instance_name,
                network_interface_name = %nic_name,
                "reading network interface"
            );

            let vpc = session.vpc();
            let instances = vpc
                .list_all_instances(&ListInstancesOptions::default())
                .await
                .map_err(|e| CoreError::api_context("Error Fetching Instances", e))?;

            let instance = find_by_name(&instances, &instance_name, |i| i.name.as_str())
                .ok_or_else(|| CoreError::NotFound {
                    entity_type: "Instance",
                    name: instance_name.clone(),
                })?;

            let nics = vpc
                .list_instance_network_interfaces(&ListInstanceNetworkInterfacesOptions::new(
                    &instance.id,
                ))
                .await
                .map_err(|e| {
                    CoreError::api_context("Error listing instance network interfaces", e)
                })?
                .into_result();

            let nic = find_by_name(&nics.network_interfaces, &nic_name, |n| n.name.as_str())
                .ok_or_else(|| CoreError::NotFound {
                    entity_type: "Network interface",
                    name: nic_name.clone(),
                })?;

            data.set_id(composite_id(&instance.id, &nic.id));
            data.set("allow_ip_spoofing", nic.allow_ip_spoofing)?;
            data.set("created_at", &nic.created_at)?;
            data.set(
                "floating_ips",
                nic.floating_ips.as_deref().map(flatten_floating_ips),
            )?;
            data.set("href", &nic.href)?;
            data.set("name", &nic.name)?;
            data.set("port_speed", nic.port_speed)?;
            data.set("primary_ipv4_address", nic.primary_address())?;
            data.set("resource_type", &nic.resource_type)?;
            data.set(
                "security_groups",
                nic.security_groups.as_deref().map(flatten_security_groups),
            )?;
            data.set("status", &nic.status)?;
            data.set(
                "subnet",
                nic.subnet
                    .as_ref()
                    .map(|s| vec![Value::Object(flatten_subnet(s))]),
            )?;
            data.set("type", &nic.interface_type)?;
            Ok(())
        })
    }
}
