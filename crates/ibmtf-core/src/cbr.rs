// ── CBR schema blocks ──
//
// Zone and rule attribute trees are shared by the data sources (everything
// computed) and the resources (inputs plus computed audit fields).

use ibmtf_api::cbr::{Rule, Zone};

use crate::error::CoreError;
use crate::flatten::{flatten_addresses, flatten_resources, flatten_rule_contexts};
use crate::schema::{Schema, SchemaMap, ValueType};
use crate::state::ResourceData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Input,
    Computed,
}

fn attr(mode: Mode, required: bool, ty: ValueType) -> Schema {
    match mode {
        Mode::Computed => Schema::computed(ty),
        Mode::Input if required => Schema::required(ty),
        Mode::Input => Schema::optional(ty),
    }
}

fn audit_fields(schema: &mut SchemaMap) {
    schema.insert(
        "crn",
        Schema::computed(ValueType::String).describe("The CRN."),
    );
    schema.insert(
        "href",
        Schema::computed(ValueType::String).describe("The API URL."),
    );
    schema.insert(
        "created_at",
        Schema::computed(ValueType::String).describe("The time the object was created."),
    );
    schema.insert(
        "created_by_id",
        Schema::computed(ValueType::String).describe("IAM ID of the creator."),
    );
    schema.insert(
        "last_modified_at",
        Schema::computed(ValueType::String).describe("The last time the object was modified."),
    );
    schema.insert(
        "last_modified_by_id",
        Schema::computed(ValueType::String).describe("IAM ID of the last modifier."),
    );
}

// ── Zones ────────────────────────────────────────────────────────────

fn service_ref_block(mode: Mode) -> SchemaMap {
    SchemaMap::from([
        (
            "account_id",
            attr(mode, true, ValueType::String).describe("The ID of the service's account."),
        ),
        (
            "service_type",
            attr(mode, false, ValueType::String).describe("The service type."),
        ),
        (
            "service_name",
            attr(mode, false, ValueType::String).describe("The service name."),
        ),
        (
            "service_instance",
            attr(mode, false, ValueType::String).describe("The service instance."),
        ),
    ])
}

fn address_block(mode: Mode) -> SchemaMap {
    SchemaMap::from([
        (
            "type",
            attr(mode, true, ValueType::String)
                .describe("The address type: ipAddress, ipRange, subnet, vpc or serviceRef."),
        ),
        (
            "value",
            attr(mode, false, ValueType::String)
                .describe("The IP address, IP range, subnet CIDR or VPC CRN."),
        ),
        (
            "ref",
            attr(mode, false, ValueType::List)
                .max_items(1)
                .block(service_ref_block(mode))
                .describe("The service reference, for serviceRef addresses."),
        ),
    ])
}

pub(crate) fn zone_schema(mode: Mode) -> SchemaMap {
    let mut schema = SchemaMap::from([
        (
            "name",
            attr(mode, true, ValueType::String).describe("The name of the zone."),
        ),
        (
            "account_id",
            attr(mode, true, ValueType::String).describe("The ID of the account owning the zone."),
        ),
        (
            "description",
            attr(mode, false, ValueType::String).describe("The description of the zone."),
        ),
        (
            "addresses",
            attr(mode, true, ValueType::List)
                .block(address_block(mode))
                .describe("The addresses in the zone."),
        ),
        (
            "excluded",
            attr(mode, false, ValueType::List)
                .block(address_block(mode))
                .describe("Addresses excluded from the zone."),
        ),
        (
            "address_count",
            Schema::computed(ValueType::Int).describe("The number of addresses in the zone."),
        ),
        (
            "excluded_count",
            Schema::computed(ValueType::Int).describe("The number of excluded addresses."),
        ),
    ]);
    audit_fields(&mut schema);
    schema
}

pub(crate) fn set_zone(data: &mut ResourceData, zone: &Zone) -> Result<(), CoreError> {
    data.set("name", &zone.name)?;
    data.set("account_id", &zone.account_id)?;
    data.set("description", &zone.description)?;
    data.set("addresses", flatten_addresses(&zone.addresses))?;
    data.set("excluded", flatten_addresses(&zone.excluded))?;
    data.set("address_count", zone.address_count)?;
    data.set("excluded_count", zone.excluded_count)?;
    data.set("crn", &zone.crn)?;
    data.set("href", &zone.href)?;
    data.set("created_at", &zone.created_at)?;
    data.set("created_by_id", &zone.created_by_id)?;
    data.set("last_modified_at", &zone.last_modified_at)?;
    data.set("last_modified_by_id", &zone.last_modified_by_id)?;
    Ok(())
}

// ── Rules ────────────────────────────────────────────────────────────

fn matcher_block(mode: Mode, with_operator: bool) -> SchemaMap {
    let mut block = SchemaMap::from([
        (
            "name",
            attr(mode, true, ValueType::String).describe("The attribute name."),
        ),
        (
            "value",
            attr(mode, true, ValueType::String).describe("The attribute value."),
        ),
    ]);
    if with_operator {
        block.insert(
            "operator",
            attr(mode, false, ValueType::String).describe("The attribute operator."),
        );
    }
    block
}

pub(crate) fn rule_schema(mode: Mode) -> SchemaMap {
    let context = SchemaMap::from([(
        "attributes",
        attr(mode, true, ValueType::List)
            .block(matcher_block(mode, false))
            .describe("The context attributes."),
    )]);
    let resource = SchemaMap::from([
        (
            "attributes",
            attr(mode, true, ValueType::List)
                .block(matcher_block(mode, true))
                .describe("The resource attributes."),
        ),
        (
            "tags",
            attr(mode, false, ValueType::List)
                .block(matcher_block(mode, true))
                .describe("The optional resource tags."),
        ),
    ]);

    let mut schema = SchemaMap::from([
        (
            "description",
            attr(mode, false, ValueType::String).describe("The description of the rule."),
        ),
        (
            "contexts",
            attr(mode, true, ValueType::List)
                .block(context)
                .describe("The contexts this rule applies to."),
        ),
        (
            "resources",
            attr(mode, true, ValueType::List)
                .block(resource)
                .describe("The resources this rule applies to."),
        ),
    ]);
    audit_fields(&mut schema);
    schema
}

pub(crate) fn set_rule(data: &mut ResourceData, rule: &Rule) -> Result<(), CoreError> {
    data.set("description", &rule.description)?;
    data.set("contexts", flatten_rule_contexts(&rule.contexts))?;
    data.set("resources", flatten_resources(&rule.resources))?;
    data.set("crn", &rule.crn)?;
    data.set("href", &rule.href)?;
    data.set("created_at", &rule.created_at)?;
    data.set("created_by_id", &rule.created_by_id)?;
    data.set("last_modified_at", &rule.last_modified_at)?;
    data.set("last_modified_by_id", &rule.last_modified_by_id)?;
    Ok(())
}
