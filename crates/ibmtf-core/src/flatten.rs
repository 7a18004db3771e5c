// ── Flattening adapters ──
//
// Project typed API responses into the map-of-lists shape the schema layer
// stores, and expand user input back into API models. Flatteners are
// one level deep per reference type; absent fields are left out of the map
// entirely, never written as empty or zero values.

use serde_json::{Map, Value};

use ibmtf_api::cbr::{
    Address, Resource, ResourceAttribute, ResourceTagAttribute, RuleContext,
    RuleContextAttribute, ServiceRefValue,
};
use ibmtf_api::vpc::{Deleted, FloatingIpReference, SecurityGroupReference, SubnetReference};

use crate::error::CoreError;

// ── Helpers ──────────────────────────────────────────────────────────

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        map.insert(key.to_owned(), Value::String(v.to_owned()));
    }
}

/// A nested block stored as a single-element list.
fn single(map: Map<String, Value>) -> Value {
    Value::Array(vec![Value::Object(map)])
}

// ── VPC references ───────────────────────────────────────────────────

pub fn flatten_deleted(deleted: &Deleted) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("more_info".into(), Value::String(deleted.more_info.clone()));
    map
}

fn insert_deleted(map: &mut Map<String, Value>, deleted: Option<&Deleted>) {
    if let Some(d) = deleted {
        map.insert("deleted".into(), single(flatten_deleted(d)));
    }
}

pub fn flatten_floating_ip(fip: &FloatingIpReference) -> Map<String, Value> {
    let mut map = Map::new();
    insert_opt(&mut map, "address", fip.address.as_deref());
    insert_opt(&mut map, "crn", fip.crn.as_deref());
    insert_deleted(&mut map, fip.deleted.as_ref());
    insert_opt(&mut map, "href", fip.href.as_deref());
    insert_opt(&mut map, "id", fip.id.as_deref());
    insert_opt(&mut map, "name", fip.name.as_deref());
    map
}

pub fn flatten_security_group(sg: &SecurityGroupReference) -> Map<String, Value> {
    let mut map = Map::new();
    insert_opt(&mut map, "crn", sg.crn.as_deref());
    insert_deleted(&mut map, sg.deleted.as_ref());
    insert_opt(&mut map, "href", sg.href.as_deref());
    insert_opt(&mut map, "id", sg.id.as_deref());
    insert_opt(&mut map, "name", sg.name.as_deref());
    map
}

pub fn flatten_subnet(subnet: &SubnetReference) -> Map<String, Value> {
    let mut map = Map::new();
    insert_opt(&mut map, "crn", subnet.crn.as_deref());
    insert_deleted(&mut map, subnet.deleted.as_ref());
    insert_opt(&mut map, "href", subnet.href.as_deref());
    insert_opt(&mut map, "id", subnet.id.as_deref());
    insert_opt(&mut map, "name", subnet.name.as_deref());
    map
}

pub fn flatten_floating_ips(fips: &[FloatingIpReference]) -> Vec<Value> {
    fips.iter()
        .map(|f| Value::Object(flatten_floating_ip(f)))
        .collect()
}

pub fn flatten_security_groups(groups: &[SecurityGroupReference]) -> Vec<Value> {
    groups
        .iter()
        .map(|g| Value::Object(flatten_security_group(g)))
        .collect()
}

// ── CBR ──────────────────────────────────────────────────────────────

pub fn flatten_service_ref(service_ref: &ServiceRefValue) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        "account_id".into(),
        Value::String(service_ref.account_id.clone()),
    );
    insert_opt(&mut map, "service_type", service_ref.service_type.as_deref());
    insert_opt(&mut map, "service_name", service_ref.service_name.as_deref());
    insert_opt(
        &mut map,
        "service_instance",
        service_ref.service_instance.as_deref(),
    );
    map
}

pub fn flatten_address(address: &Address) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".into(), Value::String(address.kind().to_owned()));
    match address {
        Address::ServiceRef { service_ref } => {
            map.insert("ref".into(), single(flatten_service_ref(service_ref)));
        }
        other => insert_opt(&mut map, "value", other.value()),
    }
    map
}

pub fn flatten_addresses(addresses: &[Address]) -> Vec<Value> {
    addresses
        .iter()
        .map(|a| Value::Object(flatten_address(a)))
        .collect()
}

pub fn flatten_rule_contexts(contexts: &[RuleContext]) -> Vec<Value> {
    contexts
        .iter()
        .map(|ctx| {
            let attributes = ctx
                .attributes
                .iter()
                .map(|a| {
                    let mut map = Map::new();
                    map.insert("name".into(), Value::String(a.name.clone()));
                    map.insert("value".into(), Value::String(a.value.clone()));
                    Value::Object(map)
                })
                .collect();
            let mut map = Map::new();
            map.insert("attributes".into(), Value::Array(attributes));
            Value::Object(map)
        })
        .collect()
}

fn flatten_matcher(name: &str, value: &str, operator: Option<&str>) -> Value {
    let mut map = Map::new();
    map.insert("name".into(), Value::String(name.to_owned()));
    map.insert("value".into(), Value::String(value.to_owned()));
    insert_opt(&mut map, "operator", operator);
    Value::Object(map)
}

pub fn flatten_resources(resources: &[Resource]) -> Vec<Value> {
    resources
        .iter()
        .map(|res| {
            let mut map = Map::new();
            let attributes = res
                .attributes
                .iter()
                .map(|a| flatten_matcher(&a.name, &a.value, a.operator.as_deref()))
                .collect();
            map.insert("attributes".into(), Value::Array(attributes));
            if let Some(tags) = &res.tags {
                let tags = tags
                    .iter()
                    .map(|t| flatten_matcher(&t.name, &t.value, t.operator.as_deref()))
                    .collect();
                map.insert("tags".into(), Value::Array(tags));
            }
            Value::Object(map)
        })
        .collect()
}

// ── Expanders (input → API) ──────────────────────────────────────────

fn invalid(message: String) -> CoreError {
    CoreError::ValidationFailed { message }
}

fn object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, CoreError> {
    value
        .as_object()
        .ok_or_else(|| invalid(format!("{path} must be an object")))
}

fn string_field(map: &Map<String, Value>, key: &str, path: &str) -> Result<String, CoreError> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| invalid(format!("{path}.{key} is required")))
}

fn opt_string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn list_field<'a>(map: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    map.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

pub fn expand_addresses(items: &[Value], field: &str) -> Result<Vec<Address>, CoreError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let path = format!("{field}.{i}");
            let map = object(item, &path)?;
            let kind = string_field(map, "type", &path)?;

            if kind == ibmtf_api::cbr::models::ADDRESS_TYPE_SERVICE_REF {
                let reference = list_field(map, "ref")
                    .first()
                    .ok_or_else(|| invalid(format!("{path}.ref is required for serviceRef")))?;
                let reference = object(reference, &format!("{path}.ref.0"))?;
                return Ok(Address::ServiceRef {
                    service_ref: ServiceRefValue {
                        account_id: string_field(
                            reference,
                            "account_id",
                            &format!("{path}.ref.0"),
                        )?,
                        service_type: opt_string_field(reference, "service_type"),
                        service_name: opt_string_field(reference, "service_name"),
                        service_instance: opt_string_field(reference, "service_instance"),
                    },
                });
            }

            let value = string_field(map, "value", &path)?;
            Address::from_kind(&kind, value)
                .map_err(|e| invalid(format!("{path}.type: {e}")))
        })
        .collect()
}

pub fn expand_rule_contexts(items: &[Value]) -> Result<Vec<RuleContext>, CoreError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let path = format!("contexts.{i}");
            let map = object(item, &path)?;
            let attributes = list_field(map, "attributes")
                .iter()
                .enumerate()
                .map(|(j, attr)| {
                    let path = format!("{path}.attributes.{j}");
                    let attr = object(attr, &path)?;
                    Ok(RuleContextAttribute {
                        name: string_field(attr, "name", &path)?,
                        value: string_field(attr, "value", &path)?,
                    })
                })
                .collect::<Result<_, CoreError>>()?;
            Ok(RuleContext { attributes })
        })
        .collect()
}

pub fn expand_resources(items: &[Value]) -> Result<Vec<Resource>, CoreError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let path = format!("resources.{i}");
            let map = object(item, &path)?;

            let attributes = list_field(map, "attributes")
                .iter()
                .enumerate()
                .map(|(j, attr)| {
                    let path = format!("{path}.attributes.{j}");
                    let attr = object(attr, &path)?;
                    Ok(ResourceAttribute {
                        name: string_field(attr, "name", &path)?,
                        value: string_field(attr, "value", &path)?,
                        operator: opt_string_field(attr, "operator"),
                    })
                })
                .collect::<Result<_, CoreError>>()?;

            let tags = match map.get("tags").and_then(Value::as_array) {
                None => None,
                Some(tags) => Some(
                    tags.iter()
                        .enumerate()
                        .map(|(j, tag)| {
                            let path = format!("{path}.tags.{j}");
                            let tag = object(tag, &path)?;
                            Ok(ResourceTagAttribute {
                                name: string_field(tag, "name", &path)?,
                                value: string_field(tag, "value", &path)?,
                                operator: opt_string_field(tag, "operator"),
                            })
                        })
                        .collect::<Result<_, CoreError>>()?,
                ),
            };

            Ok(Resource { attributes, tags })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn absent_fields_are_omitted() {
        let fip = FloatingIpReference {
            address: Some("203.0.113.1".into()),
            id: Some("fip-1".into()),
            ..FloatingIpReference::default()
        };
        assert_eq!(
            Value::Object(flatten_floating_ip(&fip)),
            json!({"address": "203.0.113.1", "id": "fip-1"})
        );
        assert!(flatten_subnet(&SubnetReference::default()).is_empty());
    }

    #[test]
    fn deleted_becomes_single_element_list() {
        let sg = SecurityGroupReference {
            id: Some("sg-1".into()),
            deleted: Some(Deleted {
                more_info: "https://cloud.ibm.com/apidocs/vpc#deleted-resources".into(),
            }),
            ..SecurityGroupReference::default()
        };
        assert_eq!(
            Value::Object(flatten_security_group(&sg)),
            json!({
                "deleted": [{"more_info": "https://cloud.ibm.com/apidocs/vpc#deleted-resources"}],
                "id": "sg-1"
            })
        );
    }

    #[test]
    fn lists_keep_server_order() {
        let groups: Vec<_> = ["c", "a", "b"]
            .iter()
            .map(|n| SecurityGroupReference {
                name: Some((*n).into()),
                ..SecurityGroupReference::default()
            })
            .collect();
        let names: Vec<_> = flatten_security_groups(&groups)
            .iter()
            .map(|g| g["name"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn addresses_round_trip_through_schema_shape() {
        let addresses = vec![
            Address::Subnet {
                value: "10.0.0.0/24".into(),
            },
            Address::ServiceRef {
                service_ref: ServiceRefValue {
                    account_id: "12ab34cd".into(),
                    service_name: Some("cloud-object-storage".into()),
                    ..ServiceRefValue::default()
                },
            },
        ];
        let flat = flatten_addresses(&addresses);
        assert_eq!(
            Value::Array(flat.clone()),
            json!([
                {"type": "subnet", "value": "10.0.0.0/24"},
                {"type": "serviceRef", "ref": [{"account_id": "12ab34cd", "service_name": "cloud-object-storage"}]}
            ])
        );
        assert_eq!(expand_addresses(&flat, "addresses").unwrap(), addresses);
    }

    #[test]
    fn bad_address_type_is_validation_error() {
        let err = expand_addresses(&[json!({"type": "ipv6", "value": "::1"})], "addresses")
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert!(err.to_string().contains("addresses.0.type"), "{err}");

        let err = expand_addresses(&[json!({"type": "ipAddress"})], "excluded").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: excluded.0.value is required"
        );
    }

    #[test]
    fn resources_keep_optional_tags() {
        let input = json!([
            {"attributes": [{"name": "accountId", "value": "12ab34cd"}]},
            {
                "attributes": [{"name": "serviceName", "value": "iam", "operator": "stringEquals"}],
                "tags": [{"name": "env", "value": "prod"}]
            }
        ]);
        let resources = expand_resources(input.as_array().unwrap()).unwrap();
        assert!(resources[0].tags.is_none());
        assert_eq!(resources[1].tags.as_ref().unwrap()[0].name, "env");
        assert_eq!(Value::Array(flatten_resources(&resources)), input);
    }

    #[test]
    fn contexts_require_name_and_value() {
        let err = expand_rule_contexts(&[json!({"attributes": [{"name": "networkZoneId"}]})])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: contexts.0.attributes.0.value is required"
        );
    }
}
