// Context-Based Restrictions wire types.
//
// Field names follow the service's snake_case JSON. Fields the service
// always returns are plain; everything else is `Option` and skipped on
// serialization when absent.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

// ── Address (discriminated on `type`) ───────────────────────────────

pub const ADDRESS_TYPE_IP_ADDRESS: &str = "ipAddress";
pub const ADDRESS_TYPE_IP_RANGE: &str = "ipRange";
pub const ADDRESS_TYPE_SUBNET: &str = "subnet";
pub const ADDRESS_TYPE_VPC: &str = "vpc";
pub const ADDRESS_TYPE_SERVICE_REF: &str = "serviceRef";

/// A zone address, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// A single IPv4 or IPv6 address.
    IpAddress { value: String },
    /// An inclusive range, e.g. `169.23.22.0-169.23.22.255`.
    IpRange { value: String },
    /// A CIDR block.
    Subnet { value: String },
    /// The CRN of a VPC.
    Vpc { value: String },
    /// A reference to the network of a cloud service.
    ServiceRef { service_ref: ServiceRefValue },
}

impl Address {
    /// The discriminator constant for this variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IpAddress { .. } => ADDRESS_TYPE_IP_ADDRESS,
            Self::IpRange { .. } => ADDRESS_TYPE_IP_RANGE,
            Self::Subnet { .. } => ADDRESS_TYPE_SUBNET,
            Self::Vpc { .. } => ADDRESS_TYPE_VPC,
            Self::ServiceRef { .. } => ADDRESS_TYPE_SERVICE_REF,
        }
    }

    /// The `value` of the four scalar variants.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::IpAddress { value }
            | Self::IpRange { value }
            | Self::Subnet { value }
            | Self::Vpc { value } => Some(value),
            Self::ServiceRef { .. } => None,
        }
    }

    /// Build the variant named by `kind` around a scalar `value`.
    pub fn from_kind(kind: &str, value: String) -> Result<Self, Error> {
        match kind {
            ADDRESS_TYPE_IP_ADDRESS => Ok(Self::IpAddress { value }),
            ADDRESS_TYPE_IP_RANGE => Ok(Self::IpRange { value }),
            ADDRESS_TYPE_SUBNET => Ok(Self::Subnet { value }),
            ADDRESS_TYPE_VPC => Ok(Self::Vpc { value }),
            other => Err(Error::UnrecognizedDiscriminator {
                property: "type",
                value: other.to_owned(),
            }),
        }
    }

    /// Decode from a raw JSON object, dispatching on `type`.
    pub fn from_json(mut raw: Map<String, Value>) -> Result<Self, Error> {
        let kind = match raw.remove("type") {
            Some(Value::String(kind)) => kind,
            Some(other) => {
                return Err(Error::UnrecognizedDiscriminator {
                    property: "type",
                    value: other.to_string(),
                });
            }
            None => return Err(Error::MissingDiscriminator { property: "type" }),
        };

        let decode_err = |e: serde_json::Error| Error::Deserialization {
            message: format!("{kind} address: {e}"),
            body: Value::Object(raw.clone()).to_string(),
        };

        match kind.as_str() {
            ADDRESS_TYPE_SERVICE_REF => {
                let Some(reference) = raw.get("ref").cloned() else {
                    return Err(decode_err(de::Error::missing_field("ref")));
                };
                let service_ref = serde_json::from_value(reference).map_err(decode_err)?;
                Ok(Self::ServiceRef { service_ref })
            }
            ADDRESS_TYPE_IP_ADDRESS
            | ADDRESS_TYPE_IP_RANGE
            | ADDRESS_TYPE_SUBNET
            | ADDRESS_TYPE_VPC => {
                let value = match raw.get("value") {
                    Some(Value::String(v)) => v.clone(),
                    Some(other) => {
                        return Err(decode_err(de::Error::invalid_type(
                            de::Unexpected::Other(&other.to_string()),
                            &"a string",
                        )));
                    }
                    None => return Err(decode_err(de::Error::missing_field("value"))),
                };
                Self::from_kind(&kind, value)
            }
            _ => Err(Error::UnrecognizedDiscriminator {
                property: "type",
                value: kind.clone(),
            }),
        }
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", self.kind())?;
        match self {
            Self::ServiceRef { service_ref } => map.serialize_entry("ref", service_ref)?,
            Self::IpAddress { value }
            | Self::IpRange { value }
            | Self::Subnet { value }
            | Self::Vpc { value } => map.serialize_entry("value", value)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_json(raw).map_err(de::Error::custom)
    }
}

/// The service a `serviceRef` address points at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRefValue {
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_instance: Option<String>,
}

// ── Zones ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub crn: String,
    pub address_count: i64,
    pub excluded_count: i64,
    pub name: String,
    pub account_id: String,
    #[serde(default)]
    pub description: String,
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub excluded: Vec<Address>,
    pub href: String,
    pub created_at: String,
    pub created_by_id: String,
    pub last_modified_at: String,
    pub last_modified_by_id: String,
}

/// A zone as returned by the list operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSummary {
    pub id: String,
    pub crn: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub addresses_preview: Vec<Address>,
    pub address_count: i64,
    pub excluded_count: i64,
    pub href: String,
    pub created_at: String,
    pub created_by_id: String,
    pub last_modified_at: String,
    pub last_modified_by_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneList {
    pub count: i64,
    pub zones: Vec<ZoneSummary>,
}

/// A service that can be the target of a `serviceRef` address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRefTarget {
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRefTargetList {
    pub count: i64,
    pub targets: Vec<ServiceRefTarget>,
}

// ── Rules ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleContextAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleContext {
    pub attributes: Vec<RuleContextAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAttribute {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTagAttribute {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

/// Target of a rule: attribute matchers plus optional tag matchers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub attributes: Vec<ResourceAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<ResourceTagAttribute>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub crn: String,
    #[serde(default)]
    pub description: String,
    pub contexts: Vec<RuleContext>,
    pub resources: Vec<Resource>,
    pub href: String,
    pub created_at: String,
    pub created_by_id: String,
    pub last_modified_at: String,
    pub last_modified_by_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleList {
    pub count: i64,
    pub rules: Vec<Rule>,
}

// ── Account settings ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSettings {
    pub id: String,
    pub crn: String,
    pub rule_count_limit: i64,
    pub zone_count_limit: i64,
    pub current_rule_count: i64,
    pub current_zone_count: i64,
    pub href: String,
    pub created_at: String,
    pub created_by_id: String,
    pub last_modified_at: String,
    pub last_modified_by_id: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn decode(value: Value) -> Result<Address, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn each_variant_round_trips_with_its_discriminator() {
        let cases = [
            json!({"type": "ipAddress", "value": "169.23.56.234"}),
            json!({"type": "ipRange", "value": "169.23.22.0-169.23.22.255"}),
            json!({"type": "subnet", "value": "192.0.2.0/24"}),
            json!({"type": "vpc", "value": "crn:v1:bluemix:public:is:us-south:a/12ab34cd::vpc:r006-1234"}),
            json!({"type": "serviceRef", "ref": {"account_id": "12ab34cd", "service_name": "cloud-object-storage"}}),
        ];

        for raw in cases {
            let address = decode(raw.clone()).unwrap();
            assert_eq!(address.kind(), raw["type"].as_str().unwrap());
            let encoded = serde_json::to_value(&address).unwrap();
            assert_eq!(encoded, raw);
        }
    }

    #[test]
    fn service_ref_carries_reference_fields() {
        let address = decode(json!({
            "type": "serviceRef",
            "ref": {
                "account_id": "12ab34cd",
                "service_type": "platform_service",
                "service_name": "iam-groups",
                "service_instance": "inst-1"
            }
        }))
        .unwrap();
        let Address::ServiceRef { service_ref } = address else {
            panic!("expected serviceRef");
        };
        assert_eq!(service_ref.service_type.as_deref(), Some("platform_service"));
        assert_eq!(service_ref.service_instance.as_deref(), Some("inst-1"));
    }

    #[test]
    fn missing_discriminator_is_an_error() {
        let err = decode(json!({"value": "10.0.0.1"})).unwrap_err();
        assert!(
            err.to_string()
                .contains("required discriminator property \"type\" not found"),
            "{err}"
        );
    }

    #[test]
    fn unknown_discriminator_is_an_error() {
        let err = decode(json!({"type": "ipv6Block", "value": "::1"})).unwrap_err();
        assert!(
            err.to_string()
                .contains("unrecognized value for discriminator property \"type\": ipv6Block"),
            "{err}"
        );
    }

    #[test]
    fn discriminator_must_match_shape() {
        assert!(decode(json!({"type": "serviceRef", "value": "10.0.0.1"})).is_err());
        assert!(decode(json!({"type": "ipAddress", "ref": {"account_id": "a"}})).is_err());
        assert!(decode(json!({"type": "subnet", "value": 24})).is_err());
    }

    #[test]
    fn one_bad_address_fails_the_zone() {
        let body = json!({
            "id": "z1", "crn": "crn:z1", "address_count": 2, "excluded_count": 0,
            "name": "office", "account_id": "12ab34cd", "description": "",
            "addresses": [
                {"type": "ipAddress", "value": "10.0.0.1"},
                {"type": "bogus", "value": "x"}
            ],
            "excluded": [], "href": "https://cbr.cloud.ibm.com/v1/zones/z1",
            "created_at": "2024-01-01T00:00:00Z", "created_by_id": "IBMid-1",
            "last_modified_at": "2024-01-01T00:00:00Z", "last_modified_by_id": "IBMid-1"
        });
        assert!(serde_json::from_value::<Zone>(body).is_err());
    }

    #[test]
    fn missing_required_field_fails_decode() {
        let err = serde_json::from_value::<RuleList>(json!({"rules": []})).unwrap_err();
        assert!(err.to_string().contains("count"), "{err}");
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let resource: Resource =
            serde_json::from_value(json!({"attributes": [{"name": "accountId", "value": "12ab34cd"}]}))
                .unwrap();
        assert!(resource.tags.is_none());
        assert!(resource.attributes[0].operator.is_none());
        assert_eq!(
            serde_json::to_value(&resource).unwrap(),
            json!({"attributes": [{"name": "accountId", "value": "12ab34cd"}]})
        );
    }
}
