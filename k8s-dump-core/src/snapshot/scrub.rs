use std::fmt::Display;

use kube::core::DynamicObject;
use serde::{Deserialize, Serialize};

/// Optional fields that change between otherwise identical snapshots.
/// `metadata.resourceVersion` is always removed and isn't listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolatileField {
    ManagedFields,
    Uid,
    CreationTimestamp,
    Generation,
    Status,
}

impl Display for VolatileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolatileField::ManagedFields => f.write_str("managed-fields"),
            VolatileField::Uid => f.write_str("uid"),
            VolatileField::CreationTimestamp => f.write_str("creation-timestamp"),
            VolatileField::Generation => f.write_str("generation"),
            VolatileField::Status => f.write_str("status"),
        }
    }
}

pub fn scrub(object: &mut DynamicObject, extra_fields: &[VolatileField]) {
    object.metadata.resource_version = None;

    for field in extra_fields {
        match field {
            VolatileField::ManagedFields => object.metadata.managed_fields = None,
            VolatileField::Uid => object.metadata.uid = None,
            VolatileField::CreationTimestamp => object.metadata.creation_timestamp = None,
            VolatileField::Generation => object.metadata.generation = None,
            VolatileField::Status => {
                if let Some(data) = object.data.as_object_mut() {
                    data.remove("status");
                }
            }
        }
    }
}
