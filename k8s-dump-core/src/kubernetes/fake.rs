use std::collections::{BTreeMap, BTreeSet};

use kube::core::{DynamicObject, ErrorResponse, TypeMeta};
use serde_json::json;

use crate::resources::{self, ResourceKind};

use super::{ClusterSource, ListError, Listing, NamespaceEntry, TERMINATING_PHASE};

const CLUSTER_KEY: &str = "";

/// In-memory cluster used by the snapshot tests.
#[derive(Default)]
pub struct FakeCluster {
    namespaces: Vec<NamespaceEntry>,
    objects: BTreeMap<(String, String), Vec<DynamicObject>>,
    missing: BTreeSet<String>,
    failing: BTreeSet<(String, String)>,
    namespace_listing_fails: bool,
}

impl FakeCluster {
    pub fn with_namespace(mut self, name: &str) -> Self {
        self.namespaces.push(NamespaceEntry {
            name: name.to_owned(),
            phase: Some("Active".to_owned()),
        });
        self
    }

    pub fn with_terminating_namespace(mut self, name: &str) -> Self {
        self.namespaces.push(NamespaceEntry {
            name: name.to_owned(),
            phase: Some(TERMINATING_PHASE.to_owned()),
        });
        self
    }

    /// Adds an object of the given catalog type; `None` puts it in the cluster scope.
    pub fn with_object(mut self, namespace: Option<&str>, resource: &str, name: &str) -> Self {
        let kind = resources::find(resource).expect("unknown resource in test");
        let mut object = DynamicObject::new(name, kind.api_resource()).data(json!({
            "data": { "key": "value" },
            "status": { "phase": "Bound" },
        }));

        object.types = None;
        object.metadata.namespace = namespace.map(str::to_owned);
        object.metadata.resource_version = Some("48213".to_owned());
        object.metadata.uid = Some(format!("uid-{name}"));

        self.objects
            .entry(key(namespace, kind.name()))
            .or_default()
            .push(object);
        self
    }

    /// Makes the API server answer 404 for the given type everywhere.
    pub fn with_missing(mut self, resource: &str) -> Self {
        self.missing.insert(resource.to_owned());
        self
    }

    /// Makes the API server answer 403 for the given type in one location.
    pub fn with_failure(mut self, namespace: Option<&str>, resource: &str) -> Self {
        self.failing.insert(key(namespace, resource));
        self
    }

    pub fn with_failing_namespace_listing(mut self) -> Self {
        self.namespace_listing_fails = true;
        self
    }
}

fn key(namespace: Option<&str>, resource: &str) -> (String, String) {
    (
        namespace.unwrap_or(CLUSTER_KEY).to_owned(),
        resource.to_owned(),
    )
}

fn forbidden() -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_owned(),
        message: "access denied".to_owned(),
        reason: "Forbidden".to_owned(),
        code: 403,
    })
}

impl ClusterSource for FakeCluster {
    async fn list_namespaces(&self) -> Result<Vec<NamespaceEntry>, ListError> {
        if self.namespace_listing_fails {
            return Err(ListError::new("namespaces", None, forbidden()));
        }

        Ok(self.namespaces.clone())
    }

    async fn list_objects(
        &self,
        namespace: Option<&str>,
        resource: &ResourceKind,
    ) -> Result<Listing, ListError> {
        if self.missing.contains(resource.name()) {
            return Ok(Listing::Missing);
        }

        if self.failing.contains(&key(namespace, resource.name())) {
            return Err(ListError::new(resource.name(), namespace, forbidden()));
        }

        let items = self
            .objects
            .get(&key(namespace, resource.name()))
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|mut item| {
                item.types = Some(TypeMeta {
                    api_version: resource.api_version().to_owned(),
                    kind: resource.kind().to_owned(),
                });
                item
            })
            .collect();

        Ok(Listing::Found(items))
    }
}
