use std::future::Future;

use kube::{core::DynamicObject, Client};
use thiserror::Error;

use crate::resources::ResourceKind;

#[cfg(test)]
pub mod fake;
pub mod operations;

pub const TERMINATING_PHASE: &str = "Terminating";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceEntry {
    pub name: String,
    pub phase: Option<String>,
}

impl NamespaceEntry {
    pub fn is_terminating(&self) -> bool {
        self.phase.as_deref() == Some(TERMINATING_PHASE)
    }
}

#[derive(Debug)]
pub enum Listing {
    Found(Vec<DynamicObject>),
    /// The API server doesn't serve this resource type.
    Missing,
}

#[derive(Debug, Error)]
#[error("Couldn't list '{resource}' in {location}! Reason: {source}")]
pub struct ListError {
    pub resource: String,
    pub location: String,
    #[source]
    pub source: kube::Error,
}

impl ListError {
    pub fn new(resource: &str, namespace: Option<&str>, source: kube::Error) -> Self {
        Self {
            resource: resource.to_owned(),
            location: describe_location(namespace),
            source,
        }
    }
}

pub fn describe_location(namespace: Option<&str>) -> String {
    match namespace {
        Some(namespace) => format!("namespace {namespace}"),
        None => "cluster".to_owned(),
    }
}

/// Read access to the cluster objects that end up in a snapshot.
pub trait ClusterSource: Sync {
    fn list_namespaces(
        &self,
    ) -> impl Future<Output = Result<Vec<NamespaceEntry>, ListError>> + Send;

    /// Lists one resource kind, within `namespace` or cluster-wide when it's `None`.
    fn list_objects(
        &self,
        namespace: Option<&str>,
        resource: &ResourceKind,
    ) -> impl Future<Output = Result<Listing, ListError>> + Send;
}

impl ClusterSource for Client {
    async fn list_namespaces(&self) -> Result<Vec<NamespaceEntry>, ListError> {
        operations::list_namespaces(self).await
    }

    async fn list_objects(
        &self,
        namespace: Option<&str>,
        resource: &ResourceKind,
    ) -> Result<Listing, ListError> {
        operations::list_objects(self, namespace, resource).await
    }
}
