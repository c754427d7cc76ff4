use std::{fmt::Display, sync::OnceLock};

use k8s_openapi::{
    api::{
        apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet},
        autoscaling::v1::HorizontalPodAutoscaler,
        batch::v1::{CronJob, Job},
        core::v1::{
            ConfigMap, Endpoints, LimitRange, PersistentVolume, PersistentVolumeClaim,
            PodTemplate, ReplicationController, ResourceQuota, Secret, Service, ServiceAccount,
        },
        networking::v1::{Ingress, NetworkPolicy},
        policy::{v1::PodDisruptionBudget, v1beta1::PodSecurityPolicy},
        rbac::v1::{Role, RoleBinding},
        storage::v1::StorageClass,
    },
    apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition,
    ClusterResourceScope, NamespaceResourceScope,
};
use kube::{core::ApiResource, Resource};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceScope {
    Namespaced,
    Cluster,
}

impl Display for ResourceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceScope::Namespaced => f.write_str("Namespaced"),
            ResourceScope::Cluster => f.write_str("Cluster"),
        }
    }
}

/// A single entry of the dump catalog. The plural resource name doubles as the
/// type name used by skip lists and snapshot section headers.
#[derive(Debug, Clone)]
pub struct ResourceKind {
    api_resource: ApiResource,
    scope: ResourceScope,
}

impl ResourceKind {
    fn namespaced<K>() -> Self
    where
        K: Resource<DynamicType = (), Scope = NamespaceResourceScope>,
    {
        Self {
            api_resource: ApiResource::erase::<K>(&()),
            scope: ResourceScope::Namespaced,
        }
    }

    fn cluster<K>() -> Self
    where
        K: Resource<DynamicType = (), Scope = ClusterResourceScope>,
    {
        Self {
            api_resource: ApiResource::erase::<K>(&()),
            scope: ResourceScope::Cluster,
        }
    }

    pub fn name(&self) -> &str {
        &self.api_resource.plural
    }

    pub fn kind(&self) -> &str {
        &self.api_resource.kind
    }

    pub fn api_version(&self) -> &str {
        &self.api_resource.api_version
    }

    pub fn scope(&self) -> ResourceScope {
        self.scope
    }

    pub fn api_resource(&self) -> &ApiResource {
        &self.api_resource
    }

    /// Matches either the plural resource name or the kind, ignoring case.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim();

        name.eq_ignore_ascii_case(self.name()) || name.eq_ignore_ascii_case(self.kind())
    }
}

static CATALOG: OnceLock<Vec<ResourceKind>> = OnceLock::new();

/// Every resource kind the dumper knows about, ordered by name.
pub fn catalog() -> &'static [ResourceKind] {
    CATALOG.get_or_init(|| {
        let mut kinds = vec![
            ResourceKind::namespaced::<ConfigMap>(),
            ResourceKind::namespaced::<CronJob>(),
            ResourceKind::namespaced::<DaemonSet>(),
            ResourceKind::namespaced::<Deployment>(),
            ResourceKind::namespaced::<Endpoints>(),
            ResourceKind::namespaced::<HorizontalPodAutoscaler>(),
            ResourceKind::namespaced::<Ingress>(),
            ResourceKind::namespaced::<Job>(),
            ResourceKind::namespaced::<LimitRange>(),
            ResourceKind::namespaced::<NetworkPolicy>(),
            ResourceKind::namespaced::<PersistentVolumeClaim>(),
            ResourceKind::namespaced::<PodDisruptionBudget>(),
            ResourceKind::namespaced::<PodTemplate>(),
            ResourceKind::namespaced::<ReplicaSet>(),
            ResourceKind::namespaced::<ReplicationController>(),
            ResourceKind::namespaced::<ResourceQuota>(),
            ResourceKind::namespaced::<Role>(),
            ResourceKind::namespaced::<RoleBinding>(),
            ResourceKind::namespaced::<Secret>(),
            ResourceKind::namespaced::<Service>(),
            ResourceKind::namespaced::<ServiceAccount>(),
            ResourceKind::namespaced::<StatefulSet>(),
            ResourceKind::cluster::<CustomResourceDefinition>(),
            ResourceKind::cluster::<PersistentVolume>(),
            ResourceKind::cluster::<PodSecurityPolicy>(),
            ResourceKind::cluster::<StorageClass>(),
        ];

        kinds.sort_by(|a, b| a.name().cmp(b.name()));
        kinds
    })
}

pub fn catalog_in_scope(scope: ResourceScope) -> impl Iterator<Item = &'static ResourceKind> {
    catalog().iter().filter(move |kind| kind.scope() == scope)
}

pub fn find(name: &str) -> Option<&'static ResourceKind> {
    catalog().iter().find(|kind| kind.matches(name))
}

pub fn is_skipped(kind: &ResourceKind, skip_types: &[String]) -> bool {
    skip_types.iter().any(|skipped| kind.matches(skipped))
}

/// Returns the skip list entries that don't name any known resource kind.
pub fn unknown_types(skip_types: &[String]) -> Vec<&str> {
    skip_types
        .iter()
        .map(String::as_str)
        .filter(|name| find(name).is_none())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_sorted_and_unique() {
        let names = catalog().iter().map(|k| k.name()).collect::<Vec<_>>();
        let mut sorted = names.clone();

        sorted.sort_unstable();
        sorted.dedup();

        assert_eq!(names, sorted);
        assert_eq!(names.len(), 26);
    }

    #[test]
    fn catalog_uses_plural_names_and_group_versions() {
        let hpa = find("horizontalpodautoscalers").unwrap();
        let endpoints = find("endpoints").unwrap();
        let policies = find("networkpolicies").unwrap();

        assert_eq!(hpa.api_version(), "autoscaling/v1");
        assert_eq!(endpoints.api_version(), "v1");
        assert_eq!(endpoints.kind(), "Endpoints");
        assert_eq!(policies.api_version(), "networking.k8s.io/v1");
    }

    #[test]
    fn cluster_scoped_kinds_are_marked() {
        let cluster = catalog_in_scope(ResourceScope::Cluster)
            .map(|k| k.name())
            .collect::<Vec<_>>();

        assert_eq!(
            cluster,
            vec![
                "customresourcedefinitions",
                "persistentvolumes",
                "podsecuritypolicies",
                "storageclasses"
            ]
        );
        assert_eq!(find("secrets").unwrap().scope(), ResourceScope::Namespaced);
    }

    #[test]
    fn find_accepts_kind_and_any_case() {
        assert_eq!(find("Deployment").unwrap().name(), "deployments");
        assert_eq!(find("DEPLOYMENTS").unwrap().name(), "deployments");
        assert_eq!(find("serviceaccount").unwrap().name(), "serviceaccounts");
        assert!(find("pods").is_none());
    }

    #[test]
    fn skip_list_matches_singular_and_plural() {
        let accounts = find("serviceaccounts").unwrap();
        let secrets = find("secrets").unwrap();

        assert!(is_skipped(accounts, &["serviceaccount".to_owned()]));
        assert!(is_skipped(accounts, &["serviceaccounts".to_owned()]));
        assert!(!is_skipped(secrets, &["serviceaccounts".to_owned()]));
        assert!(!is_skipped(secrets, &[]));
    }

    #[test]
    fn unknown_skip_types_are_reported() {
        let skip = vec!["secrets".to_owned(), "thirdpartyresources".to_owned()];

        assert_eq!(unknown_types(&skip), vec!["thirdpartyresources"]);
    }
}
