use std::path::{Path, PathBuf};

use futures::{stream, StreamExt, TryStreamExt};
use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    kubernetes::{describe_location, ClusterSource, ListError, Listing},
    resources::{catalog, catalog_in_scope, is_skipped, ResourceScope},
};

pub mod plan;
pub mod render;
pub mod scrub;

pub use plan::{DumpPlan, DumpPlanBuilder, PlanError};
pub use render::{render, Snapshot, SnapshotScope};
pub use scrub::{scrub, VolatileField};

/// File stem of the cluster-scoped snapshot. Namespace names are DNS labels and can't
/// start with an underscore, so it never clashes with a namespace snapshot.
pub const CLUSTER_SNAPSHOT_NAME: &str = "_cluster";
pub const SNAPSHOT_EXTENSION: &str = "yaml";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Couldn't retrieve namespaces from the cluster! {}", .0)]
    NamespaceListing(ListError),
    #[error("Unexpected error querying type! {}", .0)]
    Query(ListError),
    #[error("Couldn't serialize the '{}' snapshot! Reason: {}", .0, .1)]
    Serialization(String, serde_yaml::Error),
    #[error("Couldn't write '{}'! Reason: {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),
}

#[derive(Debug, Clone)]
pub struct SnapshotSummary {
    pub name: String,
    pub path: PathBuf,
    pub objects: usize,
    pub missing: Vec<String>,
    pub errors: usize,
}

#[derive(Debug, Default)]
pub struct DumpReport {
    pub snapshots: Vec<SnapshotSummary>,
}

impl DumpReport {
    pub fn total_objects(&self) -> usize {
        self.snapshots.iter().map(|s| s.objects).sum()
    }
}

/// Dumps the selected namespaces (and the cluster scope, if enabled) into the plan's
/// output directory, one file per namespace.
///
/// Namespaces are dumped concurrently and the first failure aborts the whole dump.
pub async fn dump<S: ClusterSource>(source: &S, plan: &DumpPlan) -> Result<DumpReport, SnapshotError> {
    info!("Dumping cluster objects...");

    for resource in catalog().iter().filter(|r| is_skipped(r, &plan.skip_types)) {
        warn!("skipping type {}", resource.name());
    }

    let namespaces = select_namespaces(source, plan).await?;

    tokio::fs::create_dir_all(&plan.output)
        .await
        .map_err(|e| SnapshotError::Io(plan.output.clone(), e))?;

    let concurrency = plan.concurrency.unwrap_or(namespaces.len()).max(1);
    let mut snapshots: Vec<SnapshotSummary> = stream::iter(&namespaces)
        .map(|namespace| dump_namespace(source, plan, namespace))
        .buffer_unordered(concurrency)
        .try_collect()
        .await?;

    if plan.cluster_scoped {
        if let Some(summary) = dump_cluster_scoped(source, plan).await? {
            snapshots.push(summary);
        }
    }

    snapshots.sort_by(|a, b| a.name.cmp(&b.name));

    info!("done");

    Ok(DumpReport { snapshots })
}

async fn select_namespaces<S: ClusterSource>(
    source: &S,
    plan: &DumpPlan,
) -> Result<Vec<String>, SnapshotError> {
    if !plan.namespaces.is_empty() {
        let mut namespaces = plan.namespaces.clone();
        namespaces.sort_unstable();
        namespaces.dedup();

        return Ok(namespaces);
    }

    let namespaces = source
        .list_namespaces()
        .await
        .map_err(SnapshotError::NamespaceListing)?;

    Ok(namespaces
        .into_iter()
        .filter(|namespace| {
            if namespace.is_terminating() {
                info!("skipping namespace {} (is being terminated)", namespace.name);
                return false;
            }

            if plan.is_namespace_excluded(&namespace.name) {
                info!("skipping namespace {} (excluded)", namespace.name);
                return false;
            }

            true
        })
        .map(|namespace| namespace.name)
        .collect())
}

pub async fn dump_namespace<S: ClusterSource>(
    source: &S,
    plan: &DumpPlan,
    namespace: &str,
) -> Result<SnapshotSummary, SnapshotError> {
    info!("dumping namespace {namespace}");

    let snapshot =
        collect_snapshot(source, plan, SnapshotScope::Namespace(namespace.to_owned())).await?;

    write_snapshot(&plan.output, namespace, &snapshot).await
}

/// Returns `None` when every cluster-scoped type is skipped.
pub async fn dump_cluster_scoped<S: ClusterSource>(
    source: &S,
    plan: &DumpPlan,
) -> Result<Option<SnapshotSummary>, SnapshotError> {
    if catalog_in_scope(ResourceScope::Cluster).all(|r| is_skipped(r, &plan.skip_types)) {
        return Ok(None);
    }

    info!("dumping cluster-scoped objects");

    let snapshot = collect_snapshot(source, plan, SnapshotScope::Cluster).await?;

    write_snapshot(&plan.output, CLUSTER_SNAPSHOT_NAME, &snapshot)
        .await
        .map(Some)
}

/// Queries every non-skipped type of the scope one after another.
pub async fn collect_snapshot<S: ClusterSource>(
    source: &S,
    plan: &DumpPlan,
    scope: SnapshotScope,
) -> Result<Snapshot, SnapshotError> {
    let namespace = scope.namespace().map(str::to_owned);
    let resource_scope = match scope {
        SnapshotScope::Namespace(_) => ResourceScope::Namespaced,
        SnapshotScope::Cluster => ResourceScope::Cluster,
    };
    let location = describe_location(namespace.as_deref());
    let mut snapshot = Snapshot::new(scope);

    for resource in catalog_in_scope(resource_scope) {
        let type_name = resource.name();

        if is_skipped(resource, &plan.skip_types) {
            debug!("skipping type {type_name} in {location}");
            continue;
        }

        match source.list_objects(namespace.as_deref(), resource).await {
            Ok(Listing::Found(mut objects)) => {
                debug!("found {} {type_name} in {location}", objects.len());
                for object in &mut objects {
                    scrub(object, &plan.strip);
                }
                snapshot.sections.insert(type_name.to_owned(), objects);
            }
            Ok(Listing::Missing) => {
                snapshot.missing.push(type_name.to_owned());
                snapshot
                    .errors
                    .push(format!("there is no object of type {type_name} in {location}"));
            }
            Err(error) if plan.continue_on_error => {
                warn!("{error}");
                snapshot.errors.push(format!(
                    "error querying type {type_name} in {location}: {}",
                    error.source
                ));
            }
            Err(error) => return Err(SnapshotError::Query(error)),
        }
    }

    Ok(snapshot)
}

pub fn snapshot_path(output: &Path, name: &str) -> PathBuf {
    output.join(format!("{name}.{SNAPSHOT_EXTENSION}"))
}

async fn write_snapshot(
    output: &Path,
    name: &str,
    snapshot: &Snapshot,
) -> Result<SnapshotSummary, SnapshotError> {
    let content =
        render(snapshot).map_err(|e| SnapshotError::Serialization(name.to_owned(), e))?;
    let path = snapshot_path(output, name);

    tokio::fs::write(&path, content)
        .await
        .map_err(|e| SnapshotError::Io(path.clone(), e))?;

    debug!("wrote {}", path.display());

    Ok(SnapshotSummary {
        name: name.to_owned(),
        path,
        objects: snapshot.object_count(),
        missing: snapshot.missing.clone(),
        errors: snapshot.errors.len(),
    })
}
