use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use k8s_dump_core::{
    kubernetes::operations::{create_local_client, ConnectionParams},
    snapshot::{plan::default_skip_types, DumpPlan, DumpPlanBuilder, VolatileField},
};
use log::info;

use crate::{
    cli::{DumpArgs, GlobalArgs},
    config::DumpConfig,
};

pub const DEFAULT_OUTPUT: &str = ".";

const CLIENT_INIT_ERROR: &str = "Error while initializing connection to Kubernetes apiserver. \
    This most likely means that the cluster is misconfigured (e.g., it has invalid apiserver \
    certificates or service accounts configuration).";

pub async fn dump(global_args: &GlobalArgs, args: DumpArgs, config: &DumpConfig) -> anyhow::Result<()> {
    let plan = build_plan(&args, config)?;
    let connection = ConnectionParams {
        kube_config: global_args.kube_config.clone(),
        kube_context: global_args.kube_context.clone(),
        apiserver_host: global_args.apiserver_host.clone(),
        request_timeout: args.request_timeout.map(Duration::from_secs),
    };

    let client = create_local_client(&connection)
        .await
        .context(CLIENT_INIT_ERROR)?;

    let report = k8s_dump_core::dump(&client, &plan)
        .await
        .context("Couldn't dump the cluster objects!")?;

    for snapshot in &report.snapshots {
        info!(
            "{} -> {} ({} objects)",
            snapshot.name,
            snapshot.path.display(),
            snapshot.objects
        );
    }

    info!(
        "Dumped {} objects into {} files",
        report.total_objects(),
        report.snapshots.len()
    );

    Ok(())
}

/// Merges the command line with the config file; flags win over the file.
pub fn build_plan(args: &DumpArgs, config: &DumpConfig) -> anyhow::Result<DumpPlan> {
    let output = args
        .output
        .clone()
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let skip_types = args
        .skip_types
        .clone()
        .or_else(|| config.skip_types.clone())
        .unwrap_or_else(default_skip_types);
    let strip = match &args.strip {
        Some(fields) => fields.iter().copied().map(VolatileField::from).collect(),
        None => config.strip.clone().unwrap_or_default(),
    };
    let exclude_pattern = args
        .exclude_namespaces
        .as_deref()
        .or(config.exclude_namespaces.as_deref());

    let plan = DumpPlanBuilder::default()
        .output(output)
        .namespaces(args.namespace.clone())
        .skip_types(skip_types)
        .strip(strip)
        .cluster_scoped(!args.no_cluster_scoped && config.cluster_scoped.unwrap_or(true))
        .continue_on_error(args.continue_on_error || config.continue_on_error.unwrap_or(false))
        .concurrency(args.concurrency.or(config.concurrency))
        .exclude_pattern(exclude_pattern)?
        .build()?
        .validated()?;

    Ok(plan)
}
