use k8s_dump_core::{
    resources::{catalog, is_skipped, ResourceKind, ResourceScope},
    snapshot::plan::default_skip_types,
};
use k8s_dump_macros::TableOutputRow;
use serde::Serialize;

use crate::{cli::ListTypesArgs, config::DumpConfig, output::CliPrint};

pub fn list_types(args: ListTypesArgs, config: &DumpConfig) -> anyhow::Result<()> {
    let skip_types = config
        .skip_types
        .clone()
        .unwrap_or_else(default_skip_types);
    let views = resource_kind_views(&skip_types);

    views.print(args.output)?;

    Ok(())
}

fn resource_kind_views(skip_types: &[String]) -> Vec<ResourceKindView<'static>> {
    catalog()
        .iter()
        .map(|kind| ResourceKindView::new(kind, skip_types))
        .collect()
}

#[derive(Serialize, TableOutputRow)]
#[serde(rename_all = "camelCase")]
struct ResourceKindView<'a> {
    #[name_column]
    pub name: &'a str,
    pub kind: &'a str,
    pub api_version: &'a str,
    pub scope: ResourceScope,
    pub skipped: bool,
}

impl<'a> ResourceKindView<'a> {
    fn new(kind: &'a ResourceKind, skip_types: &[String]) -> Self {
        ResourceKindView {
            name: kind.name(),
            kind: kind.kind(),
            api_version: kind.api_version(),
            scope: kind.scope(),
            skipped: is_skipped(kind, skip_types),
        }
    }
}
