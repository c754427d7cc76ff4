use std::time::Duration;

use anyhow::Context;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::ListParams,
    config::{KubeConfigOptions, Kubeconfig},
    core::{DynamicObject, TypeMeta},
    Api, Client, Config,
};
use log::{debug, info};

use crate::{helpers::is_not_found, resources::ResourceKind};

use super::{describe_location, ListError, Listing, NamespaceEntry};

pub const LIST_PAGE_SIZE: u32 = 500;

#[derive(Debug, Default, Clone)]
pub struct ConnectionParams {
    /// kubeconfig file to load instead of the default one
    pub kube_config: Option<String>,
    pub kube_context: Option<String>,
    /// apiserver address (`protocol://address:port[/prefix]`) overriding the loaded config
    pub apiserver_host: Option<String>,
    pub request_timeout: Option<Duration>,
}

/// Without an explicit kubeconfig or context the configuration is inferred, which
/// tries the in-cluster service account before the local kubeconfig. When nothing can
/// be inferred, an apiserver address alone is enough (e.g. a `kubectl proxy` endpoint).
pub async fn create_local_client(params: &ConnectionParams) -> anyhow::Result<Client> {
    let config_options = KubeConfigOptions {
        context: params.kube_context.to_owned(),
        ..Default::default()
    };

    let mut config = match (&params.kube_config, &params.kube_context) {
        (Some(path), _) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("Couldn't load kubeconfig from '{path}'!"))?;
            Config::from_custom_kubeconfig(kubeconfig, &config_options).await?
        }
        (None, Some(_)) => Config::from_kubeconfig(&config_options).await?,
        (None, None) => match (Config::infer().await, &params.apiserver_host) {
            (Ok(config), _) => config,
            (Err(error), Some(host)) => {
                debug!("Couldn't infer cluster config ({error}), connecting to {host} directly");
                Config::new(
                    host.parse()
                        .with_context(|| format!("Invalid apiserver address '{host}'!"))?,
                )
            }
            (Err(error), None) => return Err(error.into()),
        },
    };

    if let Some(host) = &params.apiserver_host {
        config.cluster_url = host
            .parse()
            .with_context(|| format!("Invalid apiserver address '{host}'!"))?;
    }

    if let Some(timeout) = params.request_timeout {
        config.read_timeout = Some(timeout);
    }

    info!("Creating API server client for {}", config.cluster_url);

    let client = Client::try_from(config)?;

    Ok(client)
}

pub async fn list_namespaces(client: &Client) -> Result<Vec<NamespaceEntry>, ListError> {
    let namespace_api: Api<Namespace> = Api::all(client.clone());
    let namespaces = namespace_api
        .list(&ListParams::default())
        .await
        .map_err(|e| ListError::new("namespaces", None, e))?;

    Ok(namespaces
        .items
        .into_iter()
        .filter_map(|namespace| {
            Some(NamespaceEntry {
                name: namespace.metadata.name?,
                phase: namespace.status.and_then(|s| s.phase),
            })
        })
        .collect())
}

/// Lists every object of a resource kind, following continuation tokens.
///
/// Items of a list response come without their type meta, so it's filled in from the
/// resource kind to keep the serialized objects self-describing.
pub async fn list_objects(
    client: &Client,
    namespace: Option<&str>,
    resource: &ResourceKind,
) -> Result<Listing, ListError> {
    let api_resource = resource.api_resource();
    let api: Api<DynamicObject> = match namespace {
        Some(namespace) => Api::namespaced_with(client.clone(), namespace, api_resource),
        None => Api::all_with(client.clone(), api_resource),
    };

    let mut list_params = ListParams::default().limit(LIST_PAGE_SIZE);
    let mut items = Vec::new();

    loop {
        let page = match api.list(&list_params).await {
            Ok(page) => page,
            Err(error) if is_not_found(&error) => {
                debug!(
                    "'{}' isn't served for {}",
                    resource.name(),
                    describe_location(namespace)
                );
                return Ok(Listing::Missing);
            }
            Err(error) => return Err(ListError::new(resource.name(), namespace, error)),
        };

        items.extend(page.items);

        match page.metadata.continue_ {
            Some(token) if !token.is_empty() => {
                list_params = list_params.continue_token(&token);
            }
            _ => break,
        }
    }

    for item in &mut items {
        item.types = Some(TypeMeta {
            api_version: api_resource.api_version.clone(),
            kind: api_resource.kind.clone(),
        });
    }

    Ok(Listing::Found(items))
}
