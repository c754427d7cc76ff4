use std::{
    fs,
    path::{Path, PathBuf},
};

use k8s_dump_core::{helpers::With, snapshot::VolatileField};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILENAME: &str = "dump-config";
pub const KUBECONFIG_ENV_VAR: &str = "KUBECONFIG";

#[derive(Debug, Error)]
pub enum DumpConfigError {
    #[error("Couldn't open '{}'! Reason: {}", .0.display(), .1)]
    IoError(PathBuf, std::io::Error),
    #[error("Couldn't parse '{}'! Reason: {}", .0.display(), .1)]
    DeserializationError(PathBuf, serde_yaml::Error),
}

/// Defaults for the dump command, read from a YAML file. Command line flags take
/// precedence over anything set here.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DumpConfig {
    pub output: Option<PathBuf>,
    pub skip_types: Option<Vec<String>>,
    pub exclude_namespaces: Option<String>,
    pub strip: Option<Vec<VolatileField>>,
    pub cluster_scoped: Option<bool>,
    pub continue_on_error: Option<bool>,
    pub concurrency: Option<usize>,
}

impl DumpConfig {
    pub fn load(path: &Path) -> Result<Self, DumpConfigError> {
        debug!("Used config path: {path:?}");

        let content =
            fs::read_to_string(path).map_err(|e| DumpConfigError::IoError(path.to_owned(), e))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content)
            .map_err(|e| DumpConfigError::DeserializationError(path.to_owned(), e))
    }

    /// Loads the explicitly requested file, or the default one when it exists.
    pub fn resolve(
        explicit_path: Option<&Path>,
        kube_config_path: Option<&str>,
    ) -> Result<Self, DumpConfigError> {
        if let Some(path) = explicit_path {
            return Self::load(path);
        }

        match default_config_path(kube_config_path) {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// The default config lives next to the kubeconfig in use.
pub fn default_config_path(kube_config_path: Option<&str>) -> Option<PathBuf> {
    let kube_config_path = match kube_config_path {
        Some(path) => PathBuf::from(path),
        None => std::env::var_os(KUBECONFIG_ENV_VAR)
            .and_then(|paths| std::env::split_paths(&paths).next())
            .or_else(|| {
                home::home_dir().map(|d| d.with(|d| d.push(".kube")).with(|d| d.push("config")))
            })?,
    };

    kube_config_path
        .parent()
        .map(|dir| dir.join(DEFAULT_CONFIG_FILENAME))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn config_is_read_from_camel_case_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dump.yaml");
        fs::write(
            &path,
            "output: /var/backups/cluster\n\
             skipTypes: [secrets]\n\
             excludeNamespaces: ^kube-\n\
             strip: [managed-fields]\n\
             clusterScoped: false\n\
             concurrency: 4\n",
        )
        .unwrap();

        let config = DumpConfig::load(&path).unwrap();

        assert_eq!(
            config,
            DumpConfig {
                output: Some(PathBuf::from("/var/backups/cluster")),
                skip_types: Some(vec!["secrets".to_owned()]),
                exclude_namespaces: Some("^kube-".to_owned()),
                strip: Some(vec![VolatileField::ManagedFields]),
                cluster_scoped: Some(false),
                continue_on_error: None,
                concurrency: Some(4),
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dump.yaml");
        fs::write(&path, "skipType: [secrets]\n").unwrap();

        let result = DumpConfig::load(&path);

        assert!(matches!(
            result,
            Err(DumpConfigError::DeserializationError(_, _))
        ));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();

        let result = DumpConfig::resolve(Some(&dir.path().join("absent")), None);

        assert!(matches!(result, Err(DumpConfigError::IoError(_, _))));
    }

    #[test]
    fn default_file_is_optional() {
        let dir = TempDir::new().unwrap();
        let kube_config = dir.path().join("config");
        let kube_config = kube_config.to_str().unwrap();

        assert_eq!(
            DumpConfig::resolve(None, Some(kube_config)).unwrap(),
            DumpConfig::default()
        );

        fs::write(dir.path().join(DEFAULT_CONFIG_FILENAME), "concurrency: 2\n").unwrap();

        assert_eq!(
            DumpConfig::resolve(None, Some(kube_config))
                .unwrap()
                .concurrency,
            Some(2)
        );
    }

    #[test]
    fn empty_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dump.yaml");
        fs::write(&path, "\n").unwrap();

        assert_eq!(DumpConfig::load(&path).unwrap(), DumpConfig::default());
    }

    #[test]
    fn default_path_sits_next_to_the_kubeconfig() {
        assert_eq!(
            default_config_path(Some("/home/user/.kube/config")),
            Some(PathBuf::from("/home/user/.kube/dump-config"))
        );
    }
}
