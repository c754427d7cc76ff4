use std::path::PathBuf;

use derive_builder::Builder;
use log::warn;
use regex::Regex;
use thiserror::Error;

use crate::resources::catalog::unknown_types;

use super::scrub::VolatileField;

pub const DEFAULT_SKIP_TYPES: &[&str] = &["serviceaccounts"];

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid namespace exclusion pattern! Reason: {}", .0)]
    InvalidNamespaceFilter(regex::Error),
    #[error("Concurrency has to be at least 1!")]
    ZeroConcurrency,
    #[error("'{}' isn't a valid namespace name!", .0)]
    InvalidNamespaceName(String),
}

const MAX_NAMESPACE_LENGTH: usize = 63;

/// Namespace names are RFC 1123 labels, which also keeps them safe to use as file names.
pub fn is_valid_namespace_name(name: &str) -> bool {
    let bytes = name.as_bytes();

    !bytes.is_empty()
        && bytes.len() <= MAX_NAMESPACE_LENGTH
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        && bytes[0] != b'-'
        && bytes[bytes.len() - 1] != b'-'
}

pub fn default_skip_types() -> Vec<String> {
    DEFAULT_SKIP_TYPES.iter().map(|s| (*s).to_owned()).collect()
}

/// What to dump and where to put it.
#[derive(Debug, Clone, Builder)]
pub struct DumpPlan {
    #[builder(setter(into))]
    pub output: PathBuf,
    /// explicit namespaces; when empty every namespace of the cluster is dumped
    #[builder(default)]
    pub namespaces: Vec<String>,
    #[builder(default = "default_skip_types()")]
    pub skip_types: Vec<String>,
    #[builder(default)]
    pub exclude_namespaces: Option<Regex>,
    #[builder(default)]
    pub strip: Vec<VolatileField>,
    #[builder(default = "true")]
    pub cluster_scoped: bool,
    #[builder(default)]
    pub continue_on_error: bool,
    /// number of namespaces dumped at once; unbounded when unset
    #[builder(default)]
    pub concurrency: Option<usize>,
}

impl DumpPlanBuilder {
    pub fn exclude_pattern(&mut self, pattern: Option<&str>) -> Result<&mut Self, PlanError> {
        let regex = pattern
            .map(Regex::new)
            .transpose()
            .map_err(PlanError::InvalidNamespaceFilter)?;

        Ok(self.exclude_namespaces(regex))
    }
}

impl DumpPlan {
    pub fn validated(self) -> Result<Self, PlanError> {
        if self.concurrency == Some(0) {
            return Err(PlanError::ZeroConcurrency);
        }

        if let Some(invalid) = self
            .namespaces
            .iter()
            .find(|namespace| !is_valid_namespace_name(namespace))
        {
            return Err(PlanError::InvalidNamespaceName(invalid.to_owned()));
        }

        for unknown in unknown_types(&self.skip_types) {
            warn!("'{unknown}' isn't a known resource type, skipping it has no effect");
        }

        Ok(self)
    }

    pub fn is_namespace_excluded(&self, namespace: &str) -> bool {
        self.exclude_namespaces
            .as_ref()
            .is_some_and(|regex| regex.is_match(namespace))
    }
}
