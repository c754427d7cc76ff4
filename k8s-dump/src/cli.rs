use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use k8s_dump_core::snapshot::VolatileField;

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    #[command(flatten)]
    pub global_args: GlobalArgs,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// override default kubeconfig
    #[arg(long, global = true)]
    pub kube_config: Option<String>,
    /// override default kubeconfig context
    #[arg(long, global = true)]
    pub kube_context: Option<String>,
    /// address of the apiserver (protocol://address:port), overrides the one from kubeconfig
    ///
    /// if neither this nor a kubeconfig is specified, in-cluster discovery is attempted first
    #[arg(long, global = true)]
    pub apiserver_host: Option<String>,
    /// dump configuration file (defaults to 'dump-config' next to the kubeconfig, if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose_logging: bool,
    /// enable trace output (more detailed than verbose, overrides it if present)
    #[arg(long = "trace", global = true)]
    pub trace_logging: bool,
}

impl GlobalArgs {
    pub fn get_log_level(&self) -> LogLevel {
        if self.trace_logging {
            return LogLevel::Trace;
        }

        if self.verbose_logging {
            return LogLevel::Verbose;
        }

        LogLevel::Normal
    }
}

pub enum LogLevel {
    Normal,
    Verbose,
    Trace,
}

#[derive(Debug, Subcommand)]
#[command(arg_required_else_help = true)]
pub enum Commands {
    /// dump the cluster objects into one YAML file per namespace
    #[command(alias = "d")]
    Dump(DumpArgs),
    /// list the resource types included in a dump
    #[command(alias = "t")]
    ListTypes(ListTypesArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Names,
    Table,
    TableWithHeaders,
    Json,
    JsonPretty,
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StripField {
    ManagedFields,
    Uid,
    CreationTimestamp,
    Generation,
    Status,
}

impl From<StripField> for VolatileField {
    fn from(value: StripField) -> Self {
        match value {
            StripField::ManagedFields => VolatileField::ManagedFields,
            StripField::Uid => VolatileField::Uid,
            StripField::CreationTimestamp => VolatileField::CreationTimestamp,
            StripField::Generation => VolatileField::Generation,
            StripField::Status => VolatileField::Status,
        }
    }
}

#[derive(Debug, Default, Args)]
pub struct DumpArgs {
    /// directory where the dump files should be created
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
    /// only dump the contents of these namespaces (can be repeated)
    #[arg(short = 'n', long)]
    pub namespace: Vec<String>,
    /// comma separated resource types to leave out of the dump (defaults to serviceaccounts)
    #[arg(long, value_delimiter = ',')]
    pub skip_types: Option<Vec<String>>,
    /// regular expression matching the namespaces that shouldn't be dumped
    #[arg(long)]
    pub exclude_namespaces: Option<String>,
    /// comma separated volatile fields to remove on top of resourceVersion
    #[arg(long, value_enum, value_delimiter = ',')]
    pub strip: Option<Vec<StripField>>,
    /// don't write the cluster-scoped objects snapshot
    #[arg(long)]
    pub no_cluster_scoped: bool,
    /// record query errors in the snapshot header instead of aborting
    #[arg(long)]
    pub continue_on_error: bool,
    /// maximum number of namespaces dumped at the same time (unbounded if unset)
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// apiserver read timeout in seconds
    #[arg(long)]
    pub request_timeout: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ListTypesArgs {
    /// output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::TableWithHeaders)]
    pub output: OutputFormat,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn dump_args_are_parsed() {
        let cli = Cli::parse_from([
            "k8s-dump",
            "dump",
            "-o",
            "backup",
            "-n",
            "shop",
            "-n",
            "default",
            "--skip-types",
            "secrets,serviceaccount",
            "--strip",
            "managed-fields,status",
            "--no-cluster-scoped",
            "--kube-context",
            "staging",
        ]);

        let Commands::Dump(args) = cli.command else {
            panic!("expected the dump command");
        };

        assert_eq!(args.output, Some(PathBuf::from("backup")));
        assert_eq!(args.namespace, vec!["shop", "default"]);
        assert_eq!(
            args.skip_types,
            Some(vec!["secrets".to_owned(), "serviceaccount".to_owned()])
        );
        assert_eq!(
            args.strip,
            Some(vec![StripField::ManagedFields, StripField::Status])
        );
        assert!(args.no_cluster_scoped);
        assert_eq!(cli.global_args.kube_context.as_deref(), Some("staging"));
    }

    #[test]
    fn trace_overrides_verbose() {
        let cli = Cli::parse_from(["k8s-dump", "-v", "--trace", "list-types"]);

        assert!(matches!(cli.global_args.get_log_level(), LogLevel::Trace));
    }
}
