pub mod helpers;
pub mod kubernetes;
pub mod resources;
pub mod snapshot;

pub use kubernetes::{operations::ConnectionParams, ClusterSource};
pub use snapshot::{dump, DumpPlan, DumpPlanBuilder, DumpReport};
