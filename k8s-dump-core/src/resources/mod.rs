pub mod catalog;

pub use catalog::{catalog, catalog_in_scope, find, is_skipped, ResourceKind, ResourceScope};
