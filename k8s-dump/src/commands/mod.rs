pub mod dump;
pub mod list_types;
