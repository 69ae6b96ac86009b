pub mod api;
pub mod registry;
