#[allow(clippy::module_inception)]
pub mod connection;
pub mod ghost_table;
