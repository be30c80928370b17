pub mod config;
pub mod connectors;
pub mod core;
pub mod status;
pub mod strategies;
pub mod types;
