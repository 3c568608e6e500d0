pub mod config;
pub mod reconcile;
pub mod remote;
pub mod session;
pub mod types;
