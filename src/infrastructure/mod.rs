//! Infrastructure layer providing external service integrations.
//!
//! HTTP access to the remote data gateway, configuration and log setup.

pub mod config;
pub mod gateway;
pub mod logging;

pub use config::*;
pub use gateway::*;
