// Clustering Service - API Core
//
// HTTP boundary for instruction-driven clustering. The pipeline itself lives
// in the `clustering` library; this crate wires configuration, the oracle,
// and the routes.

pub mod config;
pub mod server;

pub use config::*;
