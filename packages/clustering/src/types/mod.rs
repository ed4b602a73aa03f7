//! Data types for the clustering library.

pub mod analysis;
pub mod cluster;
pub mod config;
pub mod proposal;
pub mod record;
pub mod request;
