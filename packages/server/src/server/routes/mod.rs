// HTTP routes
pub mod cluster;
pub mod extract;
pub mod health;

pub use cluster::*;
pub use extract::*;
pub use health::*;
