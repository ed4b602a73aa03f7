//! Oracle implementations backed by hosted models.
//!
//! Users can use these directly or implement [`crate::Oracle`] themselves.

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAiOracle;
