//! Core trait abstractions.

pub mod oracle;
