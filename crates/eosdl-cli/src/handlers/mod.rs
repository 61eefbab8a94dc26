//! Command handlers.
//!
//! Each handler receives the composed [`crate::CliContext`], performs one
//! command and prints its results.

pub mod get;
pub mod info;
pub mod post_process;
