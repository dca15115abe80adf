//! Command handlers.
//!
//! Each handler is a thin wrapper: parse CLI-specific input, call the
//! repositories or services from [`crate::CliContext`], print the result.

pub mod init;
pub mod like;
pub mod question;
pub mod user;
