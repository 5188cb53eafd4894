//! Subcommand implementations.
//!
//! Each command writes its output to the given writer so it can be checked
//! in tests without capturing stdout.

pub mod cart;
pub mod catalog;
pub mod checkout;

use std::io;

use mini_vendas_storefront::api::ApiError;
use thiserror::Error;

/// Errors that abort a command before it can report a result.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("API client error: {0}")]
    Api(#[from] ApiError),
    #[error("output error: {0}")]
    Io(#[from] io::Error),
}

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The command ran but the requested action was refused or failed.
    Failed,
}
