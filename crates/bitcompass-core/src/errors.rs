//! Cross-cutting error types for bitcompass.
//!
//! Transport and auth errors live in their own crates (`AuthError`,
//! `RulesError`); they converge into `anyhow` in `bitcompass-cli`.

use thiserror::Error;

/// Errors raised while building or interpreting domain values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed validation before being sent to the backend.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A `kind` value outside the closed `rule` / `solution` set.
    #[error("unknown rule kind '{0}' (expected 'rule' or 'solution')")]
    UnknownRuleKind(String),
}
