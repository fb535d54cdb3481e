//! # bitcompass-core
//!
//! Domain types shared across the bitcompass crates:
//! - [`entities::Rule`] and its insert payload [`entities::NewRule`]
//! - [`enums::RuleKind`], the closed `rule` / `solution` tag
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;

pub use entities::{NewRule, Rule};
pub use enums::RuleKind;
pub use errors::CoreError;
