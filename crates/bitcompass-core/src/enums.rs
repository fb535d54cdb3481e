//! Closed tag enums for bitcompass entities.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Kind of a knowledge-base entry.
///
/// Stored in the `kind` column of the `rules` table. Any other value is
/// rejected on deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Rule,
    Solution,
}

impl RuleKind {
    /// Return the string representation used in the `kind` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Solution => "solution",
        }
    }

    /// Plural label for headings ("rules", "solutions").
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Rule => "rules",
            Self::Solution => "solutions",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rule" | "rules" => Ok(Self::Rule),
            "solution" | "solutions" => Ok(Self::Solution),
            other => Err(CoreError::UnknownRuleKind(other.to_string())),
        }
    }
}
