use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::RuleKind;
use crate::errors::CoreError;

/// A stored knowledge-base entry, as returned by the `rules` table.
///
/// Rows are owned by `user_id`; visibility is decided by row-level security
/// on the backend, never by the client.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Rule {
    pub id: String,
    pub kind: RuleKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rule {
    /// Technologies as a comma-separated list, empty when unset.
    #[must_use]
    pub fn technologies_label(&self) -> String {
        self.technologies
            .as_deref()
            .map(|items| items.join(", "))
            .unwrap_or_default()
    }
}

/// Insert payload for a new rule or solution.
///
/// `id`, `user_id` and timestamps are filled in by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewRule {
    pub kind: RuleKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
}

impl NewRule {
    /// Reject payloads the backend would store as unusable entries.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if `title` or `body` is blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation("title must not be empty".into()));
        }
        if self.body.trim().is_empty() {
            return Err(CoreError::Validation("body must not be empty".into()));
        }
        Ok(())
    }
}
