use bitcompass_core::{NewRule, RuleKind};
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRulesRequest {
    /// Text to look for in title, description and body (case-insensitive)
    pub query: String,
    /// Restrict to "rule" or "solution"
    #[serde(default)]
    pub kind: Option<RuleKind>,
    /// Maximum number of results (default from config, max 100)
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRulesRequest {
    /// Restrict to "rule" or "solution"
    #[serde(default)]
    pub kind: Option<RuleKind>,
    /// Maximum number of results (default from config, max 100)
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetRuleRequest {
    /// ID of the rule or solution
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PostRuleRequest {
    /// "rule" for a guideline, "solution" for a fix to a concrete problem
    pub kind: RuleKind,
    /// Short title
    pub title: String,
    /// One-paragraph summary
    #[serde(default)]
    pub description: Option<String>,
    /// Full content (markdown)
    pub body: String,
    /// When the entry applies
    #[serde(default)]
    pub context: Option<String>,
    /// Concrete examples
    #[serde(default)]
    pub examples: Option<Vec<String>>,
    /// Technologies involved (e.g. "rust", "postgres")
    #[serde(default)]
    pub technologies: Option<Vec<String>>,
}

impl From<PostRuleRequest> for NewRule {
    fn from(req: PostRuleRequest) -> Self {
        Self {
            kind: req.kind,
            title: req.title,
            description: req.description.unwrap_or_default(),
            body: req.body,
            context: req.context.filter(|c| !c.trim().is_empty()),
            examples: req.examples.filter(|e| !e.is_empty()),
            technologies: req.technologies.filter(|t| !t.is_empty()),
        }
    }
}
