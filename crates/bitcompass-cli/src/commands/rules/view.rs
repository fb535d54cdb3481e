use bitcompass_core::Rule;
use serde::Serialize;

use crate::output::{TextView, table, table_options};
use crate::ui::{Tone, paint};

#[derive(Debug, Serialize)]
pub struct RuleListResponse {
    pub rules: Vec<Rule>,
    pub count: usize,
}

impl RuleListResponse {
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        let count = rules.len();
        Self { rules, count }
    }

    fn table(&self, options: table::TableOptions) -> String {
        if self.rules.is_empty() {
            return String::from("No rules found.");
        }
        let rows = self
            .rules
            .iter()
            .map(|rule| {
                vec![
                    rule.id.clone(),
                    rule.kind.to_string(),
                    rule.title.clone(),
                    rule.technologies_label(),
                    rule.created_at.format("%Y-%m-%d").to_string(),
                ]
            })
            .collect::<Vec<_>>();
        table::render_table(
            &["id", "kind", "title", "technologies", "created"],
            &rows,
            options,
        )
    }
}

impl TextView for RuleListResponse {
    fn text(&self) -> String {
        self.table(table_options())
    }
}

#[derive(Debug, Serialize)]
pub struct RuleDetailResponse {
    pub rule: Rule,
}

impl TextView for RuleDetailResponse {
    fn text(&self) -> String {
        let rule = &self.rule;
        let mut out = vec![
            format!("{} [{}]", paint(Tone::Cyan, &rule.title), rule.kind),
            paint(
                Tone::Dim,
                &format!("{}  updated {}", rule.id, rule.updated_at.format("%Y-%m-%d %H:%M")),
            ),
        ];
        let technologies = rule.technologies_label();
        if !technologies.is_empty() {
            out.push(format!("technologies: {technologies}"));
        }
        if !rule.description.trim().is_empty() {
            out.push(String::new());
            out.push(rule.description.trim().to_string());
        }
        out.push(String::new());
        out.push(rule.body.trim_end().to_string());
        if let Some(context) = rule.context.as_deref().filter(|c| !c.trim().is_empty()) {
            out.push(String::new());
            out.push(paint(Tone::Dim, "Context"));
            out.push(context.trim_end().to_string());
        }
        if let Some(examples) = rule.examples.as_deref().filter(|e| !e.is_empty()) {
            out.push(String::new());
            out.push(paint(Tone::Dim, "Examples"));
            out.extend(examples.iter().map(|example| format!("  - {example}")));
        }
        out.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct RuleDeletedResponse {
    pub id: String,
    pub deleted: bool,
}

impl TextView for RuleDeletedResponse {
    fn text(&self) -> String {
        format!("Deleted {}.", self.id)
    }
}
