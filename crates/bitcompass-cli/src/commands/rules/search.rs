use bitcompass_rules::RuleFilter;

use super::Session;
use super::view::RuleListResponse;
use crate::cli::GlobalFlags;
use crate::output::output;

pub async fn run(
    session: &Session,
    query: &str,
    filter: RuleFilter,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let rules = session
        .rules
        .search(&session.access_token, query, filter)
        .await?;
    tracing::debug!(query, hits = rules.len(), "rule search finished");
    output(&RuleListResponse::new(rules), flags.format)
}
