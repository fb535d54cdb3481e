use bitcompass_rules::RuleFilter;

use super::Session;
use super::view::RuleListResponse;
use crate::cli::GlobalFlags;
use crate::output::output;

pub async fn run(session: &Session, filter: RuleFilter, flags: &GlobalFlags) -> anyhow::Result<()> {
    let rules = session.rules.list(&session.access_token, filter).await?;
    output(&RuleListResponse::new(rules), flags.format)
}
