use super::Session;
use super::view::RuleDetailResponse;
use crate::cli::GlobalFlags;
use crate::output::output;

pub async fn run(session: &Session, id: &str, flags: &GlobalFlags) -> anyhow::Result<()> {
    let rule = session
        .rules
        .get(&session.access_token, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("rule '{id}' not found"))?;
    output(&RuleDetailResponse { rule }, flags.format)
}
