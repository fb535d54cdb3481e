use super::Session;
use super::view::RuleDeletedResponse;
use crate::cli::GlobalFlags;
use crate::output::output;

pub async fn run(session: &Session, id: &str, flags: &GlobalFlags) -> anyhow::Result<()> {
    let id = id.trim();
    if id.is_empty() {
        anyhow::bail!("rule id must not be empty");
    }
    session.rules.delete(&session.access_token, id).await?;
    tracing::debug!(%id, "rule deleted");
    output(
        &RuleDeletedResponse {
            id: id.to_string(),
            deleted: true,
        },
        flags.format,
    )
}
