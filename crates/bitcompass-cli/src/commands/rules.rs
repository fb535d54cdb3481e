mod delete;
mod get;
mod list;
mod search;
mod view;

use bitcompass_auth::refresh;
use bitcompass_rules::{RuleFilter, RulesClient};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::RulesCommands;
use crate::context::AppContext;

/// Handle `bitcompass rules`.
pub async fn handle(
    action: &RulesCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let session = Session::open(ctx).await?;
    match action {
        RulesCommands::List { kind } => {
            let filter = RuleFilter::new(*kind, page_limit(flags.limit, ctx));
            list::run(&session, filter, flags).await
        }
        RulesCommands::Search { query, kind } => {
            let filter = RuleFilter::new(*kind, page_limit(flags.limit, ctx));
            search::run(&session, query, filter, flags).await
        }
        RulesCommands::Get { id } => get::run(&session, id, flags).await,
        RulesCommands::Delete { id } => delete::run(&session, id, flags).await,
    }
}

/// Rules client plus a fresh access token.
struct Session {
    rules: RulesClient,
    access_token: String,
}

impl Session {
    async fn open(ctx: &AppContext) -> anyhow::Result<Self> {
        let auth = ctx.auth_client();
        let creds = refresh::ensure_fresh(ctx.store.as_ref(), auth.as_ref()).await?;
        let rules = ctx.rules_client()?;
        Ok(Self {
            rules,
            access_token: creds.access_token,
        })
    }
}

/// `--limit` wins over `general.default_limit`.
fn page_limit(flag: Option<u32>, ctx: &AppContext) -> u32 {
    flag.unwrap_or(ctx.config.general.default_limit)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bitcompass_auth::MemoryCredentialStore;
    use bitcompass_config::BitcompassConfig;
    use rstest::rstest;

    use super::*;

    fn ctx_with_default(default_limit: u32) -> AppContext {
        let mut config = BitcompassConfig::default();
        config.general.default_limit = default_limit;
        AppContext::with_store(config, Arc::new(MemoryCredentialStore::new()))
    }

    #[rstest]
    #[case(Some(5), 7, 5)]
    #[case(None, 7, 7)]
    #[case(Some(0), 7, 0)]
    fn page_limit_prefers_flag_over_config(
        #[case] flag: Option<u32>,
        #[case] default_limit: u32,
        #[case] expected: u32,
    ) {
        assert_eq!(page_limit(flag, &ctx_with_default(default_limit)), expected);
    }
}
