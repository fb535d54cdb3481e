use std::sync::Arc;

use bitcompass_auth::{AuthClient, AuthError, CredentialStore, refresh};
use bitcompass_core::{NewRule, Rule};
use bitcompass_rules::{RuleFilter, RulesClient, RulesError};
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use crate::requests::{GetRuleRequest, ListRulesRequest, PostRuleRequest, SearchRulesRequest};

const INSTRUCTIONS: &str = r"bitcompass stores reusable engineering knowledge as rules (guidelines) and solutions (fixes to concrete problems).

Before solving a problem, call search_rules with a few keywords to reuse what the team already knows. Use get_rule to read one entry in full. After solving a non-trivial problem, call post_rule with kind=solution so the fix can be found next time.";

/// MCP server exposing the signed-in user's rules.
///
/// Sessions are resolved per tool call, so a `bitcompass login` in another
/// terminal takes effect without restarting the server.
#[derive(Clone)]
pub struct BitcompassServer {
    store: Arc<dyn CredentialStore>,
    auth: Option<AuthClient>,
    rules: Option<RulesClient>,
    default_limit: u32,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl BitcompassServer {
    #[must_use]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        auth: Option<AuthClient>,
        rules: Option<RulesClient>,
        default_limit: u32,
    ) -> Self {
        Self {
            store,
            auth,
            rules,
            default_limit,
            tool_router: Self::tool_router(),
        }
    }

    /// Build from configuration. Backend clients are `None` when unconfigured.
    #[must_use]
    pub fn from_config(
        config: &bitcompass_config::BitcompassConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self::new(
            store,
            AuthClient::from_config(config),
            RulesClient::from_config(config),
            config.general.default_limit,
        )
    }

    /// Serve MCP over stdin/stdout until the client disconnects.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails to initialize or the service
    /// loop ends abnormally.
    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        tracing::info!("starting bitcompass MCP server on stdio");
        let service = self
            .serve(rmcp::transport::io::stdio())
            .await
            .inspect_err(|e| tracing::error!(error = %e, "MCP server failed to start"))?;
        service.waiting().await?;
        tracing::info!("MCP client disconnected");
        Ok(())
    }

    #[tool(description = "Search the user's rules and solutions by keyword. Matches title, description and body case-insensitively. Returns a JSON array of {id, kind, title, description, body, context?, examples?, technologies?, created_at, updated_at}.")]
    async fn search_rules(
        &self,
        Parameters(req): Parameters<SearchRulesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let (token, rules) = match self.session().await {
            Ok(session) => session,
            Err(message) => return Ok(error_result(message)),
        };
        let filter = self.filter(req.kind, req.limit);
        Ok(rules_result(rules.search(&token, &req.query, filter).await))
    }

    #[tool(description = "List the newest rules and solutions, optionally restricted to one kind. Returns a JSON array of rule objects.")]
    async fn list_rules(
        &self,
        Parameters(req): Parameters<ListRulesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let (token, rules) = match self.session().await {
            Ok(session) => session,
            Err(message) => return Ok(error_result(message)),
        };
        let filter = self.filter(req.kind, req.limit);
        Ok(rules_result(rules.list(&token, filter).await))
    }

    #[tool(description = "Get one rule or solution by id, with its full body.")]
    async fn get_rule(
        &self,
        Parameters(req): Parameters<GetRuleRequest>,
    ) -> Result<CallToolResult, McpError> {
        let (token, rules) = match self.session().await {
            Ok(session) => session,
            Err(message) => return Ok(error_result(message)),
        };
        match rules.get(&token, &req.id).await {
            Ok(Some(rule)) => Ok(json_result(&rule)),
            Ok(None) => Ok(error_result(format!("No rule with id '{}'.", req.id))),
            Err(e) => Ok(error_result(rules_error_message(&e))),
        }
    }

    #[tool(description = "Publish a new rule (guideline) or solution (fix to a concrete problem) owned by the signed-in user. Returns the stored entry.")]
    async fn post_rule(
        &self,
        Parameters(req): Parameters<PostRuleRequest>,
    ) -> Result<CallToolResult, McpError> {
        let payload = NewRule::from(req);
        if let Err(e) = payload.validate() {
            return Ok(error_result(e.to_string()));
        }
        let (token, rules) = match self.session().await {
            Ok(session) => session,
            Err(message) => return Ok(error_result(message)),
        };
        match rules.create(&token, &payload).await {
            Ok(rule) => Ok(json_result(&rule)),
            Err(e) => Ok(error_result(rules_error_message(&e))),
        }
    }
}

impl BitcompassServer {
    /// Fresh access token plus the rules client, or a message for the agent.
    async fn session(&self) -> Result<(String, &RulesClient), String> {
        let Some(rules) = self.rules.as_ref() else {
            return Err(
                "bitcompass backend is not configured: set BITCOMPASS_SUPABASE_URL and BITCOMPASS_SUPABASE_ANON_KEY."
                    .into(),
            );
        };
        match refresh::ensure_fresh(self.store.as_ref(), self.auth.as_ref()).await {
            Ok(creds) => Ok((creds.access_token, rules)),
            Err(AuthError::NotAuthenticated) => Err(
                "Not logged in. Ask the user to run `bitcompass login`, then retry.".into(),
            ),
            Err(e) => {
                tracing::warn!(error = %e, "session refresh failed");
                Err(format!("Could not refresh the bitcompass session: {e}"))
            }
        }
    }

    fn filter(&self, kind: Option<bitcompass_core::RuleKind>, limit: Option<u32>) -> RuleFilter {
        RuleFilter::new(kind, limit.unwrap_or(self.default_limit))
    }
}

#[tool_handler]
impl ServerHandler for BitcompassServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

fn error_result(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

fn json_result<T: serde::Serialize>(value: &T) -> CallToolResult {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CallToolResult::success(vec![Content::text(json)]),
        Err(e) => error_result(format!("Failed to serialize result: {e}")),
    }
}

fn rules_result(result: Result<Vec<Rule>, RulesError>) -> CallToolResult {
    match result {
        Ok(rules) if rules.is_empty() => {
            CallToolResult::success(vec![Content::text("No matching rules found.")])
        }
        Ok(rules) => json_result(&rules),
        Err(e) => error_result(rules_error_message(&e)),
    }
}

fn rules_error_message(error: &RulesError) -> String {
    match error {
        RulesError::Unauthorized => {
            "The bitcompass session was rejected. Ask the user to run `bitcompass login` again."
                .into()
        }
        other => other.to_string(),
    }
}
