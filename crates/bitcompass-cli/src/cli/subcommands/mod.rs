pub mod mcp;
pub mod rules;

pub use mcp::McpCommands;
pub use rules::RulesCommands;
