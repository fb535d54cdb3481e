pub mod auth;
pub mod dispatch;
pub mod mcp;
pub mod rules;
