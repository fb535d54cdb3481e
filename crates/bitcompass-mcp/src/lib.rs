//! # bitcompass-mcp
//!
//! Model Context Protocol server over stdio. Tools let an AI agent search,
//! list, read and publish the signed-in user's rules and solutions.
//!
//! The server never prompts for credentials. When no session is stored each
//! tool returns an error result telling the agent to ask for `bitcompass login`.

pub mod requests;
mod server;

pub use server::BitcompassServer;
