//! Tool-calling adapter for conversational agents.
//!
//! - [`client`] - `reqwest` client for the pet HTTP service
//! - [`tools`] - tool catalog and human-readable replies
//! - [`stdio`] - JSON-RPC loop that exposes the tools on stdin/stdout

pub mod client;
pub mod stdio;
pub mod tools;

pub use client::PetClient;
pub use tools::{call_tool, ToolReply};
