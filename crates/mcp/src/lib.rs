// MCP (Model Context Protocol) server exposing BCRP time series
// to agent clients over stdio

pub mod config;
pub mod prompts;
pub mod protocol;
pub mod server;
pub mod tools;

pub use server::McpServer;
