//! Model Context Protocol (MCP) server for the product ontology.
//!
//! ## Architecture
//!
//! The server uses compile-time dependency injection via the `Context` struct.
//! The ontology manager is resolved per call using `FromRef`.
//!
//! ## Modules
//!
//! - `server`: MCP server, auth gating and the `ServerHandler` impl
//! - `tools`: Tool implementations organized by domain
//! - `resources`: Read-only resources
//! - `protocol`: Response envelopes and output formats

pub mod protocol;
pub mod resources;
pub(crate) mod server;
mod tools;

pub use server::McpServer;
