//! ontograph - Product ontology graph MCP server
//!
//! Products, the functionalities they expose, the components implementing
//! them, and incidents raised against functionalities, stored in Neo4j and
//! served to AI assistants over MCP.

pub mod auth;
pub mod cli;
pub mod config;
pub mod context;
pub mod data;
pub mod di;
pub mod error;
pub mod graph;
pub mod mcp;
pub mod migrations;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export FromRef at crate root for di-macros generated code
pub use di::FromRef;
