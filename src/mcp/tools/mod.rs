//! MCP tool implementations organized by domain.

pub mod auth;
pub mod functionality;
pub mod incident;
pub mod product;
