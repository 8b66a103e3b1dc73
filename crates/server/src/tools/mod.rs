//! MCP tool implementations.
//!
//! This module contains all tools exposed by the subdex server.

pub mod hosts;
