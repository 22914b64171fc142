//! # spendlens Core
//!
//! Error definitions and the tool abstraction shared by every spendlens crate.
//!
//! ## Design Philosophy
//!
//! The seams are defined here; implementations live in their respective
//! crates. The query compiler stands alone and the fetch client depends only
//! on core and config; the tool handlers sit on top and compose both.

pub mod error;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{ClientError, ToolError};
pub use tool::{Tool, ToolCall, ToolDefinition, ToolRegistry, ToolResult};
