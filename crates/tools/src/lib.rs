//! USAspending research tools for spendlens.
//!
//! Each tool wraps one capability of the federal spending API: award and
//! transaction search, single-entity lookups, IDV children, spending over
//! time, and competition analysis. Tools return a typed success or a
//! [`ToolError`](spendlens_core::ToolError); the registry renders either into
//! the text payload handed back to the host.

pub mod award_details;
pub mod common;
pub mod competition;
pub mod idv_awards;
pub mod recipient_details;
pub mod search_awards;
pub mod search_new_awards;
pub mod search_recipients;
pub mod spending_over_time;

pub use common::ToolContext;

use spendlens_core::tool::ToolRegistry;
use std::sync::Arc;

/// Create a registry holding every research tool, sharing one context.
pub fn default_registry(ctx: Arc<ToolContext>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(search_awards::SearchAwardsTool::new(ctx.clone())));
    registry.register(Box::new(search_new_awards::SearchNewAwardsTool::new(
        ctx.clone(),
    )));
    registry.register(Box::new(award_details::AwardDetailsTool::new(ctx.clone())));
    registry.register(Box::new(search_recipients::SearchRecipientsTool::new(
        ctx.clone(),
    )));
    registry.register(Box::new(recipient_details::RecipientDetailsTool::new(
        ctx.clone(),
    )));
    registry.register(Box::new(idv_awards::IdvAwardsTool::new(ctx.clone())));
    registry.register(Box::new(spending_over_time::SpendingOverTimeTool::new(
        ctx.clone(),
    )));
    registry.register(Box::new(competition::CompetitionTool::new(ctx)));
    registry
}
