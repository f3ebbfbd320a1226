//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`], which loads configuration once and hands every
//! command the same [`CommandContext`].

pub mod cache;
pub mod completions;
pub mod dispatcher;
pub mod locate;
pub mod symbols;

pub use dispatcher::{Command, CommandContext, CommandDispatcher, CommandResult};
