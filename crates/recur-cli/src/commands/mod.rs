//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config loading, store opening, pattern lookup)
//! - `detect` - Pattern detection from an expense file
//! - `patterns` - Pattern listing and lifecycle commands (confirm, dismiss, advance)
//! - `upcoming` - Upcoming expense projection
//! - `config` - Effective config display

pub mod config;
pub mod core;
pub mod detect;
pub mod patterns;
pub mod upcoming;

// Re-export command functions for main.rs
pub use config::*;
pub use core::*;
pub use detect::*;
pub use patterns::*;
pub use upcoming::*;

/// Output mode shared by listing commands
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json: bool,
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
