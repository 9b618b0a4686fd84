//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod cashflow;
pub mod expenses;
pub mod forward;
pub mod inventory;

// Re-export all handlers for use in router
pub use cashflow::*;
pub use expenses::*;
pub use forward::*;
pub use inventory::*;
