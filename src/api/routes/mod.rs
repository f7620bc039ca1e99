//! API Routes
//!
//! Route handlers organized by functionality.

pub mod health;
pub mod nodes;
pub mod reveal;
pub mod search;
