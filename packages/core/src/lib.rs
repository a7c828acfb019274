// ABOUTME: Core types and utilities for Bountyboard
// ABOUTME: Foundational package providing money, currency, and id primitives

pub mod currency;
pub mod ids;
pub mod money;

// Re-export main types
pub use currency::{convert, format_amount, Currency};
pub use ids::{generate_id, IdPrefix};
pub use money::Cents;
