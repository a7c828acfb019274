// ABOUTME: Settlement core for confirmed feature requests
// ABOUTME: Fee math, payment collection, payout ratio negotiation, distribution

pub mod collector;
pub mod distributor;
pub mod error;
pub mod fees;
pub mod processor;
pub mod ratios;
pub mod settlement;
pub mod transactions;
pub mod types;

#[cfg(test)]
mod settlement_test;

pub use error::{ProcessorError, SettlementError, SettlementResult};
pub use processor::{PaymentProcessor, StripeProcessor};
pub use ratios::RatioStorage;
pub use settlement::SettlementService;
pub use transactions::TransactionStorage;
pub use types::*;
