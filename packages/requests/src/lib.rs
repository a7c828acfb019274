// ABOUTME: Feature request aggregate with lifecycle gating and bid ledger
// ABOUTME: Owns comments, developer membership, confirmations, and totals

pub mod error;
pub mod lifecycle;
pub mod similar;
pub mod storage;
pub mod types;


pub use error::RequestError;
pub use storage::RequestStorage;
pub use types::*;
