//! Wallet balances and their append-only ledger.

pub mod ledger;
pub mod service;

pub use service::{WalletBalance, WalletService};
