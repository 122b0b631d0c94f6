//! SeaORM entities, value enums and field validation for the marketplace.
pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod service;
pub mod booking;
pub mod review;
pub mod contact;
pub mod login_history;
pub mod payment;
pub mod wallet;
pub mod wallet_transaction;
pub mod invoice;

#[cfg(test)]
mod tests;
