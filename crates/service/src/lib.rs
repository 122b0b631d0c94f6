//! Service layer for the marketplace: business rules on top of `models`.
//! - Money flows run in one database transaction with wallet rows locked.
//! - Payment processors sit behind the `payments::PaymentGateway` trait.
//! - Every fallible operation returns `errors::ServiceError`.

pub mod errors;
pub mod pagination;
pub mod auth;
pub mod users;
pub mod catalog;
pub mod bookings;
pub mod reviews;
pub mod contacts;
pub mod payments;
pub mod wallets;
pub mod invoices;
pub mod seed;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
