//! Card and wallet checkout for bookings.
pub mod fees;
pub mod gateway;
pub mod mock;
pub mod service;
pub mod stripe;

pub use gateway::{GatewayError, PaymentGateway};
pub use service::PaymentService;
