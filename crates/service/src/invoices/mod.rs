//! Invoices: numbering, PDF rendering and the issuing workflow.
pub mod number;
pub mod pdf;
pub mod service;

pub use service::{InvoicePage, InvoiceService};
