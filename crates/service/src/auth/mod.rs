//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login, login history recording and token introspection.

pub mod device;
pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AuthService;
