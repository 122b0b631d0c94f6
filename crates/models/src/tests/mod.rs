/// Database connection and configuration tests
pub mod db_tests;

/// CRUD operations tests for the entities
pub mod crud_tests;

/// Transaction handling and constraint tests
pub mod transaction_tests;
