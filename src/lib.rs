// Library interface for testing

// Declare all modules
pub mod attributes;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod db;
pub mod db_mysql;
pub mod error;
pub mod grouping;
pub mod models;
pub mod queries;
pub mod relocate;
pub mod schema;
pub mod store;
pub mod summary;
pub mod transcripts;
pub mod users;

pub use error::{RelocateError, RelocateResult};
pub use store::RecordStore;
