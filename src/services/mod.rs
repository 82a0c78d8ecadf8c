// Service exports
pub mod postgres;
pub mod repository;

pub use postgres::{PostgresClient, StoreError};
pub use repository::JobRepository;
