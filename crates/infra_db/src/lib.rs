//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the ledger using SQLx: connection pooling,
//! embedded schema migrations, the ledger repository and the adapter that
//! implements the domain's store ports.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedgerAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/ledger")).await?;
//! run_migrations(&pool).await?;
//! let adapter = PostgresLedgerAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, DatabaseConfig, create_pool, create_pool_from_url, run_migrations};
pub use error::DatabaseError;
pub use repositories::LedgerRepository;
pub use adapters::PostgresLedgerAdapter;
