//! Core Kernel - Foundational types shared by the ledger crates
//!
//! This crate provides the fundamental building blocks used across the workspace:
//! - Decimal amount helpers with the balance tolerance and tax breakdowns
//! - Inclusive date ranges for period-bounded reports
//! - Strongly-typed identifiers
//! - Port error and health types for the adapter layer

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{
    Rate, TaxBreakdown, MoneyError, BALANCE_TOLERANCE, IGV_RATE, MAX_LINE_AMOUNT, round_amount,
    has_amount_precision, within_tolerance, checked_sum, AMOUNT_DECIMAL_PLACES,
};
pub use temporal::{DateRange, TemporalError};
pub use identifiers::{OwnerId, EntryId, LineId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    OperationMetadata,
};
