//! Request and response data transfer objects

pub mod accounts;
pub mod entries;
pub mod reports;
