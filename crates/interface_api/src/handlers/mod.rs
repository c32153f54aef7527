//! Request handlers

pub mod accounts;
pub mod entries;
pub mod health;
pub mod reports;
