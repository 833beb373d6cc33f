//! Core domain types and logic.

pub mod account;
pub mod audit;
pub mod error;
pub mod metrics;
pub mod risk;
pub mod rules;
pub mod summary;
pub mod trade;
