//! Core domain types and logic.

pub mod money;
pub mod symbol;
pub mod timestamp;
pub mod transaction;
pub mod ledger;
pub mod replay;
pub mod account;
pub mod commands;
pub mod error;
