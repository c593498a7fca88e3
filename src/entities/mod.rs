//! Entity Definitions
//!
//! Per-entity form models, field configurations and table columns.

pub mod account;
pub mod product;
pub mod supplier;
