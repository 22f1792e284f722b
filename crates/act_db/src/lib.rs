//! Indexes every function parsed from a source tree, disambiguates
//! duplicate names via smart selection, and persists a validated on-disk
//! cache (§4.2).

mod cache;
mod database;
mod smart_select;

pub use database::{DatabaseStatistics, FunctionDatabase, PARSER_IDENTIFIER};
