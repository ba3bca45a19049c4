//! Guided export of patient grid data to multi-tab spreadsheets.
//!
//! The export wizard gates every download behind a data-sharing
//! confirmation, saves pending edits, waits for the server-prepared dataset
//! and splits the flattened table into one tab per column group.

pub mod config;
pub mod export;
pub mod partition;
pub mod services;
pub mod table;
pub mod wizard;
pub mod workbook;
