//! I/O module
//!
//! Handles CSV parsing and output for the replay driver.
//!
//! # Components
//!
//! - `csv_format` - Row types, row conversion, credit output serialization
//! - `sync_reader` - Synchronous reader for the customers and accounts files
//! - `async_reader` - Asynchronous batch reader for the operations file

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{
    convert_ops_record, write_credits_csv, AccountCsvRecord, CsvRow, CustomerCsvRecord,
    OpsCsvRecord,
};
pub use sync_reader::SyncReader;
