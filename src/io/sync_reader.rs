//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over the rows of a small reference file (customers,
//! accounts). Delegates row conversion to the csv_format module.
//!
//! # Design
//!
//! The SyncReader uses csv::Reader to read and deserialize rows sequentially. It is generic
//! over the row type, so one reader serves every file whose row implements [`CsvRow`].
//!
//! ```no_run
//! use credit_engine::io::csv_format::CustomerCsvRecord;
//! use credit_engine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::<CustomerCsvRecord>::new(Path::new("customers.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok((id, customer_type)) => println!("{}: {}", id, customer_type),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row errors are yielded as Err variants with their line number

use crate::io::csv_format::CsvRow;
use crate::types::CreditError;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::Path;

/// Synchronous CSV reader over rows of type `C`
#[derive(Debug)]
pub struct SyncReader<C> {
    reader: csv::Reader<File>,
    line_num: usize,
    row: PhantomData<C>,
}

impl<C: CsvRow> SyncReader<C> {
    /// Open a CSV file for streaming iteration
    ///
    /// The reader trims whitespace from all fields and tolerates short rows.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the path does not exist and `IoError` for any other
    /// open failure.
    pub fn new(path: &Path) -> Result<Self, CreditError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CreditError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => CreditError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), e),
            },
        })?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
            row: PhantomData,
        })
    }
}

impl<C: CsvRow> Iterator for SyncReader<C> {
    type Item = Result<C::Output, String>;

    /// Next converted row, with the line number in any error
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<C>();
        let row = deserializer.next()?;
        self.line_num += 1;

        // Header is line 1
        let line = self.line_num + 1;
        Some(match row {
            Ok(csv_row) => csv_row.convert().map_err(|e| format!("Line {}: {}", line, e)),
            Err(e) => Err(format!("Line {}: CSV parse error: {}", line, e)),
        })
    }
}
