//! Asynchronous CSV reader with batch interface
//!
//! Streams the operations file in batches so a replay never holds the whole file.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - tokio (through the tokio-util compat layer) for file I/O
//! - Batch reading to feed the batch processor
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of converted rows
//!                  ↓
//!           csv_format module
//!           (CsvRow::convert)
//! ```

use crate::io::csv_format::CsvRow;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use std::marker::PhantomData;
use tracing::warn;

/// Asynchronous CSV reader over rows of type `C`
pub struct AsyncReader<R: AsyncRead + Unpin, C> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: usize,
    row: PhantomData<C>,
}

impl<R, C> AsyncReader<R, C>
where
    R: AsyncRead + Unpin + Send + 'static,
    C: CsvRow + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 0,
            row: PhantomData,
        }
    }

    /// Read up to `batch_size` converted rows
    ///
    /// Rows that fail to parse or convert are logged with their line number and skipped.
    ///
    /// # Returns
    ///
    /// The converted rows in file order; an empty vector once the file is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<C::Output> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.csv_reader.deserialize::<C>();

        while batch.len() < batch_size {
            let Some(row) = rows.next().await else {
                break;
            };
            self.line_num += 1;
            let line = self.line_num + 1;

            match row {
                Ok(csv_row) => match csv_row.convert() {
                    Ok(converted) => batch.push(converted),
                    Err(e) => warn!(line, error = %e, "skipping row"),
                },
                Err(e) => warn!(line, error = %e, "skipping unparsable row"),
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv_format::OpsCsvRecord;
    use crate::types::{CreditOperation, ReplayOperation};
    use futures::io::Cursor;
    use rust_decimal::Decimal;

    const HEADER: &str = "op,credit,customer,credit_type,amount,limit,term,due_date,reference,brand\n";

    fn reader(body: &str) -> AsyncReader<Cursor<Vec<u8>>, OpsCsvRecord> {
        AsyncReader::new(Cursor::new(format!("{}{}", HEADER, body).into_bytes()))
    }

    #[tokio::test]
    async fn test_read_batches_in_order() {
        let mut reader = reader(
            "payment,CC-1,,,10,,,,,\n\
             payment,CC-2,,,20,,,,,\n\
             consumption,CC-1,,,30,,,,Cafe,\n",
        );

        let first = reader.read_batch(2).await;
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].credit_number(), "CC-2");

        let second = reader.read_batch(2).await;
        assert_eq!(
            second,
            vec![ReplayOperation::Apply {
                credit_number: "CC-1".to_string(),
                operation: CreditOperation::Consumption {
                    amount: Decimal::new(30, 0),
                    merchant: "Cafe".to_string(),
                },
            }]
        );

        assert!(reader.read_batch(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_rows_are_skipped() {
        let mut reader = reader(
            "refund,CC-1,,,10,,,,,\n\
             payment,CC-1,,,,,,,,\n\
             payment,CC-1,,,5,,,,,\n",
        );

        let batch = reader.read_batch(10).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(
            batch[0],
            ReplayOperation::Apply {
                credit_number: "CC-1".to_string(),
                operation: CreditOperation::Payment {
                    amount: Decimal::new(5, 0)
                },
            }
        );
    }

    #[tokio::test]
    async fn test_whitespace_is_trimmed() {
        let mut reader = reader("  payment , CC-1 ,,, 12.5 ,,,,,\n");

        let batch = reader.read_batch(10).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].credit_number(), "CC-1");
    }

    #[tokio::test]
    async fn test_header_only() {
        let mut reader = reader("");
        assert!(reader.read_batch(10).await.is_empty());
    }
}
