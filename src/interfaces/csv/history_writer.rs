use crate::domain::transaction::TransactionRecord;
use crate::error::Result;
use std::io::Write;

/// Writes transaction history as CSV to any `Write` sink (e.g. Stdout, File).
pub struct HistoryWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> HistoryWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes a header row followed by one row per record, then flushes.
    pub fn write_records<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        for record in records {
            self.writer.serialize(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| err.into_error().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::TransactionStatus;
    use rust_decimal_macros::dec;

    #[test]
    fn test_writes_header_and_rows() {
        let records = vec![
            TransactionRecord {
                id: 1,
                date: "2025-03-01".to_string(),
                merchant: "Amazon".to_string(),
                amount: dec!(120.5),
                status: TransactionStatus::Success,
                current_balance: dec!(879.5),
            },
            TransactionRecord {
                id: 2,
                date: "2025-03-02".to_string(),
                merchant: "Uber, Inc".to_string(),
                amount: dec!(40),
                status: TransactionStatus::Failed,
                current_balance: dec!(879.5),
            },
        ];

        let mut writer = HistoryWriter::new(Vec::new());
        writer.write_records(&records).unwrap();
        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("id,date,merchant,amount,status,currentBalance")
        );
        assert_eq!(lines.next(), Some("1,2025-03-01,Amazon,120.5,SUCCESS,879.5"));
        assert_eq!(
            lines.next(),
            Some("2,2025-03-02,\"Uber, Inc\",40.0,FAILED,879.5")
        );
    }

    #[test]
    fn test_empty_history_writes_nothing() {
        let mut writer = HistoryWriter::new(Vec::new());
        writer.write_records(&[]).unwrap();
        assert!(writer.into_inner().unwrap().is_empty());
    }
}
