//! CSV batch encoder
//!
//! One record per line, comma-delimited. Automatic header emission is
//! disabled on the underlying writer; the header record is written manually
//! so the caller controls header-once semantics across parts.

use super::{BatchEncoder, EncodeError};
use crate::rows::Record;

/// CSV encoder
pub struct CsvEncoder;

impl BatchEncoder for CsvEncoder {
    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn encode(&self, batch: &[Record], write_header: bool) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::new();
        {
            let mut writer = ::csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut buf);

            if write_header {
                writer.write_record(Record::COLUMNS)?;
            }

            for record in batch {
                writer.serialize(record)?;
            }

            writer.flush()?;
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::{RowSource, SyntheticRows};

    fn rows(n: u64) -> Vec<Record> {
        let (batch, _) = SyntheticRows::new(n).next_batch(usize::MAX);
        batch
    }

    #[test]
    fn test_header_written_once_when_requested() {
        let batch = rows(2);
        let bytes = CsvEncoder.encode(&batch, true).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,first_name,last_name,status,education,category,address,age,counter"
        );
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_no_header_when_flag_unset() {
        let batch = rows(2);
        let bytes = CsvEncoder.encode(&batch, false).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("1,"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_deterministic_output() {
        let batch = rows(5);
        let first = CsvEncoder.encode(&batch, true).unwrap();
        let second = CsvEncoder.encode(&batch, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_concatenated_batches_equal_one_shot() {
        let all = rows(10);
        let one_shot = CsvEncoder.encode(&all, true).unwrap();

        let mut concatenated = CsvEncoder.encode(&all[..4], true).unwrap();
        concatenated.extend(CsvEncoder.encode(&all[4..7], false).unwrap());
        concatenated.extend(CsvEncoder.encode(&all[7..], false).unwrap());

        assert_eq!(one_shot, concatenated);
    }

    #[test]
    fn test_empty_batch_with_header_yields_header_only() {
        let bytes = CsvEncoder.encode(&[], true).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("id,"));
    }

    #[test]
    fn test_empty_batch_without_header_yields_nothing() {
        let bytes = CsvEncoder.encode(&[], false).unwrap();
        assert!(bytes.is_empty());
    }
}
