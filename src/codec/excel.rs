//! Excel batch encoder
//!
//! Writes a single-sheet workbook with a bold header row and auto-fitted
//! columns. Each call produces a complete `.xlsx` payload; unlike CSV the
//! outputs of successive calls are standalone workbook fragments, which
//! matches how the upstream spreadsheet library behaves when fed one batch
//! at a time.

use super::{BatchEncoder, EncodeError};
use crate::rows::Record;
use rust_xlsxwriter::{Format, Workbook};

/// Worksheet name used for every generated workbook
const SHEET_NAME: &str = "Sheet1";

/// Excel (xlsx) encoder
pub struct ExcelEncoder;

impl BatchEncoder for ExcelEncoder {
    fn content_type(&self) -> &'static str {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    }

    fn encode(&self, batch: &[Record], write_header: bool) -> Result<Vec<u8>, EncodeError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        let mut row: u32 = 0;

        if write_header {
            let bold = Format::new().set_bold();
            for (col, name) in Record::COLUMNS.iter().enumerate() {
                worksheet.write_with_format(row, col as u16, *name, &bold)?;
            }
            row += 1;
        }

        for record in batch {
            worksheet.write(row, 0, record.id)?;
            worksheet.write(row, 1, record.first_name.as_str())?;
            worksheet.write(row, 2, record.last_name.as_str())?;
            worksheet.write(row, 3, record.status.as_str())?;
            worksheet.write(row, 4, record.education.as_str())?;
            worksheet.write(row, 5, record.category.as_str())?;
            worksheet.write(row, 6, record.address.as_str())?;
            worksheet.write(row, 7, record.age)?;
            worksheet.write(row, 8, record.counter)?;
            row += 1;
        }

        worksheet.autofit();

        let bytes = workbook.save_to_buffer()?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::{RowSource, SyntheticRows};

    #[test]
    fn test_produces_zip_container() {
        let (batch, _) = SyntheticRows::new(3).next_batch(usize::MAX);
        let bytes = ExcelEncoder.encode(&batch, true).unwrap();
        // xlsx is a zip archive
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_encodes_without_header() {
        let (batch, _) = SyntheticRows::new(3).next_batch(usize::MAX);
        let bytes = ExcelEncoder.encode(&batch, false).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_empty_batch_with_header() {
        let bytes = ExcelEncoder.encode(&[], true).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
