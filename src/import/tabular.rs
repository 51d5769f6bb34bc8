//! Delimited-text parsing for spreadsheet exports.

use csv::{ReaderBuilder, Trim};

use crate::import::ImportError;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// One parsed record with its position in the source sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based sheet row; the header is row 1. Padding rows count too, so the
    /// number matches what the spreadsheet shows.
    pub number: usize,
    pub cells: Vec<String>,
}

/// Parse a raw CSV export into rows of trimmed cells. The first row is the header.
///
/// Input must be UTF-8. Lines whose cells are all blank (spreadsheet exports
/// pad the sheet with `,,,,` rows) are dropped but keep their row number.
/// Rows may differ in length; the row validator reports that per row. Invalid
/// UTF-8 or a quoted field that never closes fails the whole parse.
pub fn parse_rows(raw: &[u8]) -> Result<Vec<SheetRow>, ImportError> {
    let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
    check_quotes_closed(raw)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(raw);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|err| ImportError::Parse(err.to_string()))?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(SheetRow {
            number: index + 1,
            cells: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(rows)
}

/// The csv reader silently closes a quoted field at end of input, swallowing
/// every later row into one cell. Walk the input with the same quoting rules
/// (a quote opens only at the start of a field, `""` is a literal quote) and
/// reject input that ends inside quotes.
fn check_quotes_closed(raw: &[u8]) -> Result<(), ImportError> {
    let mut line = 1;
    let mut open_since = None;
    let mut field_start = true;
    let mut bytes = raw.iter().copied().peekable();

    while let Some(byte) = bytes.next() {
        if byte == b'\n' {
            line += 1;
        }

        if open_since.is_some() {
            if byte == b'"' {
                if bytes.peek() == Some(&b'"') {
                    bytes.next();
                } else {
                    open_since = None;
                }
            }
            continue;
        }

        match byte {
            b'"' if field_start => {
                open_since = Some(line);
                field_start = false;
            }
            b',' | b'\n' | b'\r' => field_start = true,
            _ => field_start = false,
        }
    }

    match open_since {
        Some(line) => Err(ImportError::Parse(format!(
            "unterminated quoted field starting on line {}",
            line
        ))),
        None => Ok(()),
    }
}
