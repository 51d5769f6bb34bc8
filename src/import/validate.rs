//! Header and row validation for problem imports.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::import::{ImportError, RowError};
use crate::models::ProblemDraft;

/// Columns every import sheet must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "name",
    "description",
    "courseName",
    "lectureName",
    "codeSnippet",
    "correctLines",
    "hint",
    "reasons",
];

/// Columns that must be non-empty on every row. `description` is optional.
const REQUIRED_FIELDS: [&str; 7] = [
    "name",
    "courseName",
    "lectureName",
    "codeSnippet",
    "correctLines",
    "hint",
    "reasons",
];

/// Column positions resolved once from the header row.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    width: usize,
    positions: HashMap<&'static str, usize>,
}

impl HeaderIndex {
    /// Locate every required column. Extra columns are allowed and ignored.
    pub fn from_header(header: &[String]) -> Result<Self, ImportError> {
        let mut positions = HashMap::with_capacity(REQUIRED_COLUMNS.len());
        for column in REQUIRED_COLUMNS {
            let position = header
                .iter()
                .position(|cell| cell.trim() == column)
                .ok_or_else(|| ImportError::MissingColumn(column.to_string()))?;
            positions.insert(column, position);
        }

        Ok(Self {
            width: header.len(),
            positions,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    fn cell<'a>(&self, row: &'a [String], column: &str) -> &'a str {
        self.positions
            .get(column)
            .and_then(|&position| row.get(position))
            .map(|cell| cell.trim())
            .unwrap_or_default()
    }
}

/// One validated sheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub name: String,
    pub description: String,
    pub course_name: String,
    pub lecture_name: String,
    pub code_snippet: String,
    pub correct_lines: Vec<u32>,
    pub hint: String,
    pub reasons: Map<String, Value>,
}

impl ImportRow {
    pub fn to_draft(&self) -> ProblemDraft {
        ProblemDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            code_snippet: self.code_snippet.clone(),
            correct_lines: self.correct_lines.clone(),
            reason: self.reasons.clone(),
            hint: self.hint.clone(),
        }
    }
}

/// Check one data row against the header.
///
/// Checks run in order: width, required fields, `reasons` JSON. The first
/// failure decides the skip reason.
pub fn validate_row(row: &[String], index: &HeaderIndex) -> Result<ImportRow, RowError> {
    if row.len() != index.width() {
        return Err(RowError::ColumnCount {
            expected: index.width(),
            actual: row.len(),
        });
    }

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| index.cell(row, field).is_empty())
        .collect();
    if !missing.is_empty() {
        return Err(RowError::MissingFields(missing));
    }

    let reasons = match serde_json::from_str::<Value>(index.cell(row, "reasons")) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(RowError::ReasonsNotObject),
        Err(_) => return Err(RowError::InvalidReasons),
    };

    Ok(ImportRow {
        name: index.cell(row, "name").to_string(),
        description: index.cell(row, "description").to_string(),
        course_name: index.cell(row, "courseName").to_string(),
        lecture_name: index.cell(row, "lectureName").to_string(),
        // Keep the snippet's own indentation; only the cell edges are trimmed.
        code_snippet: index.cell(row, "codeSnippet").to_string(),
        correct_lines: parse_correct_lines(index.cell(row, "correctLines")),
        hint: index.cell(row, "hint").to_string(),
        reasons,
    })
}

/// Best-effort parse of a `"1,3,7"` cell.
///
/// Tokens that are not positive integers are dropped with a warning; a cell
/// with no usable token yields an empty list.
pub fn parse_correct_lines(raw: &str) -> Vec<u32> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| match token.parse::<u32>() {
            Ok(line) if line > 0 => Some(line),
            _ => {
                log::warn!("ignoring invalid correctLines token '{}'", token);
                None
            }
        })
        .collect()
}
