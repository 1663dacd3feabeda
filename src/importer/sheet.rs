//! Typed cell access over a loaded worksheet.
//!
//! Rows and columns are 1-based, matching what users see in a spreadsheet.
//! Conversion problems are collected in [`SheetReader::errors`] instead of
//! aborting, so one pass reports every bad cell of a sheet.

use calamine::{Data, Range};
use chrono::NaiveDate;

use crate::types::Choice;

const TRUE_WORDS: &[&str] = &["1", "true", "t", "yes", "y"];
const FALSE_WORDS: &[&str] = &["0", "false", "f", "no", "n"];

/// Text form of a cell. Whole floats print without a fractional part, since
/// workbooks store every number as a float; text cells are kept verbatim.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{f:.0}")
            } else {
                format!("{f}")
            }
        }
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_owned(),
        Data::DateTime(dt) => format!("{dt}"),
        Data::Error(e) => format!("#ERROR: {e:?}"),
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

pub struct SheetReader<'a> {
    sheet: &'a Range<Data>,
    pub errors: Vec<String>,
}

impl<'a> SheetReader<'a> {
    pub fn new(sheet: &'a Range<Data>) -> Self {
        Self {
            sheet,
            errors: Vec::new(),
        }
    }

    /// Last populated row, 0 for an empty sheet.
    pub fn max_row(&self) -> u32 {
        self.sheet.end().map(|(row, _)| row + 1).unwrap_or(0)
    }

    /// Last populated column, 0 for an empty sheet.
    pub fn max_column(&self) -> u32 {
        self.sheet.end().map(|(_, col)| col + 1).unwrap_or(0)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn error(&mut self, row: u32, col: u32, message: impl AsRef<str>) {
        let message = format!("Row {}, column {}: {}", row, col, message.as_ref());
        tracing::debug!("{}", message);
        self.errors.push(message);
    }

    /// The non-blank cell at (`row`, `col`).
    pub fn get_cell_value(&self, row: u32, col: u32) -> Option<&'a Data> {
        if row == 0 || col == 0 {
            return None;
        }
        self.sheet
            .get_value((row - 1, col - 1))
            .filter(|cell| !is_blank(cell))
    }

    /// The cell and whether it holds anything.
    pub fn get_cell_and_found(&self, row: u32, col: u32) -> (Option<&'a Data>, bool) {
        let cell = self.get_cell_value(row, col);
        (cell, cell.is_some())
    }

    /// Trimmed text of the cell, whether it was found, and whether it is
    /// usable as text. Error cells are found but not valid.
    pub fn get_text_found_valid(&self, row: u32, col: u32) -> (String, bool, bool) {
        match self.get_cell_value(row, col) {
            None => (String::new(), false, true),
            Some(Data::Error(_)) => (String::new(), true, false),
            Some(cell) => (cell_to_string(cell).trim().to_string(), true, true),
        }
    }

    pub fn get_text_from_cell(&mut self, row: u32, col: u32) -> Option<String> {
        match self.get_text_found_valid(row, col) {
            (_, _, false) => {
                self.error(row, col, "Invalid text value");
                None
            }
            (_, false, _) => None,
            (text, true, true) => Some(text),
        }
    }

    pub fn get_required_text_from_cell(&mut self, row: u32, col: u32) -> String {
        match self.get_text_found_valid(row, col) {
            (text, true, true) => text,
            (_, false, _) => {
                self.error(row, col, "Value is required");
                String::new()
            }
            (_, true, false) => {
                self.error(row, col, "Invalid text value");
                String::new()
            }
        }
    }

    /// Numeric 0/1 cells count as booleans; text must be one of the words.
    fn parse_bool(cell: &Data) -> Option<bool> {
        match cell {
            Data::Bool(b) => Some(*b),
            Data::Int(1) => Some(true),
            Data::Int(0) => Some(false),
            Data::Float(f) if *f == 1.0 => Some(true),
            Data::Float(f) if *f == 0.0 => Some(false),
            Data::String(s) => {
                let word = s.trim().to_lowercase();
                if TRUE_WORDS.contains(&word.as_str()) {
                    Some(true)
                } else if FALSE_WORDS.contains(&word.as_str()) {
                    Some(false)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// `None` for a blank cell; unrecognized values are recorded as errors.
    pub fn get_bool_from_cell(&mut self, row: u32, col: u32) -> Option<bool> {
        let cell = self.get_cell_value(row, col)?;
        let parsed = Self::parse_bool(cell);
        if parsed.is_none() {
            self.error(row, col, format!("Invalid boolean value: {}", cell_to_string(cell)));
        }
        parsed
    }

    pub fn get_required_bool_from_cell(&mut self, row: u32, col: u32) -> Option<bool> {
        if self.get_cell_value(row, col).is_none() {
            self.error(row, col, "Value is required");
            return None;
        }
        self.get_bool_from_cell(row, col)
    }

    /// Accepts spreadsheet dates and `YYYY-MM-DD` text.
    pub fn get_date_from_cell(&mut self, row: u32, col: u32) -> Option<NaiveDate> {
        let cell = self.get_cell_value(row, col)?;
        let parsed = match cell {
            Data::DateTime(dt) => dt.as_datetime().map(|dt| dt.date()),
            Data::DateTimeIso(s) | Data::String(s) => {
                let text = s.trim();
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .or_else(|| {
                        text.get(..10)
                            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                    })
            }
            _ => None,
        };
        if parsed.is_none() {
            self.error(row, col, format!("Invalid date value: {}", cell_to_string(cell)));
        }
        parsed
    }

    /// Enumeration variant named in the cell, matched case-insensitively.
    pub fn get_enum_from_cell<E: Choice>(&mut self, row: u32, col: u32) -> Option<E> {
        let (text, found, valid) = self.get_text_found_valid(row, col);
        let choice = if found && valid {
            E::variants()
                .iter()
                .copied()
                .find(|v| v.name().eq_ignore_ascii_case(&text))
        } else {
            None
        };
        if choice.is_none() {
            self.error(row, col, format!("'{}' is not a valid {}", text, E::TYPE_NAME));
        }
        choice
    }

    /// A blank cell reads as `0.0`.
    pub fn get_float_from_cell(&mut self, row: u32, col: u32) -> Option<f64> {
        let Some(cell) = self.get_cell_value(row, col) else {
            return Some(0.0);
        };
        let parsed = match cell {
            Data::Float(f) => Some(*f),
            Data::Int(i) => Some(*i as f64),
            Data::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.error(row, col, format!("Invalid decimal value: {}", cell_to_string(cell)));
        }
        parsed
    }

    pub fn get_int_from_cell(&mut self, row: u32, col: u32) -> Option<i64> {
        let cell = self.get_cell_value(row, col)?;
        let parsed = match cell {
            Data::Int(i) => Some(*i),
            Data::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Data::String(s) => {
                let text = s.trim();
                text.parse::<i64>().ok().or_else(|| {
                    text.parse::<f64>()
                        .ok()
                        .filter(|f| f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
            _ => None,
        };
        if parsed.is_none() {
            self.error(row, col, format!("Invalid integer value: {}", cell_to_string(cell)));
        }
        parsed
    }

    /// Cell text used as a record identifier; empty when blank.
    pub fn get_id_from_cell(&self, row: u32, col: u32) -> String {
        self.get_text_found_valid(row, col).0
    }

    /// Comma separated identifiers, blanks dropped.
    pub fn get_ids_from_cell(&self, row: u32, col: u32) -> Vec<String> {
        self.get_id_from_cell(row, col)
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn is_empty_row(&self, row: u32) -> bool {
        (1..=self.max_column()).all(|col| self.get_cell_value(row, col).is_none())
    }

    /// Lowercased text of every cell in `row`, up to the last populated
    /// column.
    pub fn row_texts(&self, row: u32) -> Vec<String> {
        let mut texts: Vec<String> = (1..=self.max_column())
            .map(|col| self.get_text_found_valid(row, col).0.to_lowercase())
            .collect();
        while texts.last().is_some_and(|t| t.is_empty()) {
            texts.pop();
        }
        texts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::party::Gender;

    /// A 4x6 sheet; row 1 holds text, row 2 booleans, row 3 numbers, row 4
    /// mixed values.
    fn sample() -> Range<Data> {
        let mut range = Range::new((0, 0), (3, 5));
        range.set_value((0, 0), Data::String("  Abia ".into()));
        range.set_value((0, 1), Data::String("   ".into()));
        range.set_value((0, 2), Data::String("AB, BC,,KN".into()));

        range.set_value((1, 0), Data::Bool(true));
        range.set_value((1, 1), Data::String("No".into()));
        range.set_value((1, 2), Data::Int(1));
        range.set_value((1, 3), Data::String("maybe".into()));

        range.set_value((2, 0), Data::Float(1.0));
        range.set_value((2, 1), Data::Float(2.5));
        range.set_value((2, 2), Data::String("7".into()));
        range.set_value((2, 3), Data::String("abc".into()));

        range.set_value((3, 0), Data::String("female".into()));
        range.set_value((3, 1), Data::Int(3));
        range.set_value((3, 2), Data::String("2016-05-17".into()));
        range.set_value((3, 3), Data::String("17/05/2016".into()));
        range
    }

    #[test]
    fn test_text_cells() {
        let sheet = sample();
        let mut reader = SheetReader::new(&sheet);

        assert_eq!(reader.get_text_found_valid(1, 1), ("Abia".to_string(), true, true));
        assert_eq!(reader.get_text_found_valid(1, 2), (String::new(), false, true));
        assert_eq!(reader.get_required_text_from_cell(1, 1), "Abia");
        assert_eq!(reader.get_required_text_from_cell(1, 2), "");
        assert_eq!(reader.errors.len(), 1);

        assert_eq!(reader.get_id_from_cell(3, 1), "1");
        assert_eq!(reader.get_ids_from_cell(1, 3), vec!["AB", "BC", "KN"]);
    }

    #[test]
    fn test_bool_cells() {
        let sheet = sample();
        let mut reader = SheetReader::new(&sheet);

        assert_eq!(reader.get_bool_from_cell(2, 1), Some(true));
        assert_eq!(reader.get_bool_from_cell(2, 2), Some(false));
        assert_eq!(reader.get_bool_from_cell(2, 3), Some(true));
        assert_eq!(reader.get_bool_from_cell(2, 5), None);
        assert!(!reader.has_errors());

        assert_eq!(reader.get_bool_from_cell(2, 4), None);
        assert_eq!(reader.get_required_bool_from_cell(2, 5), None);
        assert_eq!(reader.errors.len(), 2);
    }

    #[test]
    fn test_numbers_entered_as_text() {
        let mut range = Range::new((0, 0), (0, 1));
        range.set_value((0, 0), Data::Float(1.0));
        range.set_value((0, 1), Data::String("1.0".into()));
        let mut reader = SheetReader::new(&range);

        assert_eq!(reader.get_bool_from_cell(1, 1), Some(true));
        assert_eq!(reader.get_id_from_cell(1, 1), "1");
        assert!(!reader.has_errors());

        assert_eq!(reader.get_bool_from_cell(1, 2), None);
        assert_eq!(reader.get_id_from_cell(1, 2), "1.0");
        assert_eq!(reader.get_float_from_cell(1, 2), Some(1.0));
        assert_eq!(reader.errors.len(), 1);
    }

    #[test]
    fn test_number_cells() {
        let sheet = sample();
        let mut reader = SheetReader::new(&sheet);

        assert_eq!(reader.get_float_from_cell(3, 2), Some(2.5));
        assert_eq!(reader.get_float_from_cell(3, 6), Some(0.0));
        assert_eq!(reader.get_int_from_cell(3, 1), Some(1));
        assert_eq!(reader.get_int_from_cell(3, 3), Some(7));
        assert!(!reader.has_errors());

        assert_eq!(reader.get_int_from_cell(3, 2), None);
        assert_eq!(reader.get_float_from_cell(3, 4), None);
        assert_eq!(reader.errors.len(), 2);
    }

    #[test]
    fn test_enum_and_date_cells() {
        let sheet = sample();
        let mut reader = SheetReader::new(&sheet);

        assert_eq!(reader.get_enum_from_cell::<Gender>(4, 1), Some(Gender::FEMALE));
        assert_eq!(reader.get_enum_from_cell::<Gender>(4, 2), None);
        assert_eq!(reader.get_enum_from_cell::<Gender>(4, 6), None);
        assert_eq!(reader.errors.len(), 2);
        assert!(reader.errors[0].ends_with("'3' is not a valid Gender"));

        assert_eq!(
            reader.get_date_from_cell(4, 3),
            NaiveDate::from_ymd_opt(2016, 5, 17)
        );
        assert_eq!(reader.get_date_from_cell(4, 4), None);
        assert_eq!(reader.get_date_from_cell(4, 5), None);
        assert_eq!(reader.errors.len(), 3);
    }

    #[test]
    fn test_row_helpers() {
        let mut sheet = sample();
        sheet.set_value((1, 5), Data::Empty);
        let reader = SheetReader::new(&sheet);

        assert_eq!(reader.max_row(), 4);
        assert_eq!(reader.max_column(), 6);
        assert!(!reader.is_empty_row(1));
        assert_eq!(reader.row_texts(1), vec!["abia", "", "ab, bc,,kn"]);

        let blank = Range::<Data>::new((0, 0), (1, 1));
        let reader = SheetReader::new(&blank);
        assert!(reader.is_empty_row(1));
    }
}
