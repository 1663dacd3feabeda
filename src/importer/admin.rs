use calamine::{Data, Range};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;

use super::resolver::XRefResolver;
use super::sheet::SheetReader;
use super::ImportResult;
use crate::address::{Country, NewCountry, NewState, State};
use crate::db::GetOrCreate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Countries,
    States,
    /// Countries listed after states.
    Skipped,
    Unknown,
}

impl Section {
    fn from_header(header: &[String], seen_states: bool) -> Section {
        let header: Vec<&str> = header.iter().map(String::as_str).collect();
        match header.as_slice() {
            ["code", "name"] if seen_states => Section::Skipped,
            ["code", "name"] => Section::Countries,
            ["code", "name", "country"] => Section::States,
            _ => Section::Unknown,
        }
    }
}

/// Rows stored or skipped by an [`AdminBoundaryImporter`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoundarySummary {
    pub countries: usize,
    pub states: usize,
    pub skipped: usize,
}

/// Imports countries and states from a sheet of blank-row separated
/// sections. Each section opens with a header row: `code, name` for
/// countries or `code, name, country` for states, where `country` is a
/// country code.
#[derive(Debug, Default)]
pub struct AdminBoundaryImporter {
    resolver: XRefResolver,
    pub errors: Vec<String>,
}

impl AdminBoundaryImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import every section of `sheet` in one transaction. Existing records
    /// are reused. A state whose country cannot be resolved aborts the
    /// import and nothing is stored.
    pub fn import_sheet(
        &mut self,
        conn: &mut SqliteConnection,
        sheet: &Range<Data>,
    ) -> ImportResult<BoundarySummary> {
        let summary = conn.transaction(|conn| self.import_rows(conn, sheet))?;
        tracing::info!(
            "Imported {} country(ies) and {} state(s), skipped {} row(s)",
            summary.countries,
            summary.states,
            summary.skipped
        );
        Ok(summary)
    }

    fn import_rows(
        &mut self,
        conn: &mut SqliteConnection,
        sheet: &Range<Data>,
    ) -> ImportResult<BoundarySummary> {
        let mut reader = SheetReader::new(sheet);
        let mut summary = BoundarySummary::default();
        let mut section = None;
        let mut seen_states = false;

        for row in 1..=reader.max_row() {
            if reader.is_empty_row(row) {
                section = None;
                continue;
            }

            let Some(current) = section else {
                let header = reader.row_texts(row);
                let opened = Section::from_header(&header, seen_states);
                match opened {
                    Section::States => seen_states = true,
                    Section::Skipped => tracing::info!("Skipping countries section at row {}", row),
                    Section::Unknown => self
                        .errors
                        .push(format!("Row {}: unrecognized section header {:?}", row, header)),
                    Section::Countries => {}
                }
                section = Some(opened);
                continue;
            };

            match current {
                Section::Countries => {
                    let code = reader.get_required_text_from_cell(row, 1);
                    let name = reader.get_required_text_from_cell(row, 2);
                    if code.is_empty() || name.is_empty() {
                        continue;
                    }
                    Country::get_or_create(conn, &NewCountry::new(code, name))?;
                    summary.countries += 1;
                }
                Section::States => {
                    let code = reader.get_required_text_from_cell(row, 1);
                    let name = reader.get_required_text_from_cell(row, 2);
                    let country = reader.get_required_text_from_cell(row, 3);
                    if code.is_empty() || name.is_empty() || country.is_empty() {
                        continue;
                    }
                    let country_id = self
                        .resolver
                        .resolve_id::<Country>(conn, &[("code", country.as_str())])?;
                    State::get_or_create(conn, &NewState::new(code, name, country_id))?;
                    summary.states += 1;
                }
                Section::Skipped | Section::Unknown => summary.skipped += 1,
            }
        }

        self.errors.append(&mut reader.errors);
        Ok(summary)
    }
}
