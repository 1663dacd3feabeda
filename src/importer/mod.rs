//! Spreadsheet import of administrative boundaries and organizations.

mod admin;
mod matcher;
mod organization;
mod resolver;
mod sheet;

use calamine::{open_workbook_auto, Data, Range, Reader};
use diesel::result::Error as DieselError;
use std::path::Path;
use thiserror::Error;

use crate::error::ActionError;

pub use admin::{AdminBoundaryImporter, BoundarySummary};
pub use matcher::{ExactTextMatcher, PrefixedTextMatcher, SuffixedTextMatcher, TextMatcher};
pub use organization::{OrganizationImporter, OrganizationSummary, ORGANIZATION_COLUMNS};
pub use resolver::{Filters, Resolvable, XRefResolver};
pub use sheet::{cell_to_string, SheetReader};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Cannot read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Missing column '{0}' in header row")]
    MissingColumn(String),

    #[error(transparent)]
    Action(#[from] ActionError),
}

impl From<DieselError> for ImportError {
    fn from(err: DieselError) -> Self {
        ImportError::Action(err.into())
    }
}

pub type ImportResult<T> = Result<T, ImportError>;

/// Load one worksheet from an `.xlsx`/`.xls`/`.ods` workbook. `sheet_name`
/// is matched case-insensitively, exactly first and then as a prefix; the
/// first sheet is used when it is `None`.
pub fn read_sheet(path: impl AsRef<Path>, sheet_name: Option<&str>) -> ImportResult<Range<Data>> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();

    let name = match sheet_name {
        None => names.first().cloned(),
        Some(wanted) => {
            let exact = ExactTextMatcher.matches(&names, wanted);
            let prefixed = PrefixedTextMatcher.matches(&names, wanted);
            exact.first().or(prefixed.first()).map(|found| found.to_string())
        }
    };
    let name = name.ok_or_else(|| {
        ImportError::SheetNotFound(sheet_name.unwrap_or("<first>").to_string())
    })?;

    tracing::info!("Reading sheet '{}' from {}", name, path.display());
    Ok(workbook.worksheet_range(&name)?)
}
