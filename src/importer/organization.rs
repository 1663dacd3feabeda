use calamine::{Data, Range};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;

use super::matcher::{ExactTextMatcher, TextMatcher};
use super::resolver::XRefResolver;
use super::sheet::SheetReader;
use super::{ImportError, ImportResult};
use crate::error::ActionResult;
use crate::logic::action::{organization_create, ActionContext};
use crate::party::{NewContactDetail, Organization, OrganizationType};
use crate::value::DataDict;

/// Header row of an organization sheet. Only `code`, `name` and `type` are
/// required; columns may come in any order.
pub const ORGANIZATION_COLUMNS: &[&str] = &[
    "code",
    "name",
    "short_name",
    "type",
    "parent",
    "email",
    "phone",
    "website",
];

const REQUIRED_COLUMNS: &[&str] = &["code", "name", "type"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrganizationSummary {
    pub created: usize,
    pub contacts: usize,
    pub failed: usize,
}

/// 1-based column of each known header.
#[derive(Debug, Default)]
struct Columns {
    positions: Vec<(&'static str, u32)>,
}

impl Columns {
    fn locate(header: &[String]) -> ImportResult<Columns> {
        let mut positions = Vec::new();
        for &column in ORGANIZATION_COLUMNS {
            let found = header
                .iter()
                .position(|text| ExactTextMatcher.is_match(text, column));
            match found {
                Some(index) => positions.push((column, index as u32 + 1)),
                None if REQUIRED_COLUMNS.contains(&column) => {
                    return Err(ImportError::MissingColumn(column.to_string()));
                }
                None => {}
            }
        }
        Ok(Columns { positions })
    }

    fn get(&self, column: &str) -> Option<u32> {
        self.positions
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, position)| *position)
    }
}

/// Creates organizations from a sheet whose first row is a header naming
/// [`ORGANIZATION_COLUMNS`]. Types are looked up by name and parents by
/// code, so parents must be listed before their children. Each row is
/// stored in its own transaction; failing rows are reported in `errors`
/// and do not stop the import.
#[derive(Debug, Default)]
pub struct OrganizationImporter {
    ctx: ActionContext,
    resolver: XRefResolver,
    pub errors: Vec<String>,
}

impl OrganizationImporter {
    pub fn new(ctx: ActionContext) -> Self {
        Self {
            ctx,
            ..Self::default()
        }
    }

    pub fn import_sheet(
        &mut self,
        conn: &mut SqliteConnection,
        sheet: &Range<Data>,
    ) -> ImportResult<OrganizationSummary> {
        let mut reader = SheetReader::new(sheet);
        let columns = Columns::locate(&reader.row_texts(1))?;
        let mut summary = OrganizationSummary::default();

        for row in 2..=reader.max_row() {
            if reader.is_empty_row(row) {
                continue;
            }

            let reported = reader.errors.len();
            let Some(data) = read_row(&mut reader, &columns, row) else {
                continue;
            };
            if reader.errors.len() > reported {
                summary.failed += 1;
                continue;
            }

            let email = optional_text(&mut reader, &columns, row, "email");
            let phone = optional_text(&mut reader, &columns, row, "phone");
            match self.store_row(conn, data, email, phone) {
                Ok(contacts) => {
                    summary.created += 1;
                    summary.contacts += contacts;
                }
                Err(err) => {
                    tracing::warn!("Row {} not imported: {}", row, err);
                    self.errors.push(format!("Row {}: {}", row, err));
                    summary.failed += 1;
                }
            }
        }

        self.errors.append(&mut reader.errors);
        tracing::info!(
            "Imported {} organization(s) with {} contact(s), {} row(s) failed",
            summary.created,
            summary.contacts,
            summary.failed
        );
        Ok(summary)
    }

    /// Create one organization with its contacts; returns the number of
    /// contacts attached.
    fn store_row(
        &mut self,
        conn: &mut SqliteConnection,
        mut data: DataDict,
        email: Option<String>,
        phone: Option<String>,
    ) -> ActionResult<usize> {
        let ctx = self.ctx;
        let resolver = &mut self.resolver;
        conn.transaction(|conn| {
            resolver.resolve_xref::<OrganizationType>(conn, &mut data, "type_id", "name")?;
            resolver.resolve_xref::<Organization>(conn, &mut data, "parent_id", "code")?;
            let org = organization_create(conn, &ctx, &data)?;

            let mut contacts = Vec::new();
            if let Some(address) = email {
                contacts.push(NewContactDetail::email(address).preferred());
            }
            if let Some(number) = phone {
                contacts.push(NewContactDetail::phone(number, None));
            }
            for contact in &contacts {
                let stored = contact.insert(conn)?;
                org.party.add_contact(conn, &stored)?;
            }
            Ok(contacts.len())
        })
    }
}

fn optional_text(
    reader: &mut SheetReader<'_>,
    columns: &Columns,
    row: u32,
    column: &str,
) -> Option<String> {
    columns
        .get(column)
        .and_then(|col| reader.get_text_from_cell(row, col))
}

/// The action input for `row`, with type and parent still as natural keys.
fn read_row(reader: &mut SheetReader<'_>, columns: &Columns, row: u32) -> Option<DataDict> {
    let mut data = DataDict::new();
    for (column, field) in [("code", "code"), ("name", "name"), ("type", "type_id")] {
        let col = columns.get(column)?;
        data.insert(field, reader.get_required_text_from_cell(row, col));
    }
    for (column, field) in [
        ("short_name", "short_name"),
        ("parent", "parent_id"),
        ("website", "website_url"),
    ] {
        if let Some(text) = optional_text(reader, columns, row, column) {
            data.insert(field, text);
        }
    }
    Some(data)
}
