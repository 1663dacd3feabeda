//! Integration tests for spreadsheet imports

mod common;

use calamine::{Data, Range};
use entikit::importer::{
    read_sheet, AdminBoundaryImporter, ImportError, OrganizationImporter, XRefResolver,
};
use entikit::logic::action::person_create;
use entikit::{ActionContext, Country, DataDict, Organization, State};

use common::{org_types, session};

fn sheet(rows: &[&[&str]]) -> Range<Data> {
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(1) as u32;
    let mut range = Range::new((0, 0), (rows.len() as u32 - 1, width - 1));
    for (r, row) in rows.iter().enumerate() {
        for (c, text) in row.iter().enumerate() {
            if !text.is_empty() {
                range.set_value((r as u32, c as u32), Data::String(text.to_string()));
            }
        }
    }
    range
}

#[test]
fn test_missing_workbook() {
    let err = read_sheet("/nonexistent/boundaries.xlsx", None).unwrap_err();
    assert!(matches!(err, ImportError::Workbook(_)), "got {:?}", err);
}

#[test]
fn test_imported_states_feed_actions() {
    let mut conn = session();
    let boundaries = sheet(&[
        &["code", "name"],
        &["NG", "Nigeria"],
        &[],
        &["code", "name", "country"],
        &["KN", "Kano", "NG"],
    ]);
    AdminBoundaryImporter::new()
        .import_sheet(&mut conn, &boundaries)
        .unwrap();

    // a person's state of origin given by code, resolved to its uuid
    let mut resolver = XRefResolver::new();
    let mut data = DataDict::new().with("name", "Musa").with("state_origin_id", "KN");
    resolver
        .resolve_xref::<State>(&mut conn, &mut data, "state_origin_id", "code")
        .unwrap();
    let person = person_create(&mut conn, &data).unwrap();

    let kano: State = resolver
        .resolve_object(&mut conn, &[("code", "KN"), ("country", "NG")])
        .unwrap();
    assert_eq!(person.details.state_origin_id, Some(kano.uuid));
    let nigeria: Country = resolver.resolve_object(&mut conn, &[("code", "NG")]).unwrap();
    assert_eq!(kano.country_id, nigeria.uuid);
}

#[test]
fn test_reimporting_organizations_reports_duplicates() {
    let mut conn = session();
    org_types(&mut conn);
    let orgs = sheet(&[
        &["code", "name", "type", "parent"],
        &["NAT", "National Office", "national", ""],
        &["F01", "Clinic One", "facility", "NAT"],
    ]);

    let mut importer = OrganizationImporter::new(ActionContext::default());
    let first = importer.import_sheet(&mut conn, &orgs).unwrap();
    assert_eq!(first.created, 2);

    let mut importer = OrganizationImporter::new(ActionContext::new(true));
    let second = importer.import_sheet(&mut conn, &orgs).unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.failed, 2);
    assert_eq!(importer.errors.len(), 2);

    let national = Organization::find_by_code(&mut conn, "NAT").unwrap().unwrap();
    assert_eq!(national.children(&mut conn).unwrap().len(), 1);
}
