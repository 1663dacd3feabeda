//! Shared fixtures for integration tests

#![allow(dead_code)]

use diesel::sqlite::SqliteConnection;
use entikit::address::{NewCountry, NewState};
use entikit::db::make_session;
use entikit::logic::action::{organization_create, organization_type_create};
use entikit::{ActionContext, Country, DataDict, Organization, OrganizationType, State};

/// Fresh in-memory database with the full schema.
pub fn session() -> SqliteConnection {
    make_session(None).expect("in-memory session")
}

pub fn nigeria(conn: &mut SqliteConnection) -> (Country, State) {
    let country = NewCountry::new("NG", "Nigeria").insert(conn).unwrap();
    let state = NewState::new("AB", "Abuja", country.uuid).insert(conn).unwrap();
    (country, state)
}

/// A root type `national` and a non-root type `facility`.
pub fn org_types(conn: &mut SqliteConnection) -> (OrganizationType, OrganizationType) {
    let ctx = ActionContext::default();
    let national = organization_type_create(
        conn,
        &ctx,
        &DataDict::new()
            .with("name", "national")
            .with("title", "National")
            .with("is_root", true),
    )
    .unwrap();
    let facility = organization_type_create(
        conn,
        &ctx,
        &DataDict::new().with("name", "facility").with("title", "Facility"),
    )
    .unwrap();
    (national, facility)
}

pub fn org_data(
    code: &str,
    name: &str,
    org_type: &OrganizationType,
    parent: Option<&Organization>,
) -> DataDict {
    let mut data = DataDict::new()
        .with("code", code)
        .with("name", name)
        .with("type_id", org_type.uuid.to_string());
    if let Some(parent) = parent {
        data.insert("parent_id", parent.party.uuid.to_string());
    }
    data
}

pub fn create_org(
    conn: &mut SqliteConnection,
    code: &str,
    org_type: &OrganizationType,
    parent: Option<&Organization>,
) -> Organization {
    let name = format!("Organization {}", code);
    let data = org_data(code, &name, org_type, parent);
    organization_create(conn, &ActionContext::default(), &data).unwrap()
}
