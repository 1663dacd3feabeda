//! Integration tests for person, organization type and organization actions

mod common;

use chrono::NaiveDate;
use entikit::logic::action::{
    organization_create, organization_show, organization_type_create, organization_type_show,
    organization_type_update, organization_update, person_create, person_show, person_update,
};
use entikit::party::NewContactDetail;
use entikit::{
    ActionContext, ActionError, DataDict, Gender, MaritalStatus, Organization, OrganizationType,
    Timestamped,
};

use common::{create_org, nigeria, org_data, org_types, session};

fn error_for(err: ActionError, field: &str) -> String {
    match err {
        ActionError::Validation(e) => e.error_dict.get(field).cloned().unwrap_or_default(),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_person_create() {
    let mut conn = session();
    let (country, state) = nigeria(&mut conn);

    let person = person_create(
        &mut conn,
        &DataDict::new()
            .with("name", "Ada")
            .with("last_name", "Obi")
            .with("gender", "FEMALE")
            .with("marital_status", MaritalStatus::MARRIED as i64)
            .with("date_born", "1980-02-01")
            .with("nationality_id", country.uuid.to_string())
            .with("addr_raw", "Wuse II")
            .with("addr_state_id", state.uuid.to_string()),
    )
    .unwrap();

    assert_eq!(person.first_name(), "Ada");
    assert_eq!(person.details.gender, Some(Gender::FEMALE));
    assert_eq!(person.details.marital_status, Some(MaritalStatus::MARRIED));
    assert_eq!(person.details.date_born, NaiveDate::from_ymd_opt(1980, 2, 1));
    assert_eq!(person.party.address.addr_state_id, Some(state.uuid));
    assert!(person.last_updated().is_none());
}

#[test]
fn test_person_create_validation() {
    let mut conn = session();

    let err = person_create(&mut conn, &DataDict::new().with("last_name", "Obi")).unwrap_err();
    assert_eq!(error_for(err, "name"), "Required");

    let data = DataDict::new().with("name", "Ada").with("gender", "other");
    let err = person_create(&mut conn, &data).unwrap_err();
    assert_eq!(error_for(err, "gender"), "'other' is not a valid Gender");

    let data = DataDict::new().with("name", "Ada").with("date_born", "yesterday");
    let err = person_create(&mut conn, &data).unwrap_err();
    assert_eq!(error_for(err, "date_born"), "Invalid date");
}

#[test]
fn test_person_update_and_soft_delete() {
    let mut conn = session();
    let person = person_create(&mut conn, &DataDict::new().with("name", "Ada")).unwrap();

    let updated = person_update(
        &mut conn,
        &DataDict::new()
            .with("id", person.party.id)
            .with("name", "Ada")
            .with("last_name", "Eze"),
    )
    .unwrap();
    assert_eq!(updated.details.last_name.as_deref(), Some("Eze"));
    assert!(updated.last_updated().is_some());

    updated.party.mark_deleted(&mut conn).unwrap();
    let err = person_show(&mut conn, &DataDict::new().with("id", person.party.id)).unwrap_err();
    assert!(matches!(err, ActionError::NotFound(_)));
}

#[test]
fn test_single_root_type() {
    let mut conn = session();
    let (national, _) = org_types(&mut conn);
    assert_eq!(national.to_string(), "National");

    let root = DataDict::new()
        .with("name", "federal")
        .with("title", "Federal")
        .with("is_root", "yes");
    let err = organization_type_create(&mut conn, &ActionContext::default(), &root).unwrap_err();
    assert!(matches!(err, ActionError::MultipleResults(_)));

    let created = organization_type_create(&mut conn, &ActionContext::new(true), &root).unwrap();
    assert!(created.is_root);
}

#[test]
fn test_multiple_roots_when_allowed() {
    let mut conn = session();
    let (national, _) = org_types(&mut conn);
    let ctx = ActionContext::new(true);
    let first = create_org(&mut conn, "NAT", &national, None);

    let federal = organization_type_create(
        &mut conn,
        &ctx,
        &DataDict::new()
            .with("name", "federal")
            .with("title", "Federal")
            .with("is_root", true),
    )
    .unwrap();
    assert!(federal.is_root && national.is_root);

    let data = org_data("FED", "Federal Office", &federal, None);
    let second = organization_create(&mut conn, &ctx, &data).unwrap();
    assert_eq!(second.parent_id(), None);
    assert_eq!(first.parent_id(), None);

    // an existing root may be re-saved as a root as well
    let mut data = org_data("FED", "Federal Ministry", &federal, None);
    data.insert("id", second.party.id);
    let updated = organization_update(&mut conn, &ctx, &data).unwrap();
    assert_eq!(updated.party.name, "Federal Ministry");

    // the same calls are refused once multiple roots are off
    let err = organization_create(
        &mut conn,
        &ActionContext::default(),
        &org_data("STATE", "State Office", &federal, None),
    )
    .unwrap_err();
    assert!(matches!(err, ActionError::MultipleResults(_)));
}

#[test]
fn test_organization_type_update_keeps_single_root() {
    let mut conn = session();
    let (national, facility) = org_types(&mut conn);

    // re-saving the existing root is fine
    let same = organization_type_update(
        &mut conn,
        &ActionContext::default(),
        &DataDict::new()
            .with("id", national.id)
            .with("name", "national")
            .with("title", "National Office")
            .with("is_root", true),
    )
    .unwrap();
    assert_eq!(same.title, "National Office");

    let err = organization_type_update(
        &mut conn,
        &ActionContext::default(),
        &DataDict::new()
            .with("id", facility.uuid.to_string())
            .with("name", "facility")
            .with("title", "Facility")
            .with("is_root", true),
    )
    .unwrap_err();
    assert!(matches!(err, ActionError::MultipleResults(_)));

    facility.mark_deleted(&mut conn).unwrap();
    let data = DataDict::new().with("id", facility.id);
    let err = organization_type_show(&mut conn, &data).unwrap_err();
    assert!(matches!(err, ActionError::NotFound(_)));
}

#[test]
fn test_organization_hierarchy() {
    let mut conn = session();
    let (national, facility) = org_types(&mut conn);

    let root = create_org(&mut conn, "NAT", &national, None);
    assert_eq!(root.parent_id(), None);

    let clinic = create_org(&mut conn, "F01", &facility, Some(&root));
    assert_eq!(clinic.parent(&mut conn).unwrap(), Some(root.clone()));
    assert_eq!(root.children(&mut conn).unwrap(), vec![clinic.clone()]);
    assert_eq!(clinic.org_type(&mut conn).unwrap().uuid, facility.uuid);

    let data = DataDict::new().with("id", clinic.party.uuid.to_string());
    let shown = organization_show(&mut conn, &data).unwrap();
    assert_eq!(shown, clinic);
    assert_eq!(Organization::find_by_code(&mut conn, "F01").unwrap(), Some(clinic));
}

#[test]
fn test_organization_rules() {
    let mut conn = session();
    let (national, facility) = org_types(&mut conn);
    let ctx = ActionContext::default();
    create_org(&mut conn, "NAT", &national, None);

    // second parent-less organization
    let second = org_data("NAT2", "Second", &national, None);
    let err = organization_create(&mut conn, &ctx, &second).unwrap_err();
    assert!(matches!(err, ActionError::MultipleResults(_)));
    assert!(organization_create(&mut conn, &ActionContext::new(true), &second).is_ok());

    // non-root types need a parent
    let data = org_data("F01", "Clinic", &facility, None);
    let err = organization_create(&mut conn, &ctx, &data).unwrap_err();
    assert_eq!(error_for(err, "parent_id"), "Required");

    // unknown type and unknown parent
    let mut data = org_data("F01", "Clinic", &facility, None);
    data.insert("type_id", entikit::Guid::new_v4().to_string());
    let err = organization_create(&mut conn, &ctx, &data).unwrap_err();
    assert!(matches!(err, ActionError::NotFound(_)));

    let mut data = org_data("F01", "Clinic", &facility, None);
    data.insert("parent_id", entikit::Guid::new_v4().to_string());
    let err = organization_create(&mut conn, &ctx, &data).unwrap_err();
    assert!(matches!(err, ActionError::NotFound(_)));

    // website must look like a URL
    let mut data = org_data("NAT3", "Third", &national, None);
    data.insert("website_url", "not a url");
    let err = organization_create(&mut conn, &ActionContext::new(true), &data).unwrap_err();
    assert_eq!(error_for(err, "website_url"), "Must be a URL");
}

#[test]
fn test_organization_update_rejects_cycles() {
    let mut conn = session();
    let (national, facility) = org_types(&mut conn);
    let ctx = ActionContext::default();
    let root = create_org(&mut conn, "NAT", &national, None);
    let region = create_org(&mut conn, "R01", &facility, Some(&root));
    let clinic = create_org(&mut conn, "F01", &facility, Some(&region));

    let mut data = org_data("R01", "Region One", &facility, Some(&clinic));
    data.insert("id", region.party.id);
    let err = organization_update(&mut conn, &ctx, &data).unwrap_err();
    assert!(err.is_validation(), "got {:?}", err);

    let mut data = org_data("R01", "Region One", &facility, Some(&root));
    data.insert("id", region.party.id);
    data.insert("latitude", "9.05");
    let updated = organization_update(&mut conn, &ctx, &data).unwrap();
    assert_eq!(updated.party.name, "Region One");
    assert_eq!(updated.coordinates().lat, 9.05);

    // updating the root keeps it the single root
    let mut data = org_data("NAT", "National", &national, None);
    data.insert("id", root.party.uuid.to_string());
    assert!(organization_update(&mut conn, &ctx, &data).is_ok());
}

#[test]
fn test_deleting_type_removes_its_organizations() {
    let mut conn = session();
    let (national, facility) = org_types(&mut conn);
    let root = create_org(&mut conn, "NAT", &national, None);
    create_org(&mut conn, "F01", &facility, Some(&root));
    create_org(&mut conn, "F02", &facility, Some(&root));

    assert_eq!(facility.delete(&mut conn).unwrap(), 2);
    assert!(root.children(&mut conn).unwrap().is_empty());
    assert_eq!(OrganizationType::find_by_name(&mut conn, "facility").unwrap(), None);
    assert!(Organization::find_by_code(&mut conn, "NAT").unwrap().is_some());
}

#[test]
fn test_organization_contacts() {
    let mut conn = session();
    let (national, _) = org_types(&mut conn);
    let root = create_org(&mut conn, "NAT", &national, None);

    let email = NewContactDetail::email("info@example.org").preferred().insert(&mut conn).unwrap();
    let phone = NewContactDetail::phone("0801234567", Some("12".to_string()))
        .insert(&mut conn)
        .unwrap();
    root.party.add_contact(&mut conn, &email).unwrap();
    root.party.add_contact(&mut conn, &phone).unwrap();

    let contacts = root.party.contacts(&mut conn).unwrap();
    assert_eq!(contacts.len(), 2);
    assert!(contacts[0].is_email() && contacts[0].is_preferred);
    assert_eq!(contacts[1].to_string(), "0801234567 ext 12");
}
