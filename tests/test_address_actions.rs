//! Integration tests for country, state and address actions

mod common;

use entikit::address::NewState;
use entikit::logic::action::{
    address_create, address_show, address_update, country_create, country_show, country_update,
    state_create, state_show, state_update,
};
use entikit::{ActionError, DataDict, GetOrCreate, Location, State};

use common::{nigeria, session};

fn validation_errors(err: ActionError) -> entikit::ErrorDict {
    match err {
        ActionError::Validation(e) => e.error_dict,
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_country_create_and_show() {
    let mut conn = session();
    let data = DataDict::new().with("code", "NG").with("name", "Nigeria");
    let country = country_create(&mut conn, &data).unwrap();
    assert_eq!(country.to_string(), "Nigeria");

    let by_id = country_show(&mut conn, &DataDict::new().with("id", country.id)).unwrap();
    let by_uuid =
        country_show(&mut conn, &DataDict::new().with("id", country.uuid.to_string())).unwrap();
    assert_eq!(by_id, country);
    assert_eq!(by_uuid, country);

    let by_numeric_string =
        country_show(&mut conn, &DataDict::new().with("id", country.id.to_string())).unwrap();
    assert_eq!(by_numeric_string.uuid, country.uuid);
}

#[test]
fn test_country_create_requires_fields() {
    let mut conn = session();
    let data = DataDict::new().with("code", "  ").with("extra", 1);
    let err = country_create(&mut conn, &data).unwrap_err();
    let errors = validation_errors(err);
    assert_eq!(errors.get("code").map(String::as_str), Some("Required"));
    assert_eq!(errors.get("name").map(String::as_str), Some("Required"));
    assert!(!errors.contains_key("extra"));
}

#[test]
fn test_duplicate_country_is_action_error() {
    let mut conn = session();
    let data = DataDict::new().with("code", "NG").with("name", "Nigeria");
    country_create(&mut conn, &data).unwrap();

    let err = country_create(&mut conn, &data).unwrap_err();
    assert!(matches!(err, ActionError::Action(_)), "got {:?}", err);
}

#[test]
fn test_show_errors() {
    let mut conn = session();

    let err = country_show(&mut conn, &DataDict::new()).unwrap_err();
    assert_eq!(validation_errors(err).get("id").map(String::as_str), Some("Missing value"));

    let err = country_show(&mut conn, &DataDict::new().with("id", 42)).unwrap_err();
    assert!(matches!(err, ActionError::NotFound(_)));

    let err = state_show(&mut conn, &DataDict::new().with("id", "not-a-uuid")).unwrap_err();
    assert!(matches!(err, ActionError::NotFound(_)));
}

#[test]
fn test_country_update() {
    let mut conn = session();
    let (country, _) = nigeria(&mut conn);

    let updated = country_update(
        &mut conn,
        &DataDict::new()
            .with("id", country.id)
            .with("code", "NG")
            .with("name", "Federal Republic of Nigeria"),
    )
    .unwrap();
    assert_eq!(updated.id, country.id);
    assert_eq!(updated.name, "Federal Republic of Nigeria");

    // validation runs before the lookup
    let err = country_update(&mut conn, &DataDict::new().with("id", 999)).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_state_create_and_update() {
    let mut conn = session();
    let (country, _) = nigeria(&mut conn);

    let state = state_create(
        &mut conn,
        &DataDict::new()
            .with("code", "KN")
            .with("name", "Kano")
            .with("country_id", country.uuid.to_string()),
    )
    .unwrap();
    assert_eq!(state.country_id, country.uuid);
    assert_eq!(state.country(&mut conn).unwrap(), country);

    let updated = state_update(
        &mut conn,
        &DataDict::new()
            .with("id", state.uuid.to_string())
            .with("code", "KN")
            .with("name", "Kano State")
            .with("country_id", country.uuid.to_string()),
    )
    .unwrap();
    assert_eq!(updated.name, "Kano State");
    assert_eq!(country.states(&mut conn).unwrap().len(), 2);
}

#[test]
fn test_state_create_with_bad_country() {
    let mut conn = session();

    let err = state_create(
        &mut conn,
        &DataDict::new().with("code", "KN").with("name", "Kano").with("country_id", "xyz"),
    )
    .unwrap_err();
    let errors = validation_errors(err);
    assert_eq!(errors.get("country_id").map(String::as_str), Some("\"xyz\" is not a valid UUID"));

    let err = state_create(
        &mut conn,
        &DataDict::new()
            .with("code", "KN")
            .with("name", "Kano")
            .with("country_id", entikit::Guid::new_v4().to_string()),
    )
    .unwrap_err();
    assert!(matches!(err, ActionError::Action(_)), "got {:?}", err);
}

#[test]
fn test_address_create_as_mixin() {
    let mut conn = session();
    let (_, state) = nigeria(&mut conn);

    let address = address_create(
        &mut conn,
        &DataDict::new()
            .with("addr_raw", "No 1 Bank Road, Bwari")
            .with("addr_street", "No 1 Bank Road")
            .with("addr_town", "Bwari")
            .with("addr_state_id", state.uuid.to_string())
            .with("postal_code", "720015"),
    )
    .unwrap();
    assert_eq!(address.state_id, Some(state.uuid));

    let location = address.location(&mut conn).unwrap();
    assert_eq!(
        address.render(location.as_ref()),
        "No 1 Bank Road, Bwari 720015, Abuja, Nigeria"
    );

    let shown = address_show(&mut conn, &DataDict::new().with("id", address.id)).unwrap();
    assert_eq!(shown, address);
}

#[test]
fn test_address_create_without_prefix() {
    let mut conn = session();

    let address = address_create(
        &mut conn,
        &DataDict::new()
            .with("is_addr_mixin", false)
            .with("raw", "1 Alu Avenue")
            .with("town", "Ikeja"),
    )
    .unwrap();
    assert_eq!(address.raw, "1 Alu Avenue");
    assert_eq!(address.town.as_deref(), Some("Ikeja"));
    assert_eq!(Location::load_opt(&mut conn, address.state_id.as_ref()).unwrap(), None);
}

#[test]
fn test_address_requires_raw_text() {
    let mut conn = session();
    let data = DataDict::new().with("addr_street", "No 1 Bank Road");
    let err = address_create(&mut conn, &data).unwrap_err();
    assert_eq!(validation_errors(err).get("addr_raw").map(String::as_str), Some("Required"));

    let err = address_create(
        &mut conn,
        &DataDict::new().with("is_addr_mixin", false).with("street", "No 1 Bank Road"),
    )
    .unwrap_err();
    assert_eq!(validation_errors(err).get("raw").map(String::as_str), Some("Required"));
}

#[test]
fn test_address_update_overwrites_fields() {
    let mut conn = session();
    let address = address_create(
        &mut conn,
        &DataDict::new()
            .with("addr_raw", "1 Alu Avenue")
            .with("addr_landmark", "Market"),
    )
    .unwrap();

    let updated = address_update(
        &mut conn,
        &DataDict::new()
            .with("id", address.uuid.to_string())
            .with("addr_raw", "2 Alu Avenue"),
    )
    .unwrap();
    assert_eq!(updated.raw, "2 Alu Avenue");
    assert_eq!(updated.landmark, None);
}

#[test]
fn test_states_may_share_a_code() {
    let mut conn = session();
    let (country, abuja) = nigeria(&mut conn);

    // only (name, country) identifies a state
    let abia = NewState::new("AB", "Abia", country.uuid).insert(&mut conn).unwrap();
    assert_ne!(abia.uuid, abuja.uuid);
    assert_eq!(country.states(&mut conn).unwrap().len(), 2);

    let again =
        State::get_or_create(&mut conn, &NewState::new("AB", "Abia", country.uuid)).unwrap();
    assert_eq!(again.uuid, abia.uuid);

    let err = NewState::new("AA", "Abia", country.uuid).insert(&mut conn).unwrap_err();
    assert!(matches!(err, diesel::result::Error::DatabaseError(..)), "got {:?}", err);
}
