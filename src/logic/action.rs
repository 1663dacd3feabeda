//! Create, show and update actions.
//!
//! Each action takes a connection and a [`DataDict`], validates the input
//! against the model's default schema and returns the persisted model or an
//! [`ActionError`].

use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};

use super::schemas;
use super::validators::{node, validate, FieldType, Schema, Validated, REQUIRED};
use crate::address::{
    Address, AddressFields, CoordinatesFields, Country, NewAddress, NewCountry, NewState, State,
};
use crate::error::{ActionError, ActionResult, ValidationError};
use crate::mixins::{Entity, SoftDelete};
use crate::party::{
    Gender, MaritalStatus, NewOrganization, NewOrganizationType, NewPerson, Organization,
    OrganizationType, Person,
};
use crate::types::{EntityRef, Guid};
use crate::value::{to_bool, DataDict};

/// Settings shared by actions that enforce organization hierarchy rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionContext {
    /// Allow more than one root organization type and more than one
    /// parent-less organization.
    pub allow_multiroot: bool,
}

impl ActionContext {
    pub fn new(allow_multiroot: bool) -> Self {
        Self { allow_multiroot }
    }
}

fn validated(schema: &Schema, data: &DataDict) -> ActionResult<Validated> {
    match validate(schema, data) {
        (data, None) => Ok(data),
        (_, Some(errors)) => Err(ValidationError::new(errors).into()),
    }
}

/// The record reference under `data["id"]`.
fn reference(data: &DataDict) -> ActionResult<EntityRef> {
    let value = match data.get("id") {
        Some(value) if !value.is_null() => value,
        _ => return Err(ValidationError::field("id", "Missing value").into()),
    };
    EntityRef::from_value(value)
        .ok_or_else(|| ActionError::NotFound(format!("Invalid reference: {}", value)))
}

fn lookup<E: Entity>(conn: &mut SqliteConnection, data: &DataDict) -> ActionResult<E> {
    let reference = reference(data)?;
    E::get(conn, &reference)?.ok_or_else(|| ActionError::not_found(E::NAME, reference))
}

/// Like [`lookup`], treating soft-deleted records as missing.
fn lookup_live<E: Entity + SoftDelete>(
    conn: &mut SqliteConnection,
    data: &DataDict,
) -> ActionResult<E> {
    let reference = reference(data)?;
    match E::get(conn, &reference)? {
        Some(found) if !found.is_deleted() => Ok(found),
        _ => Err(ActionError::not_found(E::NAME, reference)),
    }
}

/// A uuid field the schema marks as required.
fn required_uuid(data: &Validated, name: &str) -> ActionResult<Guid> {
    data.uuid(name)
        .ok_or_else(|| ValidationError::field(name, "Required").into())
}

fn address_fields(data: &Validated) -> AddressFields {
    let prefixed = |name: &str| format!("{}{}", schemas::ADDRESS_PREFIX, name);
    AddressFields {
        addr_raw: data.str(&prefixed("raw")),
        addr_street: data.str(&prefixed("street")),
        addr_town: data.str(&prefixed("town")),
        addr_landmark: data.str(&prefixed("landmark")),
        addr_state_id: data.uuid(&prefixed("state_id")),
        postal_code: data.str("postal_code"),
    }
}

fn coordinates_fields(data: &Validated) -> CoordinatesFields {
    CoordinatesFields {
        latitude: data.float("latitude"),
        longitude: data.float("longitude"),
        altitude: data.float("altitude"),
        gps_error: data.float("gps_error"),
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

pub fn country_create(conn: &mut SqliteConnection, data: &DataDict) -> ActionResult<Country> {
    let data = validated(&schemas::default_country_schema(), data)?;
    let country = NewCountry::new(data.text("code"), data.text("name")).insert(conn)?;
    tracing::debug!("Created country {} ({})", country.name, country.uuid);
    Ok(country)
}

pub fn state_create(conn: &mut SqliteConnection, data: &DataDict) -> ActionResult<State> {
    let data = validated(&schemas::default_state_schema(), data)?;
    let country_id = required_uuid(&data, "country_id")?;
    let state = NewState::new(data.text("code"), data.text("name"), country_id).insert(conn)?;
    tracing::debug!("Created state {} ({})", state.name, state.uuid);
    Ok(state)
}

fn is_addr_mixin(data: &DataDict) -> bool {
    data.get("is_addr_mixin").map(to_bool).unwrap_or(true)
}

fn new_address(data: &Validated, is_mixin: bool) -> ActionResult<NewAddress> {
    let prefix = if is_mixin { schemas::ADDRESS_PREFIX } else { "" };
    let field = |name: &str| format!("{}{}", prefix, name);
    // optional in the schema but the column is NOT NULL
    let raw = data
        .str(&field("raw"))
        .ok_or_else(|| ActionError::Validation(ValidationError::field(field("raw"), REQUIRED)))?;
    Ok(NewAddress {
        raw,
        street: data.str(&field("street")),
        town: data.str(&field("town")),
        landmark: data.str(&field("landmark")),
        postal_code: data.str("postal_code"),
        state_id: data.uuid(&field("state_id")),
    })
}

/// Create an address. Field names carry the `addr_` prefix unless
/// `data["is_addr_mixin"]` is false.
pub fn address_create(conn: &mut SqliteConnection, data: &DataDict) -> ActionResult<Address> {
    let is_mixin = is_addr_mixin(data);
    let data = validated(&schemas::default_address_schema(is_mixin), data)?;
    let address = new_address(&data, is_mixin)?.insert(conn)?;
    tracing::debug!("Created address {}", address.uuid);
    Ok(address)
}

fn new_person(data: &Validated) -> NewPerson {
    NewPerson {
        name: data.text("name"),
        address: address_fields(data),
        title: data.str("title"),
        middle_name: data.str("middle_name"),
        last_name: data.str("last_name"),
        gender: data.choice::<Gender>("gender"),
        date_born: data.date("date_born"),
        marital_status: data.choice::<MaritalStatus>("marital_status"),
        state_origin_id: data.uuid("state_origin_id"),
        nationality_id: data.uuid("nationality_id"),
    }
}

pub fn person_create(conn: &mut SqliteConnection, data: &DataDict) -> ActionResult<Person> {
    let data = validated(&schemas::default_person_schema(), data)?;
    let person = new_person(&data).insert(conn)?;
    tracing::debug!("Created person {} ({})", person.party.name, person.party.uuid);
    Ok(person)
}

fn new_organization_type(data: &Validated) -> NewOrganizationType {
    NewOrganizationType::new(
        data.text("name"),
        data.text("title"),
        data.bool("is_root").unwrap_or(false),
    )
}

/// Reject a second root type unless multiple roots are allowed.
fn check_root_type(
    conn: &mut SqliteConnection,
    ctx: &ActionContext,
    is_root: bool,
    except: Option<&Guid>,
) -> ActionResult<()> {
    if is_root && !ctx.allow_multiroot && OrganizationType::count_roots(conn, except)? > 0 {
        return Err(ActionError::MultipleResults(
            "A root organization type already exists".to_string(),
        ));
    }
    Ok(())
}

pub fn organization_type_create(
    conn: &mut SqliteConnection,
    ctx: &ActionContext,
    data: &DataDict,
) -> ActionResult<OrganizationType> {
    let data = validated(&schemas::default_organization_type_schema(), data)?;
    let new_type = new_organization_type(&data);
    check_root_type(conn, ctx, new_type.is_root, None)?;

    let org_type = new_type.insert(conn)?;
    tracing::debug!("Created organization type {} ({})", org_type.name, org_type.uuid);
    Ok(org_type)
}

/// Organization schema whose `parent_id` is optional; whether it is needed
/// depends on the organization type.
fn organization_schema() -> Schema {
    schemas::default_organization_schema(true).field(
        "parent_id",
        FieldType::Uuid,
        [node::optional(None)],
    )
}

/// Validate `data` and check the hierarchy rules for an organization that
/// is about to be stored. `existing` is the organization being updated.
fn checked_organization(
    conn: &mut SqliteConnection,
    ctx: &ActionContext,
    data: &Validated,
    existing: Option<&Guid>,
) -> ActionResult<NewOrganization> {
    let type_id = required_uuid(data, "type_id")?;
    let org_type = OrganizationType::find_by_uuid(conn, &type_id)?
        .filter(|found| !found.is_deleted())
        .ok_or_else(|| ActionError::not_found(OrganizationType::NAME, type_id))?;

    let parent_id = data.uuid("parent_id");
    match parent_id {
        None if !org_type.is_root => {
            return Err(ValidationError::field("parent_id", "Required").into());
        }
        None => {
            if !ctx.allow_multiroot && Organization::count_roots(conn, existing)? > 0 {
                return Err(ActionError::MultipleResults(
                    "A root organization already exists".to_string(),
                ));
            }
        }
        Some(parent_id) => {
            if Organization::find_by_uuid(conn, &parent_id)?.is_none() {
                return Err(ActionError::not_found(Organization::NAME, parent_id));
            }
            if let Some(uuid) = existing {
                if Organization::creates_cycle(conn, uuid, &parent_id)? {
                    return Err(ValidationError::field(
                        "parent_id",
                        "Circular dependency: parent is the organization itself or one of its descendants",
                    )
                    .into());
                }
            }
        }
    }

    Ok(NewOrganization {
        name: data.text("name"),
        address: address_fields(data),
        parent_id,
        code: data.text("code"),
        short_name: data.str("short_name"),
        description: data.str("description"),
        date_established: data.date("date_established"),
        website_url: data.str("website_url"),
        type_id: org_type.uuid,
        coordinates: coordinates_fields(data),
    })
}

/// Create an organization. Organizations of a root type need no parent; a
/// second parent-less organization is rejected unless multiple roots are
/// allowed.
pub fn organization_create(
    conn: &mut SqliteConnection,
    ctx: &ActionContext,
    data: &DataDict,
) -> ActionResult<Organization> {
    let values = validated(&organization_schema(), data)?;
    let new_org = checked_organization(conn, ctx, &values, None)?;
    let org = new_org.insert(conn)?;
    tracing::debug!("Created organization {} ({})", org.party.name, org.party.uuid);
    Ok(org)
}

// ---------------------------------------------------------------------------
// Show
// ---------------------------------------------------------------------------

pub fn country_show(conn: &mut SqliteConnection, data: &DataDict) -> ActionResult<Country> {
    lookup(conn, data)
}

pub fn state_show(conn: &mut SqliteConnection, data: &DataDict) -> ActionResult<State> {
    lookup(conn, data)
}

pub fn address_show(conn: &mut SqliteConnection, data: &DataDict) -> ActionResult<Address> {
    lookup(conn, data)
}

pub fn person_show(conn: &mut SqliteConnection, data: &DataDict) -> ActionResult<Person> {
    lookup_live(conn, data)
}

pub fn organization_type_show(
    conn: &mut SqliteConnection,
    data: &DataDict,
) -> ActionResult<OrganizationType> {
    lookup_live(conn, data)
}

pub fn organization_show(
    conn: &mut SqliteConnection,
    data: &DataDict,
) -> ActionResult<Organization> {
    lookup_live(conn, data)
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

pub fn country_update(conn: &mut SqliteConnection, data: &DataDict) -> ActionResult<Country> {
    let values = validated(&schemas::default_country_schema(), data)?;
    let country: Country = lookup(conn, data)?;
    let updated = country.update(conn, &values.text("code"), &values.text("name"))?;
    tracing::debug!("Updated country {}", updated.uuid);
    Ok(updated)
}

pub fn state_update(conn: &mut SqliteConnection, data: &DataDict) -> ActionResult<State> {
    let values = validated(&schemas::default_state_schema(), data)?;
    let state: State = lookup(conn, data)?;
    let country_id = required_uuid(&values, "country_id")?;
    let updated = state.update(conn, &values.text("code"), &values.text("name"), country_id)?;
    tracing::debug!("Updated state {}", updated.uuid);
    Ok(updated)
}

pub fn address_update(conn: &mut SqliteConnection, data: &DataDict) -> ActionResult<Address> {
    let is_mixin = is_addr_mixin(data);
    let values = validated(&schemas::default_address_schema(is_mixin), data)?;
    let address: Address = lookup(conn, data)?;
    let updated = address.update(conn, &new_address(&values, is_mixin)?)?;
    tracing::debug!("Updated address {}", updated.uuid);
    Ok(updated)
}

pub fn person_update(conn: &mut SqliteConnection, data: &DataDict) -> ActionResult<Person> {
    let values = validated(&schemas::default_person_schema(), data)?;
    let person: Person = lookup_live(conn, data)?;
    let updated = person.update(conn, &new_person(&values))?;
    tracing::debug!("Updated person {}", updated.party.uuid);
    Ok(updated)
}

pub fn organization_type_update(
    conn: &mut SqliteConnection,
    ctx: &ActionContext,
    data: &DataDict,
) -> ActionResult<OrganizationType> {
    let values = validated(&schemas::default_organization_type_schema(), data)?;
    let org_type: OrganizationType = lookup_live(conn, data)?;
    let changes = new_organization_type(&values);
    check_root_type(conn, ctx, changes.is_root, Some(&org_type.uuid))?;

    let updated = org_type.update(conn, &changes)?;
    tracing::debug!("Updated organization type {}", updated.uuid);
    Ok(updated)
}

/// Update an organization, re-checking the root rule and rejecting a parent
/// that would make the hierarchy circular.
pub fn organization_update(
    conn: &mut SqliteConnection,
    ctx: &ActionContext,
    data: &DataDict,
) -> ActionResult<Organization> {
    let values = validated(&organization_schema(), data)?;
    let org: Organization = lookup_live(conn, data)?;
    let changes = checked_organization(conn, ctx, &values, Some(&org.party.uuid))?;

    let updated = org.update(conn, &changes)?;
    tracing::debug!("Updated organization {}", updated.party.uuid);
    Ok(updated)
}
