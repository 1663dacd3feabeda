//! Parties (people and organizations) and their contact details.
//!
//! `parties` is the root of a joined-table hierarchy: every [`Person`] and
//! [`Organization`] owns a `parties` row plus a row in its own table sharing
//! the same uuid. Contact details live in a single table discriminated by
//! [`ContactType`].

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sqlite::{Sqlite, SqliteConnection};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::address::{AddressFields, Coordinates, CoordinatesFields};
use crate::choice;
use crate::db::GetOrCreate;
use crate::mixins::{now, Entity, Identified, SoftDelete, Timestamped};
use crate::schema::{
    contact_details, organization_types, organizations, parties, parties_contact_details, people,
};
use crate::table_entity;
use crate::types::Guid;

choice! {
    pub enum ContactType {
        EMAIL = 1,
        PHONE = 2,
    }
}

choice! {
    pub enum PartyType {
        PERSON = 1,
        ORGANIZATION = 2,
    }
}

choice! {
    pub enum Gender {
        UNKNOWN = 0,
        MALE = 1,
        FEMALE = 2,
    }
}

choice! {
    pub enum MaritalStatus {
        UNKNOWN = 0,
        SINGLE = 1,
        MARRIED = 2,
        DIVORCED = 3,
        WIDOWED = 4,
    }
}

macro_rules! timestamped_soft_delete {
    ($model:ty) => {
        impl Timestamped for $model {
            fn date_created(&self) -> NaiveDateTime {
                self.date_created
            }

            fn last_updated(&self) -> Option<NaiveDateTime> {
                self.last_updated
            }
        }

        impl SoftDelete for $model {
            fn is_deleted(&self) -> bool {
                self.deleted
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Contact details
// ---------------------------------------------------------------------------

/// An email or phone contact. `address` is set for emails; `number` and
/// `extension` for phones.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = contact_details, check_for_backend(Sqlite))]
pub struct ContactDetail {
    pub id: i32,
    pub uuid: Guid,
    pub date_created: NaiveDateTime,
    pub last_updated: Option<NaiveDateTime>,
    pub deleted: bool,
    pub usage: Option<String>,
    pub subtype: ContactType,
    pub is_confirmed: bool,
    pub is_preferred: bool,
    pub address: Option<String>,
    pub number: Option<String>,
    pub extension: Option<String>,
}

table_entity!(ContactDetail, contact_details, "ContactDetail");
timestamped_soft_delete!(ContactDetail);

impl ContactDetail {
    pub fn is_email(&self) -> bool {
        self.subtype == ContactType::EMAIL
    }

    pub fn is_phone(&self) -> bool {
        self.subtype == ContactType::PHONE
    }
}

impl fmt::Display for ContactDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.subtype, &self.address, &self.number, &self.extension) {
            (ContactType::EMAIL, Some(address), _, _) => f.write_str(address),
            (ContactType::PHONE, _, Some(number), Some(ext)) => write!(f, "{} ext {}", number, ext),
            (ContactType::PHONE, _, Some(number), None) => f.write_str(number),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = contact_details)]
pub struct NewContactDetail {
    pub uuid: Guid,
    pub date_created: NaiveDateTime,
    pub usage: Option<String>,
    pub subtype: ContactType,
    pub is_confirmed: bool,
    pub is_preferred: bool,
    pub address: Option<String>,
    pub number: Option<String>,
    pub extension: Option<String>,
}

impl NewContactDetail {
    fn blank(subtype: ContactType) -> Self {
        Self {
            uuid: Guid::new_v4(),
            date_created: now(),
            usage: None,
            subtype,
            is_confirmed: false,
            is_preferred: false,
            address: None,
            number: None,
            extension: None,
        }
    }

    pub fn email(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::blank(ContactType::EMAIL)
        }
    }

    pub fn phone(number: impl Into<String>, extension: Option<String>) -> Self {
        Self {
            number: Some(number.into()),
            extension,
            ..Self::blank(ContactType::PHONE)
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn preferred(mut self) -> Self {
        self.is_preferred = true;
        self
    }

    pub fn insert(&self, conn: &mut SqliteConnection) -> QueryResult<ContactDetail> {
        diesel::insert_into(contact_details::table)
            .values(self)
            .execute(conn)?;
        contact_details::table
            .filter(contact_details::uuid.eq(self.uuid))
            .select(ContactDetail::as_select())
            .first(conn)
    }
}

// ---------------------------------------------------------------------------
// Party
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = parties)]
pub struct Party {
    pub id: i32,
    pub uuid: Guid,
    pub date_created: NaiveDateTime,
    pub last_updated: Option<NaiveDateTime>,
    pub deleted: bool,
    pub name: String,
    pub subtype: PartyType,
    #[diesel(embed)]
    pub address: AddressFields,
}

table_entity!(Party, parties, "Party");
timestamped_soft_delete!(Party);

impl Party {
    /// Contacts linked to this party, oldest first. Soft-deleted contacts are
    /// left out.
    pub fn contacts(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<ContactDetail>> {
        contact_details::table
            .inner_join(
                parties_contact_details::table
                    .on(parties_contact_details::contact_detail_id.eq(contact_details::uuid)),
            )
            .filter(parties_contact_details::party_id.eq(self.uuid))
            .filter(contact_details::deleted.eq(false))
            .order(contact_details::id.asc())
            .select(ContactDetail::as_select())
            .load(conn)
    }

    pub fn add_contact(
        &self,
        conn: &mut SqliteConnection,
        contact: &ContactDetail,
    ) -> QueryResult<()> {
        diesel::insert_into(parties_contact_details::table)
            .values((
                parties_contact_details::party_id.eq(self.uuid),
                parties_contact_details::contact_detail_id.eq(contact.uuid),
            ))
            .execute(conn)?;
        Ok(())
    }

    /// Flag the party as deleted without removing any row.
    pub fn mark_deleted(&self, conn: &mut SqliteConnection) -> QueryResult<()> {
        diesel::update(parties::table.filter(parties::id.eq(self.id)))
            .set((parties::deleted.eq(true), parties::last_updated.eq(Some(now()))))
            .execute(conn)?;
        Ok(())
    }

    fn update_core(
        conn: &mut SqliteConnection,
        uuid: Guid,
        name: &str,
        address: &AddressFields,
    ) -> QueryResult<()> {
        diesel::update(parties::table.filter(parties::uuid.eq(uuid)))
            .set((
                parties::name.eq(name),
                parties::last_updated.eq(Some(now())),
                address,
            ))
            .execute(conn)?;
        Ok(())
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = parties)]
struct NewParty<'a> {
    uuid: Guid,
    date_created: NaiveDateTime,
    name: &'a str,
    subtype: PartyType,
    #[diesel(embed)]
    address: AddressFields,
}

impl<'a> NewParty<'a> {
    fn insert(
        conn: &mut SqliteConnection,
        subtype: PartyType,
        name: &'a str,
        address: &AddressFields,
    ) -> QueryResult<Guid> {
        let row = NewParty {
            uuid: Guid::new_v4(),
            date_created: now(),
            name,
            subtype,
            address: address.clone(),
        };
        diesel::insert_into(parties::table).values(&row).execute(conn)?;
        Ok(row.uuid)
    }
}

/// Implements the identity and timestamp traits for a party subtype by
/// delegating to its `party` field.
macro_rules! party_subtype {
    ($model:ty) => {
        impl Identified for $model {
            fn id(&self) -> i32 {
                self.party.id
            }

            fn uuid(&self) -> Guid {
                self.party.uuid
            }
        }

        impl Timestamped for $model {
            fn date_created(&self) -> NaiveDateTime {
                self.party.date_created
            }

            fn last_updated(&self) -> Option<NaiveDateTime> {
                self.party.last_updated
            }
        }

        impl SoftDelete for $model {
            fn is_deleted(&self) -> bool {
                self.party.deleted
            }
        }

        impl fmt::Display for $model {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.party, f)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Insertable, AsChangeset, Serialize, Deserialize,
)]
#[diesel(
    table_name = people,
    primary_key(uuid),
    check_for_backend(Sqlite),
    treat_none_as_null = true
)]
pub struct PersonDetails {
    pub uuid: Guid,
    pub title: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub date_born: Option<NaiveDate>,
    pub marital_status: Option<MaritalStatus>,
    pub state_origin_id: Option<Guid>,
    pub nationality_id: Option<Guid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub party: Party,
    pub details: PersonDetails,
}

party_subtype!(Person);

impl From<(Party, PersonDetails)> for Person {
    fn from((party, details): (Party, PersonDetails)) -> Self {
        Person { party, details }
    }
}

impl Person {
    pub fn first_name(&self) -> &str {
        &self.party.name
    }

    /// Overwrite every field with the values in `changes`.
    pub fn update(&self, conn: &mut SqliteConnection, changes: &NewPerson) -> QueryResult<Person> {
        let uuid = self.party.uuid;
        conn.transaction(|conn| {
            Party::update_core(conn, uuid, &changes.name, &changes.address)?;
            diesel::update(people::table.filter(people::uuid.eq(uuid)))
                .set(&changes.details(uuid))
                .execute(conn)?;
            Person::find_by_uuid(conn, &uuid)?.ok_or(DieselError::NotFound)
        })
    }
}

impl Entity for Person {
    const NAME: &'static str = "Person";

    fn find_by_id(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Self>> {
        parties::table
            .inner_join(people::table.on(people::uuid.eq(parties::uuid)))
            .filter(parties::id.eq(id))
            .select((Party::as_select(), PersonDetails::as_select()))
            .first::<(Party, PersonDetails)>(conn)
            .optional()
            .map(|found| found.map(Person::from))
    }

    fn find_by_uuid(conn: &mut SqliteConnection, uuid: &Guid) -> QueryResult<Option<Self>> {
        parties::table
            .inner_join(people::table.on(people::uuid.eq(parties::uuid)))
            .filter(parties::uuid.eq(uuid))
            .select((Party::as_select(), PersonDetails::as_select()))
            .first::<(Party, PersonDetails)>(conn)
            .optional()
            .map(|found| found.map(Person::from))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPerson {
    pub name: String,
    pub address: AddressFields,
    pub title: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub date_born: Option<NaiveDate>,
    pub marital_status: Option<MaritalStatus>,
    pub state_origin_id: Option<Guid>,
    pub nationality_id: Option<Guid>,
}

impl NewPerson {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn details(&self, uuid: Guid) -> PersonDetails {
        PersonDetails {
            uuid,
            title: self.title.clone(),
            middle_name: self.middle_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender,
            date_born: self.date_born,
            marital_status: self.marital_status,
            state_origin_id: self.state_origin_id,
            nationality_id: self.nationality_id,
        }
    }

    /// Insert the party row and the person row in one transaction.
    pub fn insert(&self, conn: &mut SqliteConnection) -> QueryResult<Person> {
        conn.transaction(|conn| {
            let uuid = NewParty::insert(conn, PartyType::PERSON, &self.name, &self.address)?;
            diesel::insert_into(people::table)
                .values(&self.details(uuid))
                .execute(conn)?;
            Person::find_by_uuid(conn, &uuid)?.ok_or(DieselError::NotFound)
        })
    }
}

// ---------------------------------------------------------------------------
// Organization types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = organization_types, check_for_backend(Sqlite))]
pub struct OrganizationType {
    pub id: i32,
    pub uuid: Guid,
    pub date_created: NaiveDateTime,
    pub last_updated: Option<NaiveDateTime>,
    pub deleted: bool,
    pub name: String,
    pub title: String,
    pub is_root: bool,
}

table_entity!(OrganizationType, organization_types, "OrganizationType");
timestamped_soft_delete!(OrganizationType);

impl OrganizationType {
    pub fn find_by_name(conn: &mut SqliteConnection, name: &str) -> QueryResult<Option<Self>> {
        organization_types::table
            .filter(organization_types::name.eq(name))
            .select(OrganizationType::as_select())
            .first(conn)
            .optional()
    }

    /// Number of types flagged as root, ignoring `except` when given.
    pub fn count_roots(conn: &mut SqliteConnection, except: Option<&Guid>) -> QueryResult<i64> {
        let mut query = organization_types::table
            .filter(organization_types::is_root.eq(true))
            .filter(organization_types::deleted.eq(false))
            .into_boxed();
        if let Some(uuid) = except {
            query = query.filter(organization_types::uuid.ne(*uuid));
        }
        query.count().get_result(conn)
    }

    pub fn organizations(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<Organization>> {
        parties::table
            .inner_join(organizations::table.on(organizations::uuid.eq(parties::uuid)))
            .filter(organizations::type_id.eq(self.uuid))
            .order(parties::id.asc())
            .select((Party::as_select(), OrganizationDetails::as_select()))
            .load::<(Party, OrganizationDetails)>(conn)
            .map(|rows| rows.into_iter().map(Organization::from).collect())
    }

    pub fn update(
        &self,
        conn: &mut SqliteConnection,
        changes: &NewOrganizationType,
    ) -> QueryResult<Self> {
        diesel::update(organization_types::table.filter(organization_types::id.eq(self.id)))
            .set((
                organization_types::name.eq(&changes.name),
                organization_types::title.eq(&changes.title),
                organization_types::is_root.eq(changes.is_root),
                organization_types::last_updated.eq(Some(now())),
            ))
            .execute(conn)?;
        OrganizationType::find_by_id(conn, self.id)?.ok_or(DieselError::NotFound)
    }

    pub fn mark_deleted(&self, conn: &mut SqliteConnection) -> QueryResult<()> {
        diesel::update(organization_types::table.filter(organization_types::id.eq(self.id)))
            .set((
                organization_types::deleted.eq(true),
                organization_types::last_updated.eq(Some(now())),
            ))
            .execute(conn)?;
        Ok(())
    }

    /// Remove the type along with every organization of that type, party rows
    /// included.
    pub fn delete(&self, conn: &mut SqliteConnection) -> QueryResult<usize> {
        let uuid = self.uuid;
        conn.transaction(|conn| {
            let members = organizations::table
                .filter(organizations::type_id.eq(uuid))
                .select(organizations::uuid);
            let removed = diesel::delete(parties::table.filter(parties::uuid.eq_any(members)))
                .execute(conn)?;
            diesel::delete(organization_types::table.filter(organization_types::uuid.eq(uuid)))
                .execute(conn)?;
            tracing::debug!("Deleted organization type {} and {} organization(s)", uuid, removed);
            Ok(removed)
        })
    }
}

impl fmt::Display for OrganizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrganizationType {
    pub name: String,
    pub title: String,
    pub is_root: bool,
}

impl NewOrganizationType {
    pub fn new(name: impl Into<String>, title: impl Into<String>, is_root: bool) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            is_root,
        }
    }

    pub fn insert(&self, conn: &mut SqliteConnection) -> QueryResult<OrganizationType> {
        let uuid = Guid::new_v4();
        diesel::insert_into(organization_types::table)
            .values((
                organization_types::uuid.eq(uuid),
                organization_types::date_created.eq(now()),
                organization_types::name.eq(&self.name),
                organization_types::title.eq(&self.title),
                organization_types::is_root.eq(self.is_root),
            ))
            .execute(conn)?;
        OrganizationType::find_by_uuid(conn, &uuid)?.ok_or(DieselError::NotFound)
    }
}

impl GetOrCreate for OrganizationType {
    type New = NewOrganizationType;

    fn get_or_create(
        conn: &mut SqliteConnection,
        instance: &NewOrganizationType,
    ) -> Result<Self, DieselError> {
        match OrganizationType::find_by_name(conn, &instance.name)? {
            Some(found) => Ok(found),
            None => instance.insert(conn),
        }
    }
}

// ---------------------------------------------------------------------------
// Organization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = organizations)]
pub struct OrganizationDetails {
    pub uuid: Guid,
    pub parent_id: Option<Guid>,
    pub code: String,
    pub short_name: Option<String>,
    pub description: Option<String>,
    pub date_established: Option<NaiveDate>,
    pub website_url: Option<String>,
    pub type_id: Guid,
    #[diesel(embed)]
    pub coordinates: CoordinatesFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub party: Party,
    pub details: OrganizationDetails,
}

party_subtype!(Organization);

impl From<(Party, OrganizationDetails)> for Organization {
    fn from((party, details): (Party, OrganizationDetails)) -> Self {
        Organization { party, details }
    }
}

impl Organization {
    pub fn code(&self) -> &str {
        &self.details.code
    }

    pub fn parent_id(&self) -> Option<Guid> {
        self.details.parent_id
    }

    pub fn coordinates(&self) -> Coordinates {
        self.details.coordinates.coordinates()
    }

    pub fn find_by_code(conn: &mut SqliteConnection, code: &str) -> QueryResult<Option<Self>> {
        parties::table
            .inner_join(organizations::table.on(organizations::uuid.eq(parties::uuid)))
            .filter(organizations::code.eq(code))
            .select((Party::as_select(), OrganizationDetails::as_select()))
            .first::<(Party, OrganizationDetails)>(conn)
            .optional()
            .map(|found| found.map(Organization::from))
    }

    pub fn org_type(&self, conn: &mut SqliteConnection) -> QueryResult<OrganizationType> {
        OrganizationType::find_by_uuid(conn, &self.details.type_id)?.ok_or(DieselError::NotFound)
    }

    pub fn parent(&self, conn: &mut SqliteConnection) -> QueryResult<Option<Organization>> {
        match self.details.parent_id {
            Some(parent_id) => Organization::find_by_uuid(conn, &parent_id),
            None => Ok(None),
        }
    }

    pub fn children(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<Organization>> {
        parties::table
            .inner_join(organizations::table.on(organizations::uuid.eq(parties::uuid)))
            .filter(organizations::parent_id.eq(self.party.uuid))
            .order(parties::id.asc())
            .select((Party::as_select(), OrganizationDetails::as_select()))
            .load::<(Party, OrganizationDetails)>(conn)
            .map(|rows| rows.into_iter().map(Organization::from).collect())
    }

    /// Number of live organizations without a parent, ignoring `except`.
    pub fn count_roots(conn: &mut SqliteConnection, except: Option<&Guid>) -> QueryResult<i64> {
        let mut query = parties::table
            .inner_join(organizations::table.on(organizations::uuid.eq(parties::uuid)))
            .filter(organizations::parent_id.is_null())
            .filter(parties::deleted.eq(false))
            .into_boxed();
        if let Some(uuid) = except {
            query = query.filter(organizations::uuid.ne(*uuid));
        }
        query.count().get_result(conn)
    }

    /// Whether making `parent` the parent of `organization` would close a
    /// loop, i.e. `parent` is `organization` itself or one of its
    /// descendants.
    pub fn creates_cycle(
        conn: &mut SqliteConnection,
        organization: &Guid,
        parent: &Guid,
    ) -> QueryResult<bool> {
        let mut visited = HashSet::new();
        let mut current = Some(*parent);
        while let Some(uuid) = current {
            if uuid == *organization {
                return Ok(true);
            }
            if !visited.insert(uuid) {
                break;
            }
            current = organizations::table
                .filter(organizations::uuid.eq(uuid))
                .select(organizations::parent_id)
                .first::<Option<Guid>>(conn)
                .optional()?
                .flatten();
        }
        Ok(false)
    }

    /// Overwrite every field with the values in `changes`.
    pub fn update(
        &self,
        conn: &mut SqliteConnection,
        changes: &NewOrganization,
    ) -> QueryResult<Organization> {
        let uuid = self.party.uuid;
        conn.transaction(|conn| {
            Party::update_core(conn, uuid, &changes.name, &changes.address)?;
            diesel::update(organizations::table.filter(organizations::uuid.eq(uuid)))
                .set((
                    organizations::parent_id.eq(changes.parent_id),
                    organizations::code.eq(&changes.code),
                    organizations::short_name.eq(&changes.short_name),
                    organizations::description.eq(&changes.description),
                    organizations::date_established.eq(changes.date_established),
                    organizations::website_url.eq(&changes.website_url),
                    organizations::type_id.eq(changes.type_id),
                    &changes.coordinates,
                ))
                .execute(conn)?;
            Organization::find_by_uuid(conn, &uuid)?.ok_or(DieselError::NotFound)
        })
    }
}

impl Entity for Organization {
    const NAME: &'static str = "Organization";

    fn find_by_id(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Self>> {
        parties::table
            .inner_join(organizations::table.on(organizations::uuid.eq(parties::uuid)))
            .filter(parties::id.eq(id))
            .select((Party::as_select(), OrganizationDetails::as_select()))
            .first::<(Party, OrganizationDetails)>(conn)
            .optional()
            .map(|found| found.map(Organization::from))
    }

    fn find_by_uuid(conn: &mut SqliteConnection, uuid: &Guid) -> QueryResult<Option<Self>> {
        parties::table
            .inner_join(organizations::table.on(organizations::uuid.eq(parties::uuid)))
            .filter(parties::uuid.eq(uuid))
            .select((Party::as_select(), OrganizationDetails::as_select()))
            .first::<(Party, OrganizationDetails)>(conn)
            .optional()
            .map(|found| found.map(Organization::from))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrganization {
    pub name: String,
    pub address: AddressFields,
    pub parent_id: Option<Guid>,
    pub code: String,
    pub short_name: Option<String>,
    pub description: Option<String>,
    pub date_established: Option<NaiveDate>,
    pub website_url: Option<String>,
    pub type_id: Guid,
    pub coordinates: CoordinatesFields,
}

impl NewOrganization {
    pub fn new(name: impl Into<String>, code: impl Into<String>, type_id: Guid) -> Self {
        Self {
            name: name.into(),
            address: AddressFields::default(),
            parent_id: None,
            code: code.into(),
            short_name: None,
            description: None,
            date_established: None,
            website_url: None,
            type_id,
            coordinates: CoordinatesFields::default(),
        }
    }

    pub fn with_parent(mut self, parent_id: Guid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Insert the party row and the organization row in one transaction.
    pub fn insert(&self, conn: &mut SqliteConnection) -> QueryResult<Organization> {
        conn.transaction(|conn| {
            let uuid = NewParty::insert(conn, PartyType::ORGANIZATION, &self.name, &self.address)?;
            let details = OrganizationDetails {
                uuid,
                parent_id: self.parent_id,
                code: self.code.clone(),
                short_name: self.short_name.clone(),
                description: self.description.clone(),
                date_established: self.date_established,
                website_url: self.website_url.clone(),
                type_id: self.type_id,
                coordinates: self.coordinates,
            };
            diesel::insert_into(organizations::table)
                .values(&details)
                .execute(conn)?;
            Organization::find_by_uuid(conn, &uuid)?.ok_or(DieselError::NotFound)
        })
    }
}
