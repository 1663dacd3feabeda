//! Administrative boundaries and postal addresses.
//!
//! [`AddressFields`] and [`CoordinatesFields`] are column groups embedded into
//! other tables (parties, organizations) the way the standalone [`Address`]
//! model stores them.

use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sqlite::{Sqlite, SqliteConnection};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::GetOrCreate;
use crate::schema::{addresses, countries, organizations, parties, states};
use crate::table_entity;
use crate::types::Guid;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = countries, check_for_backend(Sqlite))]
pub struct Country {
    pub id: i32,
    pub uuid: Guid,
    pub code: String,
    pub name: String,
}

table_entity!(Country, countries, "Country");

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = countries)]
pub struct NewCountry {
    pub uuid: Guid,
    pub code: String,
    pub name: String,
}

impl NewCountry {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: Guid::new_v4(),
            code: code.into(),
            name: name.into(),
        }
    }

    pub fn insert(&self, conn: &mut SqliteConnection) -> QueryResult<Country> {
        diesel::insert_into(countries::table).values(self).execute(conn)?;

        // Query back to get auto-generated id
        countries::table
            .filter(countries::uuid.eq(self.uuid))
            .select(Country::as_select())
            .first(conn)
    }
}

impl Country {
    pub fn find_by_code(conn: &mut SqliteConnection, code: &str) -> QueryResult<Option<Country>> {
        countries::table
            .filter(countries::code.eq(code))
            .select(Country::as_select())
            .first(conn)
            .optional()
    }

    /// States belonging to this country, ordered by name.
    pub fn states(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<State>> {
        states::table
            .filter(states::country_id.eq(self.uuid))
            .order(states::name.asc())
            .select(State::as_select())
            .load(conn)
    }

    pub fn update(
        &self,
        conn: &mut SqliteConnection,
        code: &str,
        name: &str,
    ) -> QueryResult<Country> {
        diesel::update(countries::table.filter(countries::id.eq(self.id)))
            .set((countries::code.eq(code), countries::name.eq(name)))
            .execute(conn)?;
        countries::table
            .filter(countries::id.eq(self.id))
            .select(Country::as_select())
            .first(conn)
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl GetOrCreate for Country {
    type New = NewCountry;

    fn get_or_create(
        conn: &mut SqliteConnection,
        instance: &NewCountry,
    ) -> Result<Self, DieselError> {
        match Country::find_by_code(conn, &instance.code)? {
            Some(found) => Ok(found),
            None => instance.insert(conn),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = states, check_for_backend(Sqlite))]
pub struct State {
    pub id: i32,
    pub uuid: Guid,
    pub code: String,
    pub name: String,
    pub country_id: Guid,
}

table_entity!(State, states, "State");

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = states)]
pub struct NewState {
    pub uuid: Guid,
    pub code: String,
    pub name: String,
    pub country_id: Guid,
}

impl NewState {
    pub fn new(code: impl Into<String>, name: impl Into<String>, country_id: Guid) -> Self {
        Self {
            uuid: Guid::new_v4(),
            code: code.into(),
            name: name.into(),
            country_id,
        }
    }

    pub fn insert(&self, conn: &mut SqliteConnection) -> QueryResult<State> {
        diesel::insert_into(states::table).values(self).execute(conn)?;
        states::table
            .filter(states::uuid.eq(self.uuid))
            .select(State::as_select())
            .first(conn)
    }
}

impl State {
    pub fn country(&self, conn: &mut SqliteConnection) -> QueryResult<Country> {
        countries::table
            .filter(countries::uuid.eq(self.country_id))
            .select(Country::as_select())
            .first(conn)
    }

    /// `"State, Country"` when the country is known, otherwise the state name.
    pub fn label(&self, country: Option<&Country>) -> String {
        match country {
            Some(country) => format!("{}, {}", self.name, country.name),
            None => self.name.clone(),
        }
    }

    pub fn update(
        &self,
        conn: &mut SqliteConnection,
        code: &str,
        name: &str,
        country_id: Guid,
    ) -> QueryResult<State> {
        diesel::update(states::table.filter(states::id.eq(self.id)))
            .set((
                states::code.eq(code),
                states::name.eq(name),
                states::country_id.eq(country_id),
            ))
            .execute(conn)?;
        states::table
            .filter(states::id.eq(self.id))
            .select(State::as_select())
            .first(conn)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl GetOrCreate for State {
    type New = NewState;

    fn get_or_create(
        conn: &mut SqliteConnection,
        instance: &NewState,
    ) -> Result<Self, DieselError> {
        let existing = states::table
            .filter(states::name.eq(&instance.name))
            .filter(states::country_id.eq(instance.country_id))
            .select(State::as_select())
            .first(conn)
            .optional()?;

        match existing {
            Some(found) => Ok(found),
            None => instance.insert(conn),
        }
    }
}

/// A state together with its country, loaded to render addresses.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub state: State,
    pub country: Country,
}

impl Location {
    pub fn load(conn: &mut SqliteConnection, state_id: &Guid) -> QueryResult<Option<Location>> {
        states::table
            .inner_join(countries::table.on(countries::uuid.eq(states::country_id)))
            .filter(states::uuid.eq(state_id))
            .select((State::as_select(), Country::as_select()))
            .first::<(State, Country)>(conn)
            .optional()
            .map(|found| found.map(|(state, country)| Location { state, country }))
    }

    /// Load the location for an optional state reference.
    pub fn load_opt(
        conn: &mut SqliteConnection,
        state_id: Option<&Guid>,
    ) -> QueryResult<Option<Location>> {
        match state_id {
            Some(state_id) => Location::load(conn, state_id),
            None => Ok(None),
        }
    }
}

/// Borrowed view over the parts of an address, shared by [`Address`] and
/// [`AddressFields`].
struct AddressParts<'a> {
    raw: Option<&'a str>,
    street: Option<&'a str>,
    town: Option<&'a str>,
    landmark: Option<&'a str>,
    postal_code: Option<&'a str>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl AddressParts<'_> {
    fn render(&self, location: Option<&Location>) -> String {
        let town = [non_blank(self.town), non_blank(self.postal_code)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let state = location.map(|l| l.state.label(Some(&l.country)));

        let mut parts: Vec<String> = Vec::new();
        if let Some(street) = non_blank(self.street) {
            parts.push(street.to_string());
        }
        if !town.is_empty() {
            parts.push(town);
        }
        if let Some(state) = state {
            parts.push(state);
        }

        if parts.is_empty() {
            return self.raw.unwrap_or_default().to_string();
        }

        let mut rendered = parts.join(", ");
        if let Some(landmark) = non_blank(self.landmark) {
            rendered.push_str(&format!(" (closest landmark: {})", landmark));
        }
        rendered
    }

    fn as_dict(&self, location: Option<&Location>) -> IndexMap<String, Option<String>> {
        let own = |v: Option<&str>| v.map(str::to_string);
        let mut dict = IndexMap::new();
        dict.insert("raw".to_string(), own(self.raw));
        dict.insert("street".to_string(), own(self.street));
        dict.insert("town".to_string(), own(self.town));
        dict.insert("landmark".to_string(), own(self.landmark));
        dict.insert("postal_code".to_string(), own(self.postal_code));
        dict.insert("state".to_string(), location.map(|l| l.state.name.clone()));
        dict.insert("state_code".to_string(), location.map(|l| l.state.code.clone()));
        dict.insert("country".to_string(), location.map(|l| l.country.name.clone()));
        dict.insert("country_code".to_string(), location.map(|l| l.country.code.clone()));
        dict
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = addresses, check_for_backend(Sqlite))]
pub struct Address {
    pub id: i32,
    pub uuid: Guid,
    pub raw: String,
    pub street: Option<String>,
    pub town: Option<String>,
    pub landmark: Option<String>,
    pub postal_code: Option<String>,
    pub state_id: Option<Guid>,
}

table_entity!(Address, addresses, "Address");

/// Column values for inserting or overwriting an address.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = addresses, treat_none_as_null = true)]
pub struct NewAddress {
    pub raw: String,
    pub street: Option<String>,
    pub town: Option<String>,
    pub landmark: Option<String>,
    pub postal_code: Option<String>,
    pub state_id: Option<Guid>,
}

impl NewAddress {
    pub fn insert(&self, conn: &mut SqliteConnection) -> QueryResult<Address> {
        let uuid = Guid::new_v4();
        diesel::insert_into(addresses::table)
            .values((
                addresses::uuid.eq(uuid),
                addresses::raw.eq(&self.raw),
                addresses::street.eq(&self.street),
                addresses::town.eq(&self.town),
                addresses::landmark.eq(&self.landmark),
                addresses::postal_code.eq(&self.postal_code),
                addresses::state_id.eq(self.state_id),
            ))
            .execute(conn)?;
        addresses::table
            .filter(addresses::uuid.eq(uuid))
            .select(Address::as_select())
            .first(conn)
    }
}

impl Address {
    fn parts(&self) -> AddressParts<'_> {
        AddressParts {
            raw: Some(&self.raw),
            street: self.street.as_deref(),
            town: self.town.as_deref(),
            landmark: self.landmark.as_deref(),
            postal_code: self.postal_code.as_deref(),
        }
    }

    /// Render the address; the raw text is used only when no structured part
    /// is available.
    pub fn render(&self, location: Option<&Location>) -> String {
        self.parts().render(location)
    }

    pub fn as_dict(&self, location: Option<&Location>) -> IndexMap<String, Option<String>> {
        self.parts().as_dict(location)
    }

    pub fn location(&self, conn: &mut SqliteConnection) -> QueryResult<Option<Location>> {
        Location::load_opt(conn, self.state_id.as_ref())
    }

    /// Overwrite every address column with `changes`.
    pub fn update(
        &self,
        conn: &mut SqliteConnection,
        changes: &NewAddress,
    ) -> QueryResult<Address> {
        diesel::update(addresses::table.filter(addresses::id.eq(self.id)))
            .set(changes)
            .execute(conn)?;
        addresses::table
            .filter(addresses::id.eq(self.id))
            .select(Address::as_select())
            .first(conn)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

/// Address columns (prefixed `addr_`) embedded into a party row.
#[derive(
    Debug, Clone, Default, PartialEq, Queryable, Selectable, Insertable, AsChangeset, Serialize,
    Deserialize,
)]
#[diesel(table_name = parties, check_for_backend(Sqlite), treat_none_as_null = true)]
pub struct AddressFields {
    pub addr_raw: Option<String>,
    pub addr_street: Option<String>,
    pub addr_town: Option<String>,
    pub addr_landmark: Option<String>,
    pub addr_state_id: Option<Guid>,
    pub postal_code: Option<String>,
}

impl AddressFields {
    fn parts(&self) -> AddressParts<'_> {
        AddressParts {
            raw: self.addr_raw.as_deref(),
            street: self.addr_street.as_deref(),
            town: self.addr_town.as_deref(),
            landmark: self.addr_landmark.as_deref(),
            postal_code: self.postal_code.as_deref(),
        }
    }

    pub fn address_str(&self, location: Option<&Location>) -> String {
        self.parts().render(location)
    }

    /// Same keys as [`Address::as_dict`], without the `addr_` prefix.
    pub fn address_dict(&self, location: Option<&Location>) -> IndexMap<String, Option<String>> {
        self.parts().as_dict(location)
    }

    pub fn location(&self, conn: &mut SqliteConnection) -> QueryResult<Option<Location>> {
        Location::load_opt(conn, self.addr_state_id.as_ref())
    }
}

/// GPS position of a record: `(lng, lat, alt, error)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lng: f64,
    pub lat: f64,
    pub alt: Option<f64>,
    pub error: Option<f64>,
}

/// Coordinate columns embedded into an organization row.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Queryable, Selectable, Insertable, AsChangeset,
    Serialize, Deserialize,
)]
#[diesel(table_name = organizations, check_for_backend(Sqlite), treat_none_as_null = true)]
pub struct CoordinatesFields {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub gps_error: Option<f64>,
}

impl CoordinatesFields {
    /// Missing longitude and latitude read as 0.0.
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lng: self.longitude.unwrap_or(0.0),
            lat: self.latitude.unwrap_or(0.0),
            alt: self.altitude,
            error: self.gps_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abuja() -> Location {
        let country = Country {
            id: 1,
            uuid: Guid::new_v4(),
            code: "NG".to_string(),
            name: "Nigeria".to_string(),
        };
        let state = State {
            id: 1,
            uuid: Guid::new_v4(),
            code: "AB".to_string(),
            name: "Abuja".to_string(),
            country_id: country.uuid,
        };
        Location { state, country }
    }

    fn bank_road() -> Address {
        Address {
            id: 1,
            uuid: Guid::new_v4(),
            raw: "No 1 Bank Road, Bwari 720015, Abuja, Nigeria ::".to_string(),
            street: Some("No 1 Bank Road".to_string()),
            town: Some("Bwari".to_string()),
            landmark: Some("Bwari Post Office".to_string()),
            postal_code: Some("720015".to_string()),
            state_id: None,
        }
    }

    #[test]
    fn test_state_label() {
        let location = abuja();
        assert_eq!(location.state.label(Some(&location.country)), "Abuja, Nigeria");
        assert_eq!(location.state.label(None), "Abuja");
    }

    #[test]
    fn test_address_render_with_all_fields() {
        let location = abuja();
        assert_eq!(
            bank_road().render(Some(&location)),
            "No 1 Bank Road, Bwari 720015, Abuja, Nigeria (closest landmark: Bwari Post Office)"
        );
    }

    #[test]
    fn test_address_render_with_only_raw_field() {
        let address = Address {
            raw: "1 Alu Avenue".to_string(),
            street: None,
            town: None,
            landmark: None,
            postal_code: None,
            ..bank_road()
        };
        assert_eq!(address.to_string(), "1 Alu Avenue");
    }

    #[test]
    fn test_address_dict() {
        let location = abuja();
        let dict = bank_road().as_dict(Some(&location));

        assert_eq!(dict["street"].as_deref(), Some("No 1 Bank Road"));
        assert_eq!(dict["postal_code"].as_deref(), Some("720015"));
        assert_eq!(dict["state"].as_deref(), Some("Abuja"));
        assert_eq!(dict["state_code"].as_deref(), Some("AB"));
        assert_eq!(dict["country"].as_deref(), Some("Nigeria"));
        assert_eq!(dict["country_code"].as_deref(), Some("NG"));
    }

    #[test]
    fn test_address_fields_match_address_rendering() {
        let location = abuja();
        let fields = AddressFields {
            addr_raw: Some("raw ::".to_string()),
            addr_street: Some("No 1 Bank Road".to_string()),
            addr_town: Some("Bwari".to_string()),
            addr_landmark: Some("Bwari Post Office".to_string()),
            addr_state_id: Some(location.state.uuid),
            postal_code: Some("720015".to_string()),
        };

        assert_eq!(fields.address_str(Some(&location)), bank_road().render(Some(&location)));
        let dict = fields.address_dict(Some(&location));
        assert_eq!(dict["town"].as_deref(), Some("Bwari"));
        assert_eq!(dict["landmark"].as_deref(), Some("Bwari Post Office"));
    }

    #[test]
    fn test_coordinates() {
        let fields = CoordinatesFields {
            latitude: Some(8.5086),
            longitude: Some(11.9976),
            altitude: Some(100.0),
            gps_error: Some(2.0),
        };
        assert_eq!(
            fields.coordinates(),
            Coordinates { lng: 11.9976, lat: 8.5086, alt: Some(100.0), error: Some(2.0) }
        );

        let empty = CoordinatesFields::default().coordinates();
        assert_eq!((empty.lng, empty.lat, empty.alt, empty.error), (0.0, 0.0, None, None));
    }
}
