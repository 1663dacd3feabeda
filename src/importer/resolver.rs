//! Cached lookup of records by natural key.
//!
//! Import sheets refer to related records by code or name. The resolver turns
//! such references into records (or their uuids) and memoizes every hit under
//! a normalized key, so a sheet naming the same country a thousand times costs
//! one query. Lookups ignore case, matching the lowercased cache keys.

use convert_case::{Case, Casing};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::address::{Country, State};
use crate::error::{ActionError, ActionResult};
use crate::mixins::Identified;
use crate::party::{Organization, OrganizationDetails, OrganizationType, Party};
use crate::schema::{countries, organization_types, organizations, parties, states};
use crate::types::Guid;
use crate::value::{DataDict, FieldValue};

diesel::define_sql_function!(fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text);

/// `(field, value)` pairs a record must match.
pub type Filters<'a> = [(&'a str, &'a str)];

/// A model that can be looked up by natural-key filters.
pub trait Resolvable: Identified + Serialize + DeserializeOwned {
    /// Model name, snake-cased into cache keys.
    const MODEL: &'static str;

    /// Every record matching all `filters`.
    fn find_matching(conn: &mut SqliteConnection, filters: &Filters) -> ActionResult<Vec<Self>>;
}

fn unsupported<M: Resolvable>(field: &str) -> ActionError {
    ActionError::Action(format!("{} cannot be resolved by {}", M::MODEL, field))
}

impl Resolvable for Country {
    const MODEL: &'static str = "Country";

    fn find_matching(conn: &mut SqliteConnection, filters: &Filters) -> ActionResult<Vec<Self>> {
        let mut query = countries::table.select(Country::as_select()).into_boxed();
        for (field, value) in filters {
            query = match *field {
                "code" => query.filter(lower(countries::code).eq(lower(value.to_string()))),
                "name" => query.filter(lower(countries::name).eq(lower(value.to_string()))),
                other => return Err(unsupported::<Self>(other)),
            };
        }
        Ok(query.load(conn)?)
    }
}

impl Resolvable for State {
    const MODEL: &'static str = "State";

    /// `country` filters on the country code.
    fn find_matching(conn: &mut SqliteConnection, filters: &Filters) -> ActionResult<Vec<Self>> {
        let mut query = states::table.select(State::as_select()).into_boxed();
        for (field, value) in filters {
            query = match *field {
                "code" => query.filter(lower(states::code).eq(lower(value.to_string()))),
                "name" => query.filter(lower(states::name).eq(lower(value.to_string()))),
                "country" => query.filter(
                    states::country_id.eq_any(
                        countries::table
                            .filter(lower(countries::code).eq(lower(value.to_string())))
                            .select(countries::uuid),
                    ),
                ),
                other => return Err(unsupported::<Self>(other)),
            };
        }
        Ok(query.load(conn)?)
    }
}

impl Resolvable for OrganizationType {
    const MODEL: &'static str = "OrganizationType";

    fn find_matching(conn: &mut SqliteConnection, filters: &Filters) -> ActionResult<Vec<Self>> {
        let mut query = organization_types::table
            .select(OrganizationType::as_select())
            .into_boxed();
        for (field, value) in filters {
            query = match *field {
                "name" => {
                    query.filter(lower(organization_types::name).eq(lower(value.to_string())))
                }
                "title" => {
                    query.filter(lower(organization_types::title).eq(lower(value.to_string())))
                }
                other => return Err(unsupported::<Self>(other)),
            };
        }
        Ok(query.load(conn)?)
    }
}

impl Resolvable for Organization {
    const MODEL: &'static str = "Organization";

    fn find_matching(conn: &mut SqliteConnection, filters: &Filters) -> ActionResult<Vec<Self>> {
        let mut query = parties::table
            .inner_join(organizations::table.on(organizations::uuid.eq(parties::uuid)))
            .select((Party::as_select(), OrganizationDetails::as_select()))
            .into_boxed();
        for (field, value) in filters {
            query = match *field {
                "code" => query.filter(lower(organizations::code).eq(lower(value.to_string()))),
                "name" => query.filter(lower(parties::name).eq(lower(value.to_string()))),
                other => return Err(unsupported::<Self>(other)),
            };
        }
        let rows = query.load::<(Party, OrganizationDetails)>(conn)?;
        Ok(rows.into_iter().map(Organization::from).collect())
    }
}

/// Resolves natural-key references and caches what it finds.
#[derive(Debug, Default)]
pub struct XRefResolver {
    cache: HashMap<String, Value>,
}

impl XRefResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a lookup of `M`: the snake-cased model name (suffixed
    /// `_id` for id lookups) followed by the filters sorted by field, all
    /// lowercased. Values differing only in case share a key, as they match
    /// the same rows. `State` filtered by code `AB` and country `NG` yields
    /// `state#code=ab#country=ng`.
    pub fn generate_key<M: Resolvable>(only_id: bool, filters: &Filters) -> String {
        let mut sorted: Vec<_> = filters.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let mut key = M::MODEL.to_case(Case::Snake);
        if only_id {
            key.push_str("_id");
        }
        for (field, value) in sorted {
            key.push_str(&format!("#{}={}", field, value));
        }
        key.to_lowercase()
    }

    pub fn cached(&self, key: &str) -> Option<&Value> {
        self.cache.get(key)
    }

    /// Seed the cache, e.g. with records created during an import.
    pub fn prime(&mut self, key: impl Into<String>, value: Value) {
        self.cache.insert(key.into(), value);
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn find_one<M: Resolvable>(
        conn: &mut SqliteConnection,
        key: &str,
        filters: &Filters,
    ) -> ActionResult<M> {
        let mut found = M::find_matching(conn, filters)?;
        match found.len() {
            0 => Err(ActionError::NotFound(format!("No row was found for {}", key))),
            1 => Ok(found.remove(0)),
            _ => Err(ActionError::MultipleResults(format!(
                "Multiple rows were found for {}",
                key
            ))),
        }
    }

    /// The uuid of the single `M` matching `filters`.
    pub fn resolve_id<M: Resolvable>(
        &mut self,
        conn: &mut SqliteConnection,
        filters: &Filters,
    ) -> ActionResult<Guid> {
        let key = Self::generate_key::<M>(true, filters);
        if let Some(Value::String(cached)) = self.cache.get(&key) {
            if let Ok(uuid) = Guid::parse(cached) {
                return Ok(uuid);
            }
        }

        let uuid = Self::find_one::<M>(conn, &key, filters)?.uuid();
        tracing::trace!("Resolved {} to {}", key, uuid);
        self.cache.insert(key, Value::String(uuid.to_string()));
        Ok(uuid)
    }

    /// The single `M` matching `filters`.
    pub fn resolve_object<M: Resolvable>(
        &mut self,
        conn: &mut SqliteConnection,
        filters: &Filters,
    ) -> ActionResult<M> {
        let key = Self::generate_key::<M>(false, filters);
        if let Some(cached) = self.cache.get(&key) {
            if let Ok(found) = serde_json::from_value::<M>(cached.clone()) {
                return Ok(found);
            }
        }

        let found = Self::find_one::<M>(conn, &key, filters)?;
        let value = serde_json::to_value(&found)
            .map_err(|e| ActionError::Action(format!("Cannot cache {}: {}", key, e)))?;
        tracing::trace!("Resolved {}", key);
        self.cache.insert(key, value);
        Ok(found)
    }

    /// Replace the natural key under `data[field]` with the uuid of the `M`
    /// whose `filter_field` matches it. The uuid lands in `field` when that
    /// already names a foreign key (`*_id`), otherwise in `{field}_id` and
    /// `field` is removed. Blank references are left untouched.
    pub fn resolve_xref<M: Resolvable>(
        &mut self,
        conn: &mut SqliteConnection,
        data: &mut DataDict,
        field: &str,
        filter_field: &str,
    ) -> ActionResult<()> {
        let natural_key = match data.get(field) {
            Some(FieldValue::Null) | None => return Ok(()),
            Some(value) => value.to_string(),
        };
        if natural_key.trim().is_empty() {
            return Ok(());
        }

        let uuid = self.resolve_id::<M>(conn, &[(filter_field, natural_key.trim())])?;
        if field.ends_with("_id") {
            data.insert(field, uuid);
        } else {
            data.remove(field);
            data.insert(format!("{}_id", field), uuid);
        }
        Ok(())
    }
}
