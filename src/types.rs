//! Column types shared by the models: text-stored UUIDs, integer-stored
//! enumerations and id-or-uuid record references.

use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::value::FieldValue;

/// A globally unique identifier persisted as its hyphenated text form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    AsExpression,
    FromSqlRow,
    Serialize,
    Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(transparent)]
pub struct Guid(pub Uuid);

impl Guid {
    pub fn new_v4() -> Self {
        Guid(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(value.trim()).map(Guid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Guid {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Guid::parse(s)
    }
}

impl From<Uuid> for Guid {
    fn from(value: Uuid) -> Self {
        Guid(value)
    }
}

impl From<Guid> for FieldValue {
    fn from(value: Guid) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl ToSql<Text, Sqlite> for Guid {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.to_string());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for Guid {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        Ok(Guid::parse(&text)?)
    }
}

/// An enumeration stored as its integer value and addressed by variant name
/// in data dictionaries.
pub trait Choice: Copy + Sized + 'static {
    /// Name of the enumeration, used in error messages.
    const TYPE_NAME: &'static str;

    fn variants() -> &'static [Self];
    fn value(self) -> i32;
    fn name(self) -> &'static str;

    fn from_value(value: i32) -> Option<Self> {
        Self::variants().iter().copied().find(|v| v.value() == value)
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::variants().iter().copied().find(|v| v.name() == name)
    }

    /// `(name, value)` pairs in declaration order.
    fn pairs() -> Vec<(&'static str, i32)> {
        Self::variants().iter().map(|v| (v.name(), v.value())).collect()
    }
}

/// Declares an integer-backed enumeration usable as a Diesel column type.
///
/// ```ignore
/// choice! {
///     pub enum Gender {
///         UNKNOWN = 0,
///         MALE = 1,
///         FEMALE = 2,
///     }
/// }
/// ```
#[macro_export]
macro_rules! choice {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[allow(non_camel_case_types, clippy::upper_case_acronyms)]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            ::diesel::expression::AsExpression, ::diesel::deserialize::FromSqlRow,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[diesel(sql_type = ::diesel::sql_types::Integer)]
        $vis enum $name {
            $($variant = $value),+
        }

        impl $crate::types::Choice for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn variants() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn value(self) -> i32 {
                self as i32
            }

            fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::types::Choice::name(*self))
            }
        }

        impl ::diesel::serialize::ToSql<::diesel::sql_types::Integer, ::diesel::sqlite::Sqlite> for $name {
            fn to_sql<'b>(
                &'b self,
                out: &mut ::diesel::serialize::Output<'b, '_, ::diesel::sqlite::Sqlite>,
            ) -> ::diesel::serialize::Result {
                out.set_value(*self as i32);
                Ok(::diesel::serialize::IsNull::No)
            }
        }

        impl ::diesel::deserialize::FromSql<::diesel::sql_types::Integer, ::diesel::sqlite::Sqlite> for $name {
            fn from_sql(
                bytes: <::diesel::sqlite::Sqlite as ::diesel::backend::Backend>::RawValue<'_>,
            ) -> ::diesel::deserialize::Result<Self> {
                let raw = <i32 as ::diesel::deserialize::FromSql<
                    ::diesel::sql_types::Integer,
                    ::diesel::sqlite::Sqlite,
                >>::from_sql(bytes)?;
                <$name as $crate::types::Choice>::from_value(raw).ok_or_else(|| {
                    format!("{} is not a valid {}", raw, stringify!($name)).into()
                })
            }
        }
    };
}

/// Reference to a record by surrogate key or by global identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Id(i32),
    Uuid(Guid),
}

impl EntityRef {
    /// Interpret a loose value as a record reference. Integers and numeric
    /// strings are surrogate keys; other strings must parse as UUIDs.
    pub fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Int(i) => i32::try_from(*i).ok().map(EntityRef::Id),
            FieldValue::String(s) => s.parse::<Self>().ok(),
            _ => None,
        }
    }
}

impl FromStr for EntityRef {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i32>() {
            return Ok(EntityRef::Id(id));
        }
        Guid::parse(s).map(EntityRef::Uuid)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Id(id) => write!(f, "{}", id),
            EntityRef::Uuid(uuid) => write!(f, "{}", uuid),
        }
    }
}

impl From<Guid> for EntityRef {
    fn from(value: Guid) -> Self {
        EntityRef::Uuid(value)
    }
}

impl From<i32> for EntityRef {
    fn from(value: i32) -> Self {
        EntityRef::Id(value)
    }
}
