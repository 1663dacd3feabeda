//! Identity strategies shared by the models.
//!
//! The columns themselves are declared per table in `schema.rs`; these traits
//! give uniform access to them and to the id-or-uuid lookup every action uses.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::types::{EntityRef, Guid};

/// Records with an auto-increment surrogate key and a global identifier.
pub trait Identified {
    fn id(&self) -> i32;
    fn uuid(&self) -> Guid;
}

/// Records stamped on creation and modification.
pub trait Timestamped {
    fn date_created(&self) -> NaiveDateTime;
    fn last_updated(&self) -> Option<NaiveDateTime>;
}

/// Records that are flagged as deleted instead of being removed.
pub trait SoftDelete {
    fn is_deleted(&self) -> bool;
}

/// A persisted model addressable by surrogate key or global identifier.
pub trait Entity: Sized {
    /// The name of this entity type
    const NAME: &'static str;

    fn find_by_id(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Self>>;

    fn find_by_uuid(conn: &mut SqliteConnection, uuid: &Guid) -> QueryResult<Option<Self>>;

    /// Retrieve the record matching `reference`.
    fn get(conn: &mut SqliteConnection, reference: &EntityRef) -> QueryResult<Option<Self>> {
        match reference {
            EntityRef::Id(id) => Self::find_by_id(conn, *id),
            EntityRef::Uuid(uuid) => Self::find_by_uuid(conn, uuid),
        }
    }
}

/// Current UTC time without offset, the representation stored in timestamp columns.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Implements [`Identified`] and [`Entity`] for a model loaded straight from
/// a table with `id` and `uuid` columns.
#[macro_export]
macro_rules! table_entity {
    ($model:ty, $table:ident, $name:expr) => {
        impl $crate::mixins::Identified for $model {
            fn id(&self) -> i32 {
                self.id
            }

            fn uuid(&self) -> $crate::types::Guid {
                self.uuid
            }
        }

        impl $crate::mixins::Entity for $model {
            const NAME: &'static str = $name;

            fn find_by_id(
                conn: &mut ::diesel::sqlite::SqliteConnection,
                id: i32,
            ) -> ::diesel::QueryResult<Option<Self>> {
                use ::diesel::prelude::*;
                $crate::schema::$table::table
                    .filter($crate::schema::$table::id.eq(id))
                    .select(<$model>::as_select())
                    .first(conn)
                    .optional()
            }

            fn find_by_uuid(
                conn: &mut ::diesel::sqlite::SqliteConnection,
                uuid: &$crate::types::Guid,
            ) -> ::diesel::QueryResult<Option<Self>> {
                use ::diesel::prelude::*;
                $crate::schema::$table::table
                    .filter($crate::schema::$table::uuid.eq(uuid))
                    .select(<$model>::as_select())
                    .first(conn)
                    .optional()
            }
        }
    };
}
