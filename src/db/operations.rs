//! Idempotent insert operations used by bulk imports.

use diesel::result::Error as DieselError;
use diesel::sqlite::SqliteConnection;

/// Look a record up by its natural key and insert it only when absent.
pub trait GetOrCreate: Sized {
    /// The insertable form of the record.
    type New;

    fn get_or_create(
        conn: &mut SqliteConnection,
        instance: &Self::New,
    ) -> Result<Self, DieselError>;
}
