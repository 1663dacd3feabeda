//! Single-connection sessions: open, migrate, clear and drop the schema.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use super::error::DbError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Tables in dependency order: every table comes after the tables it
/// references.
pub const SORTED_TABLES: &[&str] = &[
    "countries",
    "states",
    "addresses",
    "contact_details",
    "parties",
    "parties_contact_details",
    "people",
    "organization_types",
    "organizations",
    "auth_users",
    "auth_roles",
    "auth_users_roles",
    "auth_emails",
];

/// Open a connection with foreign key enforcement switched on.
pub fn establish(database_url: &str) -> Result<SqliteConnection, DbError> {
    let mut conn = SqliteConnection::establish(database_url)?;
    conn.batch_execute("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// Open a connection and create all tables. Defaults to a private in-memory
/// database when `database_url` is `None`.
pub fn make_session(database_url: Option<&str>) -> Result<SqliteConnection, DbError> {
    let url = database_url.unwrap_or(":memory:");
    let mut conn = establish(url)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbError::Migration(e.to_string()))?;
    tracing::debug!("Session ready on {}", url);
    Ok(conn)
}

/// Like [`make_session`], then hands the connection to `initdb` to seed rows.
pub fn make_session_with<F>(
    database_url: Option<&str>,
    initdb: F,
) -> Result<SqliteConnection, DbError>
where
    F: FnOnce(&mut SqliteConnection) -> QueryResult<()>,
{
    let mut conn = make_session(database_url)?;
    initdb(&mut conn)?;
    Ok(conn)
}

/// Delete all rows from the named tables, or from every table when `names`
/// is empty. Rows are removed children first.
pub fn clear_tables(conn: &mut SqliteConnection, names: &[&str]) -> Result<(), DbError> {
    conn.transaction::<_, DbError, _>(|conn| {
        for table in SORTED_TABLES.iter().rev() {
            if !names.is_empty() && !names.contains(table) {
                continue;
            }
            let deleted = diesel::sql_query(format!("DELETE FROM {}", table)).execute(conn)?;
            tracing::trace!("Cleared {} row(s) from {}", deleted, table);
        }
        Ok(())
    })
}

/// Drop every table by reverting the migrations.
pub fn drop_tables(conn: &mut SqliteConnection) -> Result<(), DbError> {
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| DbError::Migration(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::countries;

    fn country_count(conn: &mut SqliteConnection) -> i64 {
        countries::table.count().get_result(conn).unwrap()
    }

    #[test]
    fn test_make_session_with_seeds_rows() {
        let mut conn = make_session_with(None, |conn| {
            conn.batch_execute(
                "INSERT INTO countries (uuid, code, name) \
                 VALUES ('6f1c1b1e-52a8-4a3d-9a63-0b9f36f1a001', 'NG', 'Nigeria');",
            )
        })
        .unwrap();

        assert_eq!(country_count(&mut conn), 1);
    }

    #[test]
    fn test_clear_tables_only_touches_named_tables() {
        let mut conn = make_session(None).unwrap();
        conn.batch_execute(
            "INSERT INTO countries (uuid, code, name) \
             VALUES ('6f1c1b1e-52a8-4a3d-9a63-0b9f36f1a001', 'NG', 'Nigeria'); \
             INSERT INTO auth_roles (uuid, name) \
             VALUES ('6f1c1b1e-52a8-4a3d-9a63-0b9f36f1a002', 'admin');",
        )
        .unwrap();

        clear_tables(&mut conn, &["countries"]).unwrap();
        assert_eq!(country_count(&mut conn), 0);

        let roles: i64 = crate::schema::auth_roles::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(roles, 1);

        clear_tables(&mut conn, &[]).unwrap();
        let roles: i64 = crate::schema::auth_roles::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(roles, 0);
    }

    #[test]
    fn test_drop_tables_removes_schema() {
        let mut conn = make_session(None).unwrap();
        drop_tables(&mut conn).unwrap();
        assert!(countries::table.count().get_result::<i64>(&mut conn).is_err());
    }
}
