use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sqlite::{Sqlite, SqliteConnection};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::password::{check_password, generate_confirmation_hash, hash_password};
use super::AuthResult;
use crate::mixins::{now, Entity};
use crate::schema::{auth_emails, auth_roles, auth_users, auth_users_roles};
use crate::table_entity;
use crate::types::Guid;

/// Name of the role that marks a user as an administrator.
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = auth_users, check_for_backend(Sqlite))]
pub struct User {
    pub id: i32,
    pub uuid: Guid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub is_active: bool,
    pub date_joined: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
}

table_entity!(User, auth_users, "User");

impl User {
    pub fn find_by_username(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> QueryResult<Option<User>> {
        auth_users::table
            .filter(auth_users::username.eq(username))
            .select(User::as_select())
            .first(conn)
            .optional()
    }

    /// The owner of the email `address`, if any.
    pub fn find_by_email(conn: &mut SqliteConnection, address: &str) -> QueryResult<Option<User>> {
        auth_users::table
            .inner_join(auth_emails::table.on(auth_emails::user_id.eq(auth_users::uuid)))
            .filter(auth_emails::address.eq(address))
            .select(User::as_select())
            .first(conn)
            .optional()
    }

    /// A user without a password never matches.
    pub fn check_password(&self, raw_password: &str) -> bool {
        match &self.password {
            Some(hash) => check_password(raw_password, hash),
            None => false,
        }
    }

    /// Hash and store a new password.
    pub fn set_password(
        &mut self,
        conn: &mut SqliteConnection,
        raw_password: &str,
    ) -> AuthResult<()> {
        let hash = hash_password(raw_password)?;
        diesel::update(auth_users::table.filter(auth_users::id.eq(self.id)))
            .set(auth_users::password.eq(&hash))
            .execute(conn)?;
        self.password = Some(hash);
        Ok(())
    }

    pub fn set_active(&mut self, conn: &mut SqliteConnection, is_active: bool) -> QueryResult<()> {
        diesel::update(auth_users::table.filter(auth_users::id.eq(self.id)))
            .set(auth_users::is_active.eq(is_active))
            .execute(conn)?;
        self.is_active = is_active;
        Ok(())
    }

    pub fn touch_last_login(&mut self, conn: &mut SqliteConnection) -> QueryResult<()> {
        let stamp = now();
        diesel::update(auth_users::table.filter(auth_users::id.eq(self.id)))
            .set(auth_users::last_login.eq(Some(stamp)))
            .execute(conn)?;
        self.last_login = Some(stamp);
        Ok(())
    }

    pub fn roles(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<Role>> {
        auth_roles::table
            .inner_join(auth_users_roles::table.on(auth_users_roles::role_id.eq(auth_roles::uuid)))
            .filter(auth_users_roles::user_id.eq(self.uuid))
            .order(auth_roles::name.asc())
            .select(Role::as_select())
            .load(conn)
    }

    pub fn add_role(&self, conn: &mut SqliteConnection, role: &Role) -> QueryResult<()> {
        diesel::insert_into(auth_users_roles::table)
            .values((
                auth_users_roles::user_id.eq(self.uuid),
                auth_users_roles::role_id.eq(role.uuid),
            ))
            .execute(conn)?;
        Ok(())
    }

    pub fn emails(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<AuthEmail>> {
        auth_emails::table
            .filter(auth_emails::user_id.eq(self.uuid))
            .order(auth_emails::id.asc())
            .select(AuthEmail::as_select())
            .load(conn)
    }

    pub fn add_email(&self, conn: &mut SqliteConnection, address: &str) -> QueryResult<AuthEmail> {
        NewAuthEmail::new(address, self.uuid).insert(conn)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub is_active: bool,
}

impl NewUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn active(mut self) -> Self {
        self.is_active = true;
        self
    }

    /// Store the hash of `raw_password` on insert.
    pub fn with_password(mut self, raw_password: &str) -> AuthResult<Self> {
        self.password = Some(hash_password(raw_password)?);
        Ok(self)
    }

    pub fn insert(&self, conn: &mut SqliteConnection) -> QueryResult<User> {
        let uuid = Guid::new_v4();
        diesel::insert_into(auth_users::table)
            .values((
                auth_users::uuid.eq(uuid),
                auth_users::username.eq(&self.username),
                auth_users::first_name.eq(&self.first_name),
                auth_users::last_name.eq(&self.last_name),
                auth_users::password.eq(&self.password),
                auth_users::is_active.eq(self.is_active),
                auth_users::date_joined.eq(now()),
            ))
            .execute(conn)?;
        User::find_by_uuid(conn, &uuid)?.ok_or(DieselError::NotFound)
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = auth_roles, check_for_backend(Sqlite))]
pub struct Role {
    pub id: i32,
    pub uuid: Guid,
    pub name: String,
    pub description: Option<String>,
}

table_entity!(Role, auth_roles, "Role");

impl Role {
    pub fn find_by_name(conn: &mut SqliteConnection, name: &str) -> QueryResult<Option<Role>> {
        auth_roles::table
            .filter(auth_roles::name.eq(name))
            .select(Role::as_select())
            .first(conn)
            .optional()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = auth_roles)]
pub struct NewRole {
    pub uuid: Guid,
    pub name: String,
    pub description: Option<String>,
}

impl NewRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Guid::new_v4(),
            name: name.into(),
            description: None,
        }
    }

    pub fn insert(&self, conn: &mut SqliteConnection) -> QueryResult<Role> {
        diesel::insert_into(auth_roles::table).values(self).execute(conn)?;
        Role::find_by_uuid(conn, &self.uuid)?.ok_or(DieselError::NotFound)
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = auth_emails, check_for_backend(Sqlite))]
pub struct AuthEmail {
    pub id: i32,
    pub uuid: Guid,
    pub address: String,
    pub user_id: Guid,
    pub confirmation_hash: Option<String>,
    pub is_confirmed: bool,
    pub is_preferred: bool,
}

table_entity!(AuthEmail, auth_emails, "AuthEmail");

impl AuthEmail {
    pub fn confirm(&mut self, conn: &mut SqliteConnection) -> QueryResult<()> {
        diesel::update(auth_emails::table.filter(auth_emails::id.eq(self.id)))
            .set(auth_emails::is_confirmed.eq(true))
            .execute(conn)?;
        self.is_confirmed = true;
        Ok(())
    }
}

impl fmt::Display for AuthEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = auth_emails)]
pub struct NewAuthEmail {
    pub uuid: Guid,
    pub address: String,
    pub user_id: Guid,
    pub confirmation_hash: Option<String>,
    pub is_confirmed: bool,
    pub is_preferred: bool,
}

impl NewAuthEmail {
    /// An unconfirmed address carrying a fresh confirmation hash.
    pub fn new(address: impl Into<String>, user_id: Guid) -> Self {
        Self {
            uuid: Guid::new_v4(),
            address: address.into(),
            user_id,
            confirmation_hash: Some(generate_confirmation_hash()),
            is_confirmed: false,
            is_preferred: false,
        }
    }

    pub fn confirmed(mut self) -> Self {
        self.is_confirmed = true;
        self
    }

    pub fn insert(&self, conn: &mut SqliteConnection) -> QueryResult<AuthEmail> {
        diesel::insert_into(auth_emails::table).values(self).execute(conn)?;
        AuthEmail::find_by_uuid(conn, &self.uuid)?.ok_or(DieselError::NotFound)
    }
}

/// A user loaded together with its roles and emails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserAccount {
    pub user: User,
    pub roles: Vec<Role>,
    pub emails: Vec<AuthEmail>,
}

impl UserAccount {
    pub fn load(conn: &mut SqliteConnection, user: User) -> QueryResult<UserAccount> {
        let roles = user.roles(conn)?;
        let emails = user.emails(conn)?;
        Ok(UserAccount { user, roles, emails })
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role.name == ADMIN_ROLE)
    }

    pub fn confirmed_emails(&self) -> Vec<&AuthEmail> {
        self.emails.iter().filter(|e| e.is_confirmed).collect()
    }

    pub fn has_confirmed_emails(&self) -> bool {
        self.emails.iter().any(|e| e.is_confirmed)
    }

    /// The first email flagged preferred, else the first email.
    pub fn preferred_email(&self) -> Option<&AuthEmail> {
        self.emails
            .iter()
            .find(|e| e.is_preferred)
            .or_else(|| self.emails.first())
    }

    /// Make `email` the only preferred address of this user, attaching it to
    /// the user when it belongs to someone else.
    pub fn set_preferred_email(
        &mut self,
        conn: &mut SqliteConnection,
        email: &AuthEmail,
    ) -> QueryResult<()> {
        let user_id = self.user.uuid;
        conn.transaction(|conn| {
            diesel::update(auth_emails::table.filter(auth_emails::user_id.eq(user_id)))
                .set(auth_emails::is_preferred.eq(false))
                .execute(conn)?;
            diesel::update(auth_emails::table.filter(auth_emails::uuid.eq(email.uuid)))
                .set((
                    auth_emails::is_preferred.eq(true),
                    auth_emails::user_id.eq(user_id),
                ))
                .execute(conn)?;
            Ok::<_, DieselError>(())
        })?;
        self.emails = self.user.emails(conn)?;
        Ok(())
    }
}
