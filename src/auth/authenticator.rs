use diesel::sqlite::SqliteConnection;

use super::models::User;
use super::AuthResult;

/// Checks login credentials against stored users.
#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticator {
    /// Also look the login up among users' email addresses.
    pub accept_email_as_username: bool,
}

impl Authenticator {
    pub fn new(accept_email_as_username: bool) -> Self {
        Self {
            accept_email_as_username,
        }
    }

    /// Return the active user matching `login` and `password`, stamping its
    /// last login. Unknown logins, wrong passwords and inactive users all
    /// yield `None`.
    pub fn authenticate(
        &self,
        conn: &mut SqliteConnection,
        login: &str,
        password: &str,
    ) -> AuthResult<Option<User>> {
        let mut found = User::find_by_username(conn, login)?;
        if found.is_none() && self.accept_email_as_username {
            found = User::find_by_email(conn, login)?;
        }

        let Some(mut user) = found else {
            tracing::debug!("Authentication failed: unknown login {}", login);
            return Ok(None);
        };

        if !user.is_active || !user.check_password(password) {
            tracing::debug!("Authentication failed for {}", user.username);
            return Ok(None);
        }

        user.touch_last_login(conn)?;
        tracing::info!("User {} authenticated", user.username);
        Ok(Some(user))
    }
}
