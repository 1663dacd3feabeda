//! Integration tests for user accounts and authentication

mod common;

use diesel::sqlite::SqliteConnection;
use entikit::auth::{Authenticator, NewRole, NewUser, User, UserAccount, ADMIN_ROLE};

use common::session;

fn active_user(conn: &mut SqliteConnection, username: &str, password: &str) -> User {
    NewUser::new(username)
        .active()
        .with_password(password)
        .unwrap()
        .insert(conn)
        .unwrap()
}

#[test]
fn test_authenticate_by_username() {
    let mut conn = session();
    let user = active_user(&mut conn, "ada", "tiger");
    assert!(user.last_login.is_none());

    let auth = Authenticator::default();
    let found = auth.authenticate(&mut conn, "ada", "tiger").unwrap().unwrap();
    assert_eq!(found.uuid, user.uuid);
    assert!(found.last_login.is_some());

    assert!(auth.authenticate(&mut conn, "ada", "lion").unwrap().is_none());
    assert!(auth.authenticate(&mut conn, "bola", "tiger").unwrap().is_none());
}

#[test]
fn test_authenticate_by_email() {
    let mut conn = session();
    let user = active_user(&mut conn, "ada", "tiger");
    user.add_email(&mut conn, "ada@example.org").unwrap();

    let strict = Authenticator::new(false);
    assert!(strict.authenticate(&mut conn, "ada@example.org", "tiger").unwrap().is_none());

    let relaxed = Authenticator::new(true);
    let found = relaxed
        .authenticate(&mut conn, "ada@example.org", "tiger")
        .unwrap()
        .unwrap();
    assert_eq!(found.username, "ada");
}

#[test]
fn test_inactive_user_cannot_authenticate() {
    let mut conn = session();
    let mut user = active_user(&mut conn, "ada", "tiger");
    user.set_active(&mut conn, false).unwrap();

    let auth = Authenticator::default();
    assert!(auth.authenticate(&mut conn, "ada", "tiger").unwrap().is_none());

    user.set_active(&mut conn, true).unwrap();
    user.set_password(&mut conn, "leopard").unwrap();
    assert!(auth.authenticate(&mut conn, "ada", "tiger").unwrap().is_none());
    assert!(auth.authenticate(&mut conn, "ada", "leopard").unwrap().is_some());
}

#[test]
fn test_user_without_password_never_matches() {
    let mut conn = session();
    NewUser::new("ghost").active().insert(&mut conn).unwrap();

    assert!(Authenticator::default()
        .authenticate(&mut conn, "ghost", "")
        .unwrap()
        .is_none());
}

#[test]
fn test_account_roles_and_emails() {
    let mut conn = session();
    let user = active_user(&mut conn, "ada", "tiger");
    let admin = NewRole::new(ADMIN_ROLE).insert(&mut conn).unwrap();
    let editor = NewRole::new("editor").insert(&mut conn).unwrap();
    user.add_role(&mut conn, &editor).unwrap();

    let first = user.add_email(&mut conn, "ada@example.org").unwrap();
    let mut second = user.add_email(&mut conn, "ada@work.example.org").unwrap();
    assert!(!first.is_confirmed);
    assert_eq!(first.confirmation_hash.as_ref().map(String::len), Some(28));

    let mut account = UserAccount::load(&mut conn, user.clone()).unwrap();
    assert!(!account.is_admin());
    assert!(!account.has_confirmed_emails());
    assert_eq!(account.preferred_email().map(|e| e.address.as_str()), Some("ada@example.org"));

    second.confirm(&mut conn).unwrap();
    account.set_preferred_email(&mut conn, &second).unwrap();
    assert_eq!(
        account.preferred_email().map(|e| e.address.as_str()),
        Some("ada@work.example.org")
    );
    assert_eq!(account.confirmed_emails().len(), 1);

    user.add_role(&mut conn, &admin).unwrap();
    let account = UserAccount::load(&mut conn, user).unwrap();
    assert!(account.is_admin());
    assert_eq!(
        account.roles.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        vec!["admin", "editor"]
    );
}
