use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;

use super::{AuthError, AuthResult};

/// Number of random bytes behind an email confirmation hash.
const CONFIRMATION_BYTES: usize = 14;

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::HashingFailed)
}

/// Verify a password against a stored hash. A malformed hash never matches.
pub fn check_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Random hex digest mailed out to confirm ownership of an address.
pub fn generate_confirmation_hash() -> String {
    let mut bytes = [0u8; CONFIRMATION_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_check() {
        let hash = hash_password("tiger").unwrap();
        assert_ne!(hash, "tiger");
        assert!(check_password("tiger", &hash));
        assert!(!check_password("lion", &hash));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!check_password("tiger", "tiger"));
        assert!(!check_password("", ""));
    }

    #[test]
    fn test_confirmation_hash_shape() {
        let first = generate_confirmation_hash();
        let second = generate_confirmation_hash();
        assert_eq!(first.len(), CONFIRMATION_BYTES * 2);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }
}
