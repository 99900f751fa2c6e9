//! Argon2id password hashing. Hashes are stored in PHC string format, which
//! embeds the algorithm, parameters, and salt alongside the digest.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(plaintext: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("password hashing failed: {}", e))
}

/// Verify a plaintext password against a stored PHC-format hash.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Stored password hash is unparseable: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}
