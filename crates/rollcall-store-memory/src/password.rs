//! Temporary credential generation and hashing.
//!
//! Credentials are stored only as argon2id PHC strings; the plaintext leaves
//! the store exactly once, inside the create/reset response.

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  password_hash::SaltString,
};
use rand::{Rng as _, distributions::Alphanumeric, rngs::OsRng};

pub const TEMP_PASSWORD_LEN: usize = 12;

/// Draw a one-time alphanumeric credential from the OS CSPRNG.
pub fn generate_temp_password() -> String {
  (0..TEMP_PASSWORD_LEN)
    .map(|_| OsRng.sample(Alphanumeric) as char)
    .collect()
}

/// Hash a credential to an argon2id PHC string, e.g. `$argon2id$v=19$…`.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)?
      .to_string(),
  )
}

/// Verify a candidate against a stored PHC string.
pub fn verify_password(candidate: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .map(|parsed| {
      Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
    })
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn generated_credentials_are_alphanumeric_and_distinct() {
    let a = generate_temp_password();
    let b = generate_temp_password();
    assert_eq!(a.len(), TEMP_PASSWORD_LEN);
    assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(a, b);
  }

  #[test]
  fn hash_verifies_original_and_rejects_others() {
    let hash = hash_password("first-credential").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(verify_password("first-credential", &hash));
    assert!(!verify_password("other", &hash));
  }
}
