//! # auth-adapters
//!
//! Argon2id implementation of `PasscodeHasher`.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use domains::{PasscodeError, PasscodeHash, PasscodeHasher};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

pub struct Argon2Hasher {
    params: Params,
    /// Optional server-side secret mixed into every hash.
    pepper: Option<SecretString>,
}

impl Argon2Hasher {
    /// Builds a hasher with explicit cost parameters (memory in KiB).
    pub fn new(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
        pepper: Option<SecretString>,
    ) -> Result<Self, PasscodeError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasscodeError::Hashing(e.to_string()))?;
        Ok(Self { params, pepper })
    }

    fn engine(&self) -> Result<Argon2<'_>, PasscodeError> {
        match &self.pepper {
            Some(pepper) => Argon2::new_with_secret(
                pepper.expose_secret().as_bytes(),
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )
            .map_err(|e| PasscodeError::Hashing(e.to_string())),
            None => Ok(Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )),
        }
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
            pepper: None,
        }
    }
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("params", &self.params)
            .field("peppered", &self.pepper.is_some())
            .finish()
    }
}

impl PasscodeHasher for Argon2Hasher {
    fn hash(&self, passcode: &str) -> Result<PasscodeHash, PasscodeError> {
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
            .map_err(|e| PasscodeError::Hashing(e.to_string()))?;
        let phc = self
            .engine()?
            .hash_password(passcode.as_bytes(), &salt)
            .map_err(|e| PasscodeError::Hashing(e.to_string()))?;
        Ok(PasscodeHash::new(phc.to_string()))
    }

    fn verify(&self, passcode: &str, hash: &PasscodeHash) -> bool {
        let parsed = match PasswordHash::new(hash.as_str()) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "stored passcode hash is not a PHC string");
                return false;
            }
        };
        match self.engine() {
            Ok(engine) => engine.verify_password(passcode.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::error!(error = %e, "passcode engine unavailable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap(pepper: Option<&str>) -> Argon2Hasher {
        Argon2Hasher::new(8, 1, 1, pepper.map(|p| SecretString::from(p.to_string()))).unwrap()
    }

    #[test]
    fn hash_then_verify() {
        let hasher = cheap(None);
        let hash = hasher.hash("1234").unwrap();
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify("1234", &hash));
        assert!(!hasher.verify("12345", &hash));
    }

    #[test]
    fn same_passcode_gets_distinct_salts() {
        let hasher = cheap(None);
        assert_ne!(hasher.hash("1234").unwrap(), hasher.hash("1234").unwrap());
    }

    #[test]
    fn pepper_must_match() {
        let peppered = cheap(Some("server-secret"));
        let hash = peppered.hash("1234").unwrap();
        assert!(peppered.verify("1234", &hash));
        assert!(!cheap(None).verify("1234", &hash));
        assert!(!cheap(Some("other-secret")).verify("1234", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!cheap(None).verify("1234", &PasscodeHash::new("1234")));
    }

    #[test]
    fn rejects_impossible_params() {
        assert!(matches!(
            Argon2Hasher::new(0, 0, 0, None),
            Err(PasscodeError::Hashing(_))
        ));
    }
}
