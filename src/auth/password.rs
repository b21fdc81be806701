use std::sync::Arc;

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

use crate::auth::error::HashError;
use crate::config::{HashAlgorithm, HashConfig};

/// One-way salted password hashing.
///
/// `verify` looks at the digest itself to pick the algorithm, so users whose
/// digest was produced under a previous `PASSWORD_HASHER` can still log in.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, HashError>;

    fn verify(&self, plain: &str, digest: &str) -> Result<bool, HashError> {
        verify_digest(plain, digest)
    }
}

/// Longest password bcrypt accepts without truncating it.
pub const BCRYPT_MAX_PASSWORD_BYTES: usize = 71;

#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    pub cost: u32,
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plain: &str) -> Result<String, HashError> {
        // refuse passwords bcrypt would silently truncate
        Ok(bcrypt::non_truncating_hash(plain, self.cost)?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Argon2Hasher {
    /// Argon2 time cost.
    pub iterations: u32,
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> Result<String, HashError> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            self.iterations,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| HashError::Argon2(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| HashError::Argon2(e.to_string()))?
            .to_string();
        Ok(hash)
    }
}

pub fn from_config(cfg: &HashConfig) -> Arc<dyn PasswordHasher> {
    match cfg.algorithm {
        HashAlgorithm::Bcrypt => Arc::new(BcryptHasher { cost: cfg.cost }),
        HashAlgorithm::Argon2 => Arc::new(Argon2Hasher {
            iterations: cfg.cost,
        }),
    }
}

fn verify_digest(plain: &str, digest: &str) -> Result<bool, HashError> {
    if digest.starts_with("$argon2") {
        let parsed =
            PasswordHash::new(digest).map_err(|e| HashError::Argon2(e.to_string()))?;
        return match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashError::Argon2(e.to_string())),
        };
    }
    if digest.starts_with("$2") {
        // digests are only ever produced from inputs within the limit, so a longer
        // password cannot match
        return match bcrypt::non_truncating_verify(plain, digest) {
            Ok(matches) => Ok(matches),
            Err(bcrypt::BcryptError::Truncation(_)) => Ok(false),
            Err(e) => Err(e.into()),
        };
    }
    Err(HashError::UnrecognizedDigest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST_BCRYPT: BcryptHasher = BcryptHasher { cost: 4 };
    const FAST_ARGON2: Argon2Hasher = Argon2Hasher { iterations: 1 };

    #[test]
    fn bcrypt_hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = FAST_BCRYPT.hash(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(hash.starts_with("$2"));
        assert!(FAST_BCRYPT.verify(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn bcrypt_rejects_wrong_password() {
        let hash = FAST_BCRYPT.hash("secret123").unwrap();
        assert!(!FAST_BCRYPT.verify("secret124", &hash).expect("verify should not error"));
    }

    #[test]
    fn bcrypt_digest_records_cost() {
        let hash = BcryptHasher { cost: 5 }.hash("secret123").unwrap();
        assert!(hash.starts_with("$2b$05$"), "unexpected digest {hash}");
    }

    #[test]
    fn hashing_is_salted() {
        let a = FAST_BCRYPT.hash("same-password1").unwrap();
        let b = FAST_BCRYPT.hash("same-password1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn argon2_hash_and_verify_roundtrip() {
        let password = "correct-horse-battery-staple";
        let hash = FAST_ARGON2.hash(password).expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("t=1"));
        assert!(FAST_ARGON2.verify(password, &hash).unwrap());
        assert!(!FAST_ARGON2.verify("wrong-password", &hash).unwrap());
    }

    #[test]
    fn verify_accepts_digest_from_other_algorithm() {
        let argon_digest = FAST_ARGON2.hash("pass1234").unwrap();
        assert!(FAST_BCRYPT.verify("pass1234", &argon_digest).unwrap());

        let bcrypt_digest = FAST_BCRYPT.hash("pass1234").unwrap();
        assert!(FAST_ARGON2.verify("pass1234", &bcrypt_digest).unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = FAST_BCRYPT.verify("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, HashError::UnrecognizedDigest));

        assert!(FAST_BCRYPT.verify("anything", "$argon2id$garbage").is_err());
    }

    #[test]
    fn bcrypt_refuses_passwords_it_would_truncate() {
        // bcrypt keys on 72 bytes including the NUL terminator
        let at_limit = format!("{}abc", "\u{1F512}".repeat(17));
        assert_eq!(at_limit.len(), BCRYPT_MAX_PASSWORD_BYTES);
        assert!(FAST_BCRYPT.hash(&at_limit).is_ok());

        let long = format!("{}1", "\u{1F512}".repeat(18));
        assert_eq!(long.len(), 73);
        let err = FAST_BCRYPT.hash(&long).unwrap_err();
        assert!(matches!(err, HashError::Bcrypt(bcrypt::BcryptError::Truncation(_))));
    }

    #[test]
    fn bcrypt_does_not_match_on_shared_prefix() {
        let prefix = format!("{}abc", "\u{1F512}".repeat(17));
        let hash = FAST_BCRYPT.hash(&prefix).unwrap();
        assert!(FAST_BCRYPT.verify(&prefix, &hash).unwrap());
        assert!(!FAST_BCRYPT.verify(&format!("{prefix}9"), &hash).unwrap());
        assert!(!FAST_BCRYPT.verify(&format!("{prefix}99"), &hash).unwrap());
    }

    #[test]
    fn from_config_selects_argon2() {
        let hasher = from_config(&HashConfig {
            algorithm: HashAlgorithm::Argon2,
            cost: 1,
        });
        let hash = hasher.hash("secret123").unwrap();
        assert!(hash.starts_with("$argon2id$"), "unexpected digest {hash}");
        assert!(hash.contains("t=1"));
        assert!(hasher.verify("secret123", &hash).unwrap());
    }

    #[test]
    fn from_config_uses_configured_cost() {
        let hasher = from_config(&HashConfig {
            algorithm: HashAlgorithm::Bcrypt,
            cost: 4,
        });
        let hash = hasher.hash("secret123").unwrap();
        assert!(hash.starts_with("$2b$04$"));
    }
}
