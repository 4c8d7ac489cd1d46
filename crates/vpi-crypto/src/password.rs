//! # Credential Manager
//!
//! Argon2id password hashing. Hashes are PHC strings such as
//! `$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`, so every stored hash
//! carries the algorithm, version, cost and salt it was produced with.
//!
//! New hashes use the configured [`HashCost`]; verification always uses the
//! parameters embedded in the hash being checked.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::OsRng;
use vpi_core::HashCost;

use crate::error::CredentialError;

/// Stored hashes demanding more memory than this are treated as invalid
/// rather than attempted (1 GiB).
const MAX_VERIFY_MEMORY_KIB: u32 = 1024 * 1024;

/// Same for the iteration count. Both limits rise to the configured cost
/// when that is higher, so this manager's own hashes always verify.
const MAX_VERIFY_ITERATIONS: u32 = 64;

/// Hashes and verifies passwords. Immutable after construction.
pub struct CredentialManager {
    argon2: Argon2<'static>,
    cost: HashCost,
    /// Hash of a random throwaway password, verified against when the login
    /// email is unknown so both failure paths cost the same.
    decoy_hash: String,
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

impl CredentialManager {
    /// Build an Argon2id hasher with the given cost.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidCost`] if Argon2 rejects the
    /// parameters (e.g. memory below `8 * parallelism` KiB, zero passes).
    pub fn new(cost: &HashCost) -> Result<Self, CredentialError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| CredentialError::InvalidCost(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let decoy_password = SaltString::generate(&mut OsRng);
        let decoy_hash = hash_with(&argon2, decoy_password.as_str())?;

        Ok(Self {
            argon2,
            cost: *cost,
            decoy_hash,
        })
    }

    /// Hash a password under a fresh random salt.
    ///
    /// Two calls with the same password return different strings.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Hashing`] only for inputs Argon2 cannot
    /// process (longer than `u32::MAX` bytes).
    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        hash_with(&self.argon2, password)
    }

    /// Check a password against a stored hash.
    ///
    /// Returns `false` for a wrong password and for any hash that does not
    /// parse, names an unsupported algorithm, or carries out-of-range
    /// parameters. Never panics.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        match Params::try_from(&parsed) {
            Ok(params)
                if params.m_cost() <= MAX_VERIFY_MEMORY_KIB.max(self.cost.memory_kib)
                    && params.t_cost() <= MAX_VERIFY_ITERATIONS.max(self.cost.iterations) => {}
            _ => return false,
        }
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spend the same work as [`verify`](Self::verify) without a real hash.
    ///
    /// Always returns `false`. Used when the login email has no account.
    pub fn verify_decoy(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.decoy_hash);
        false
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| CredentialError::Hashing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small cost so the suite stays fast; correctness does not depend on it.
    fn fast() -> CredentialManager {
        CredentialManager::new(&HashCost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn hash_then_verify_accepts_same_password() {
        let cm = fast();
        let hash = cm.hash("correct horse battery staple").unwrap();
        assert!(cm.verify("correct horse battery staple", &hash));
    }

    #[test]
    fn verify_rejects_other_password() {
        let cm = fast();
        let hash = cm.hash("correct horse battery staple").unwrap();
        assert!(!cm.verify("correct horse battery stapler", &hash));
        assert!(!cm.verify("", &hash));
    }

    #[test]
    fn hash_is_salted() {
        let cm = fast();
        let a = cm.hash("same-password").unwrap();
        let b = cm.hash("same-password").unwrap();
        assert_ne!(a, b);
        assert!(cm.verify("same-password", &a));
        assert!(cm.verify("same-password", &b));
    }

    #[test]
    fn hash_is_phc_argon2id_with_configured_cost() {
        let cm = fast();
        let hash = cm.hash("pw-for-format").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=64,t=1,p=1$"), "got {hash}");
        assert!(!hash.contains("pw-for-format"));
    }

    #[test]
    fn verify_uses_parameters_embedded_in_hash() {
        let weak = fast();
        let strong = CredentialManager::new(&HashCost {
            memory_kib: 128,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        let hash = weak.hash("portable").unwrap();
        assert!(strong.verify("portable", &hash));
    }

    #[test]
    fn malformed_hash_is_false_not_error() {
        let cm = fast();
        for bad in [
            "",
            "plaintext",
            "$argon2id$",
            "$argon2id$v=19$m=64,t=1,p=1$",
            "$2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW",
            "$unknown$v=1$salt$hash",
        ] {
            assert!(!cm.verify("anything", bad), "accepted {bad:?}");
        }
    }

    #[test]
    fn absurd_memory_cost_in_hash_is_rejected() {
        let cm = fast();
        let hash = cm.hash("pw").unwrap();
        let inflated = hash.replace("m=64", "m=4000000");
        assert!(!cm.verify("pw", &inflated));
    }

    #[test]
    fn absurd_iteration_count_in_hash_is_rejected() {
        let cm = fast();
        let hash = cm.hash("pw").unwrap();
        let inflated = hash.replace("t=1", "t=4294967295");
        assert!(inflated.contains("t=4294967295"));
        assert!(!cm.verify("pw", &inflated));
    }

    #[test]
    fn configured_cost_above_verify_limits_still_verifies() {
        let cm = CredentialManager::new(&HashCost {
            memory_kib: 64,
            iterations: MAX_VERIFY_ITERATIONS + 6,
            parallelism: 1,
        })
        .unwrap();
        let hash = cm.hash("pw").unwrap();
        assert!(cm.verify("pw", &hash));
    }

    #[test]
    fn decoy_never_succeeds() {
        let cm = fast();
        assert!(!cm.verify_decoy("anything"));
        assert!(!cm.verify_decoy(""));
    }

    #[test]
    fn invalid_cost_is_rejected() {
        let err = CredentialManager::new(&HashCost {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap_err();
        assert!(matches!(err, CredentialError::InvalidCost(_)));

        let err = CredentialManager::new(&HashCost {
            memory_kib: 64,
            iterations: 0,
            parallelism: 1,
        })
        .unwrap_err();
        assert!(matches!(err, CredentialError::InvalidCost(_)));
    }

    #[test]
    fn debug_does_not_expose_decoy() {
        let cm = fast();
        let rendered = format!("{cm:?}");
        assert!(!rendered.contains("argon2id"));
        assert!(rendered.contains("cost"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            /// Every password verifies against its own hash.
            #[test]
            fn verify_accepts_own_hash(password in "\\PC{0,64}") {
                let cm = fast();
                let hash = cm.hash(&password).unwrap();
                prop_assert!(cm.verify(&password, &hash));
            }

            /// A different password never verifies.
            #[test]
            fn verify_rejects_different_password(
                p in "[a-zA-Z0-9]{1,32}",
                q in "[a-zA-Z0-9]{1,32}",
            ) {
                prop_assume!(p != q);
                let cm = fast();
                let hash = cm.hash(&p).unwrap();
                prop_assert!(!cm.verify(&q, &hash));
            }
        }
    }
}
