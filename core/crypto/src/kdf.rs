//! Key derivation for the shared pool and per-principal vaults.
//!
//! The master key comes from scrypt over the long-term secret and a fixed
//! salt. It is slow by design and computed exactly once, when the subsystem
//! starts. Vault keys are then stretched per principal with
//! PBKDF2-HMAC-SHA512, so compromising one principal's vault key reveals
//! nothing about another's, and the vault key space is disjoint from the
//! shared key space.

use pbkdf2::pbkdf2_hmac;
use scrypt::Params;
use sha2::Sha512;

use crate::keys::{MasterKey, Salt, ScopedKey, KEY_LENGTH};
use classvault_common::{Error, PrincipalId, Result, Scope};

/// scrypt cost parameter, log2(N). N = 16384.
const SCRYPT_LOG_N: u8 = 14;
/// scrypt block size.
const SCRYPT_R: u32 = 8;
/// scrypt parallelism.
const SCRYPT_P: u32 = 1;

/// PBKDF2 iteration count for vault key stretching.
const VAULT_KEY_ROUNDS: u32 = 100_000;

/// Derives and caches the symmetric keys for every encryption scope.
///
/// Constructed once at process start from injected configuration; never a
/// hidden global. Scoped derivation is a pure function of the cached master
/// key and the principal identifier.
pub struct KeyDerivation {
    master: MasterKey,
}

impl KeyDerivation {
    /// Derive the master key from the long-term secret and fixed salt.
    ///
    /// # Errors
    /// - `Error::Config` if the secret is empty or the scrypt parameters are
    ///   rejected. Both are fatal at startup.
    pub fn new(secret: &[u8], salt: &Salt) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::Config("Master secret cannot be empty".to_string()));
        }

        let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LENGTH)
            .map_err(|e| Error::Config(format!("Invalid scrypt parameters: {}", e)))?;

        let mut key_bytes = [0u8; KEY_LENGTH];
        scrypt::scrypt(secret, salt.as_bytes(), &params, &mut key_bytes)
            .map_err(|e| Error::Crypto(format!("Master key derivation failed: {}", e)))?;

        Ok(Self {
            master: MasterKey::from_bytes(key_bytes),
        })
    }

    /// Derive the encryption key for a scope.
    ///
    /// Shared-scope objects all use the master key directly; the IV is the
    /// only per-file diversifier, an accepted simplification. Vault-scope
    /// objects get a key unique to the owning principal.
    pub fn scoped_key(&self, scope: Scope, principal: &PrincipalId) -> ScopedKey {
        match scope {
            Scope::Shared => ScopedKey::from_bytes(*self.master.as_bytes()),
            Scope::Vault => self.vault_key(principal),
        }
    }

    /// PBKDF2-HMAC-SHA512 over the hex-encoded master key, salted with the
    /// principal identifier.
    fn vault_key(&self, principal: &PrincipalId) -> ScopedKey {
        let password = hex::encode(self.master.as_bytes());
        let mut key_bytes = [0u8; KEY_LENGTH];
        pbkdf2_hmac::<Sha512>(
            password.as_bytes(),
            principal.as_str().as_bytes(),
            VAULT_KEY_ROUNDS,
            &mut key_bytes,
        );
        ScopedKey::from_bytes(key_bytes)
    }
}

impl std::fmt::Debug for KeyDerivation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyDerivation([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_salt() -> Salt {
        Salt::new(b"classvault-test-salt".to_vec()).unwrap()
    }

    #[test]
    fn test_master_key_deterministic() {
        let kd1 = KeyDerivation::new(b"long-term-secret", &test_salt()).unwrap();
        let kd2 = KeyDerivation::new(b"long-term-secret", &test_salt()).unwrap();

        let p = PrincipalId::new("user-1").unwrap();
        assert_eq!(
            kd1.scoped_key(Scope::Shared, &p).as_bytes(),
            kd2.scoped_key(Scope::Shared, &p).as_bytes()
        );
        assert_eq!(
            kd1.scoped_key(Scope::Vault, &p).as_bytes(),
            kd2.scoped_key(Scope::Vault, &p).as_bytes()
        );
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        let result = KeyDerivation::new(b"", &test_salt());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_vault_keys_isolated_per_principal() {
        let kd = KeyDerivation::new(b"long-term-secret", &test_salt()).unwrap();
        let a = PrincipalId::new("principal-a").unwrap();
        let b = PrincipalId::new("principal-b").unwrap();

        assert_ne!(
            kd.scoped_key(Scope::Vault, &a).as_bytes(),
            kd.scoped_key(Scope::Vault, &b).as_bytes()
        );
    }

    #[test]
    fn test_shared_and_vault_key_spaces_disjoint() {
        let kd = KeyDerivation::new(b"long-term-secret", &test_salt()).unwrap();
        let p = PrincipalId::new("user-1").unwrap();

        assert_ne!(
            kd.scoped_key(Scope::Shared, &p).as_bytes(),
            kd.scoped_key(Scope::Vault, &p).as_bytes()
        );
    }

    #[test]
    fn test_different_salt_different_master() {
        let salt_a = Salt::new(b"salt-a".to_vec()).unwrap();
        let salt_b = Salt::new(b"salt-b".to_vec()).unwrap();
        let p = PrincipalId::new("user-1").unwrap();

        let kd_a = KeyDerivation::new(b"secret", &salt_a).unwrap();
        let kd_b = KeyDerivation::new(b"secret", &salt_b).unwrap();

        assert_ne!(
            kd_a.scoped_key(Scope::Shared, &p).as_bytes(),
            kd_b.scoped_key(Scope::Shared, &p).as_bytes()
        );
    }
}
