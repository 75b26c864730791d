//! Vault configuration.
//!
//! The source system derived its encryption key from a hardcoded
//! password/salt pair held in a module-level constant. Here the secret is an
//! explicit configuration value constructed at process start and passed into
//! [`crate::store::VaultStore::open`]; nothing reads it from a global.

use classvault_common::{Error, Result, SensitiveBytes};
use classvault_crypto::Salt;

/// Reserved storage key for the persisted object catalog snapshot.
pub const CATALOG_FILENAME: &str = "catalog.json";

/// Startup configuration for the vault subsystem.
///
/// Validated eagerly: an empty secret or salt is a fatal configuration error
/// and prevents the subsystem from initializing.
#[derive(Debug)]
pub struct VaultConfig {
    master_secret: SensitiveBytes,
    kdf_salt: Salt,
}

impl VaultConfig {
    /// Create a configuration from the long-term secret and KDF salt.
    ///
    /// # Errors
    /// - `Error::Config` if either value is empty
    pub fn new(master_secret: impl Into<Vec<u8>>, kdf_salt: impl Into<Vec<u8>>) -> Result<Self> {
        let secret = master_secret.into();
        if secret.is_empty() {
            return Err(Error::Config("Master secret cannot be empty".to_string()));
        }
        let kdf_salt = Salt::new(kdf_salt.into())?;

        Ok(Self {
            master_secret: SensitiveBytes::new(secret),
            kdf_salt,
        })
    }

    /// The long-term master secret.
    pub fn master_secret(&self) -> &[u8] {
        self.master_secret.as_bytes()
    }

    /// The fixed salt for master key derivation.
    pub fn kdf_salt(&self) -> &Salt {
        &self.kdf_salt
    }
}
