//! Encrypted multi-credential vault.
//!
//! Collections are stored as one serialized blob per user, keyed by a
//! one-way hash of the identity (the identity itself never reaches the
//! store). Secret leaf fields are encrypted individually; names, flags, and
//! timestamps stay plaintext metadata. Writes replace the whole blob
//! (last-writer-wins — the version counter detects, but does not resolve,
//! concurrent writers).

pub mod crypto;
pub mod store;

use self::crypto::{identity_hash, CryptoError, FieldCipher};
use self::store::{KeyValueStore, StoreError};
use crate::domain::{ApiCredentials, CredentialCollection, CredentialSet, Network};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

const COLLECTION_KEY_PREFIX: &str = "lnm_configs_";
const LEGACY_KEY_PREFIX: &str = "lnm_credentials_";

const MIGRATED_NAME: &str = "Imported credentials";
const MIGRATED_DESCRIPTION: &str = "Migrated from single-credential storage";

#[derive(Debug, Clone, Error)]
pub enum VaultError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("stored collection is corrupted: {0}")]
    Corrupt(String),
    #[error("credential set {0} not found")]
    NotFound(String),
}

/// Partial update applied by [`CredentialVault::update`].
#[derive(Debug, Clone, Default)]
pub struct CredentialSetPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub credentials: Option<ApiCredentials>,
    pub is_active: Option<bool>,
}

// At-rest shapes: metadata plaintext, the three secret fields encrypted.

#[derive(Debug, Serialize, Deserialize)]
struct StoredCollection {
    configs: Vec<StoredCredentialSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_config_id: Option<String>,
    last_updated: DateTime<Utc>,
    #[serde(default)]
    version: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCredentialSet {
    id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    key: String,
    secret: String,
    passphrase: String,
    network: Network,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct LegacyRecord {
    key: String,
    secret: String,
    passphrase: String,
    network: Network,
}

/// Vault over an injected key-value store.
#[derive(Clone)]
pub struct CredentialVault {
    store: Arc<dyn KeyValueStore>,
    app_secret: String,
}

impl CredentialVault {
    pub fn new(store: Arc<dyn KeyValueStore>, app_secret: impl Into<String>) -> Self {
        Self {
            store,
            app_secret: app_secret.into(),
        }
    }

    /// Persist the whole collection for `identity`. Returns the new version.
    pub async fn save(
        &self,
        identity: &str,
        collection: &CredentialCollection,
    ) -> Result<u64, VaultError> {
        let hash = identity_hash(identity);
        let cipher = self.cipher_for(&hash);

        if let Some(stored) = self.load_stored(&hash).await? {
            if stored.version != collection.version {
                warn!(
                    expected = collection.version,
                    found = stored.version,
                    "concurrent vault modification detected, last writer wins"
                );
            }
        }

        let version = collection.version + 1;
        let stored = StoredCollection {
            configs: collection
                .configs
                .iter()
                .map(|set| encrypt_set(&cipher, set))
                .collect::<Result<_, _>>()?,
            default_config_id: collection.default_config_id.clone(),
            last_updated: Utc::now(),
            version,
        };

        let blob = serde_json::to_string(&stored).map_err(|e| VaultError::Corrupt(e.to_string()))?;
        self.store.set(&collection_key(&hash), &blob).await?;
        Ok(version)
    }

    /// Load and decrypt the collection for `identity`.
    ///
    /// A user with no stored credentials gets an empty collection, not an
    /// error. A legacy single-credential record, when present and no
    /// collection exists, is migrated in place: wrapped into a one-entry
    /// collection marked default and active, persisted, and the legacy blob
    /// deleted.
    pub async fn retrieve(&self, identity: &str) -> Result<CredentialCollection, VaultError> {
        let hash = identity_hash(identity);
        let cipher = self.cipher_for(&hash);

        if let Some(stored) = self.load_stored(&hash).await? {
            let configs = stored
                .configs
                .into_iter()
                .map(|set| decrypt_set(&cipher, set))
                .collect::<Result<_, _>>()?;
            return Ok(CredentialCollection {
                configs,
                default_config_id: stored.default_config_id,
                last_updated: stored.last_updated,
                version: stored.version,
            });
        }

        if let Some(blob) = self.store.get(&legacy_key(&hash)).await? {
            return self.migrate_legacy(identity, &hash, &cipher, &blob).await;
        }

        Ok(CredentialCollection::empty())
    }

    /// Add a credential set. The first-ever entry becomes the default.
    pub async fn add(
        &self,
        identity: &str,
        name: impl Into<String>,
        description: Option<String>,
        credentials: ApiCredentials,
    ) -> Result<CredentialSet, VaultError> {
        let mut collection = self.retrieve(identity).await?;
        let now = Utc::now();
        let set = CredentialSet {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description,
            credentials,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        if collection.is_empty() {
            collection.default_config_id = Some(set.id.clone());
        }
        collection.configs.push(set.clone());
        collection.version = self.save(identity, &collection).await?;
        Ok(set)
    }

    /// Apply a partial update to one credential set.
    pub async fn update(
        &self,
        identity: &str,
        id: &str,
        patch: CredentialSetPatch,
    ) -> Result<CredentialSet, VaultError> {
        let mut collection = self.retrieve(identity).await?;
        let set = collection
            .find_mut(id)
            .ok_or_else(|| VaultError::NotFound(id.to_string()))?;

        if let Some(name) = patch.name {
            set.name = name;
        }
        if let Some(description) = patch.description {
            set.description = Some(description);
        }
        if let Some(credentials) = patch.credentials {
            set.credentials = credentials;
        }
        if let Some(is_active) = patch.is_active {
            set.is_active = is_active;
        }
        set.updated_at = Utc::now();
        let updated = set.clone();

        self.save(identity, &collection).await?;
        Ok(updated)
    }

    /// Remove a credential set, reassigning the default if it was removed.
    pub async fn remove(&self, identity: &str, id: &str) -> Result<(), VaultError> {
        let mut collection = self.retrieve(identity).await?;
        let before = collection.configs.len();
        collection.configs.retain(|c| c.id != id);
        if collection.configs.len() == before {
            return Err(VaultError::NotFound(id.to_string()));
        }

        if collection.default_config_id.as_deref() == Some(id) {
            collection.default_config_id = collection.configs.first().map(|c| c.id.clone());
        }

        self.save(identity, &collection).await?;
        Ok(())
    }

    /// Look up one credential set. Inactive entries are valid results;
    /// callers must check `is_active` before signing with them.
    pub async fn get(&self, identity: &str, id: &str) -> Result<Option<CredentialSet>, VaultError> {
        let collection = self.retrieve(identity).await?;
        Ok(collection.find(id).cloned())
    }

    fn cipher_for(&self, identity_hash: &str) -> FieldCipher {
        FieldCipher::new(&self.app_secret, identity_hash)
    }

    async fn load_stored(&self, hash: &str) -> Result<Option<StoredCollection>, VaultError> {
        match self.store.get(&collection_key(hash)).await? {
            Some(blob) => serde_json::from_str(&blob)
                .map(Some)
                .map_err(|e| VaultError::Corrupt(e.to_string())),
            None => Ok(None),
        }
    }

    async fn migrate_legacy(
        &self,
        identity: &str,
        hash: &str,
        cipher: &FieldCipher,
        blob: &str,
    ) -> Result<CredentialCollection, VaultError> {
        let legacy: LegacyRecord =
            serde_json::from_str(blob).map_err(|e| VaultError::Corrupt(e.to_string()))?;
        let credentials = ApiCredentials {
            key: cipher.decrypt(&legacy.key)?,
            secret: cipher.decrypt(&legacy.secret)?,
            passphrase: cipher.decrypt(&legacy.passphrase)?,
            network: legacy.network,
        };

        let now = Utc::now();
        let set = CredentialSet {
            id: Uuid::new_v4().to_string(),
            name: MIGRATED_NAME.to_string(),
            description: Some(MIGRATED_DESCRIPTION.to_string()),
            credentials,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut collection = CredentialCollection {
            default_config_id: Some(set.id.clone()),
            configs: vec![set],
            last_updated: now,
            version: 0,
        };
        collection.version = self.save(identity, &collection).await?;
        self.store.delete(&legacy_key(hash)).await?;

        info!("migrated legacy credential record into a collection");
        Ok(collection)
    }
}

fn collection_key(identity_hash: &str) -> String {
    format!("{}{}", COLLECTION_KEY_PREFIX, identity_hash)
}

fn legacy_key(identity_hash: &str) -> String {
    format!("{}{}", LEGACY_KEY_PREFIX, identity_hash)
}

fn encrypt_set(
    cipher: &FieldCipher,
    set: &CredentialSet,
) -> Result<StoredCredentialSet, CryptoError> {
    Ok(StoredCredentialSet {
        id: set.id.clone(),
        name: set.name.clone(),
        description: set.description.clone(),
        key: cipher.encrypt(&set.credentials.key)?,
        secret: cipher.encrypt(&set.credentials.secret)?,
        passphrase: cipher.encrypt(&set.credentials.passphrase)?,
        network: set.credentials.network,
        is_active: set.is_active,
        created_at: set.created_at,
        updated_at: set.updated_at,
    })
}

fn decrypt_set(
    cipher: &FieldCipher,
    set: StoredCredentialSet,
) -> Result<CredentialSet, CryptoError> {
    Ok(CredentialSet {
        credentials: ApiCredentials {
            key: cipher.decrypt(&set.key)?,
            secret: cipher.decrypt(&set.secret)?,
            passphrase: cipher.decrypt(&set.passphrase)?,
            network: set.network,
        },
        id: set.id,
        name: set.name,
        description: set.description,
        is_active: set.is_active,
        created_at: set.created_at,
        updated_at: set.updated_at,
    })
}
