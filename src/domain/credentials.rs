//! Credential types for the LN Markets API.
//!
//! Secret material never reaches a serializer in plaintext: the vault stores
//! encrypted leaf fields, responses carry no credentials, and the `Debug`
//! impl redacts everything but the access key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use zeroize::ZeroizeOnDrop;

/// API environment. Selects which upstream host requests are signed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One LN Markets API key triple plus its target network.
///
/// Plaintext exists only transiently: decrypted for the duration of a signed
/// request, zeroized on drop.
#[derive(Clone, Deserialize, ZeroizeOnDrop)]
pub struct ApiCredentials {
    pub key: String,
    pub secret: String,
    pub passphrase: String,
    #[zeroize(skip)]
    pub network: Network,
}

impl ApiCredentials {
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        passphrase: impl Into<String>,
        network: Network,
    ) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            passphrase: passphrase.into(),
            network,
        }
    }
}

impl Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("passphrase", &"<redacted>")
            .field("network", &self.network)
            .finish()
    }
}

/// A named, user-managed credential set.
#[derive(Debug, Clone)]
pub struct CredentialSet {
    /// Generated, unique within the owning user's collection.
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub credentials: ApiCredentials,
    /// Inactive sets are valid lookups but must never sign requests.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// All credential sets owned by one user identity.
#[derive(Debug, Clone)]
pub struct CredentialCollection {
    pub configs: Vec<CredentialSet>,
    /// Best-effort pointer into `configs`; absence is tolerated.
    pub default_config_id: Option<String>,
    pub last_updated: DateTime<Utc>,
    /// Bumped on every save. Detects (does not resolve) concurrent writers.
    pub version: u64,
}

impl CredentialCollection {
    /// Fresh collection for a user with no stored credentials.
    pub fn empty() -> Self {
        Self {
            configs: Vec::new(),
            default_config_id: None,
            last_updated: Utc::now(),
            version: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&CredentialSet> {
        self.configs.iter().find(|c| c.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut CredentialSet> {
        self.configs.iter_mut().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> ApiCredentials {
        ApiCredentials::new("key-1", "very-secret", "hunter2", Network::Mainnet)
    }

    #[test]
    fn debug_redacts_secret_material() {
        let out = format!("{:?}", creds());
        assert!(out.contains("key-1"));
        assert!(!out.contains("very-secret"));
        assert!(!out.contains("hunter2"));
        assert!(out.contains("<redacted>"));
    }

    #[test]
    fn network_round_trips_through_serde() {
        let json = serde_json::to_string(&Network::Testnet).unwrap();
        assert_eq!(json, "\"testnet\"");
        let back: Network = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Network::Testnet);
    }

    #[test]
    fn empty_collection_has_no_default() {
        let collection = CredentialCollection::empty();
        assert!(collection.is_empty());
        assert!(collection.default_config_id.is_none());
        assert_eq!(collection.version, 0);
    }

    #[test]
    fn find_locates_entry_by_id() {
        let now = Utc::now();
        let mut collection = CredentialCollection::empty();
        collection.configs.push(CredentialSet {
            id: "abc".to_string(),
            name: "Main".to_string(),
            description: None,
            credentials: creds(),
            is_active: true,
            created_at: now,
            updated_at: now,
        });

        assert!(collection.find("abc").is_some());
        assert!(collection.find("missing").is_none());
    }
}
