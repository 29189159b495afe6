//! Identity store.
//!
//! Owns the two files that make up a machine's local identity:
//!
//! ```text
//! <config_root>/
//!   private_key.pem   0600, PKCS#1 RSA private key
//!   config.json       0600, MachineIdentity
//! ```
//!
//! The store is an explicit value created by the entry point. The private key
//! is read from disk on demand and never cached in the struct.

mod fs;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::cipher::{self, KeyPairPem, MachineKey};
use crate::core::constants;
use crate::core::domain::MachineIdentity;
use crate::core::types::PublicKeyPem;
use crate::error::{Result, StoreError};

/// A loaded machine identity bound to its directory.
#[derive(Debug)]
pub struct IdentityStore {
    root: PathBuf,
    identity: MachineIdentity,
}

impl IdentityStore {
    /// Load the identity under `root`, creating it on first run.
    ///
    /// First run generates a key-pair, assigns a machine id and records
    /// `server_url` as the server to talk to.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Incomplete` if only one of the two files exists,
    /// or an I/O error if the files cannot be read or written.
    pub fn load_or_init(root: impl Into<PathBuf>, server_url: &str) -> Result<Self> {
        let root = root.into();
        let has_key = root.join(constants::PRIVATE_KEY_FILE).exists();
        let has_config = root.join(constants::CONFIG_FILE).exists();

        match (has_key, has_config) {
            (false, false) => Self::initialize(root, server_url),
            _ => Self::open(root),
        }
    }

    /// Load an existing identity.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotInitialized` if nothing exists under `root` and
    /// `StoreError::Incomplete` if one of the two files is missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let key_path = root.join(constants::PRIVATE_KEY_FILE);
        let config_path = root.join(constants::CONFIG_FILE);

        match (key_path.exists(), config_path.exists()) {
            (false, false) => {
                return Err(StoreError::NotInitialized(root.display().to_string()).into())
            }
            (true, false) => return Err(incomplete(&root, constants::CONFIG_FILE)),
            (false, true) => return Err(incomplete(&root, constants::PRIVATE_KEY_FILE)),
            (true, true) => {}
        }

        fs::warn_if_insecure(&key_path, constants::PRIVATE_KEY_MODE);
        fs::warn_if_insecure(&config_path, constants::CONFIG_FILE_MODE);

        let contents = std::fs::read_to_string(&config_path).map_err(StoreError::ReadFailed)?;
        let identity: MachineIdentity = serde_json::from_str(&contents)
            .map_err(|e| StoreError::InvalidFormat(format!("{}: {}", config_path.display(), e)))?;

        if identity.machine_id.is_empty() {
            return Err(StoreError::InvalidFormat("config.json has no machine_id".into()).into());
        }

        debug!(machine_id = %identity.machine_id, path = %root.display(), "identity loaded");
        Ok(Self { root, identity })
    }

    /// Whether an identity has been created under `root`.
    pub fn exists(root: &Path) -> bool {
        root.join(constants::CONFIG_FILE).exists()
    }

    fn initialize(root: PathBuf, server_url: &str) -> Result<Self> {
        info!(path = %root.display(), "initializing machine identity");
        let pair = cipher::generate_keypair()?;
        Self::create(root, server_url, &pair)
    }

    /// Write a new identity around an existing key-pair.
    pub(crate) fn create(root: PathBuf, server_url: &str, pair: &KeyPairPem) -> Result<Self> {
        let identity = MachineIdentity::new(server_url);

        let store = Self { root, identity };
        fs::write_atomic(
            &store.private_key_path(),
            pair.private_pem.as_bytes(),
            constants::PRIVATE_KEY_MODE,
        )?;
        store.write_config(&store.identity)?;

        debug!(machine_id = %store.identity.machine_id, "identity created");
        Ok(store)
    }

    /// Current identity fields.
    pub fn identity(&self) -> &MachineIdentity {
        &self.identity
    }

    pub fn machine_id(&self) -> &str {
        &self.identity.machine_id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn private_key_path(&self) -> PathBuf {
        self.root.join(constants::PRIVATE_KEY_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(constants::CONFIG_FILE)
    }

    /// Read and parse the private key. Callers drop it as soon as the
    /// operation needing it is done.
    pub fn private_key(&self) -> Result<MachineKey> {
        let pem = fs::read_sensitive(&self.private_key_path())?;
        MachineKey::from_pem(&pem)
    }

    /// Public key PEM derived from the private key on disk.
    pub fn public_key(&self) -> Result<PublicKeyPem> {
        self.private_key()?.public_key_pem()
    }

    /// Persist a new session token.
    pub fn save_jwt(&mut self, token: &str) -> Result<()> {
        self.update(|identity| identity.jwt_token = token.to_string())
    }

    /// Persist (or clear) the active organization.
    pub fn save_active_org(&mut self, org_id: Option<&str>) -> Result<()> {
        self.update(|identity| identity.active_org_id = org_id.map(str::to_string))
    }

    /// Persist the default environment.
    pub fn save_default_environment(&mut self, name: &str) -> Result<()> {
        self.update(|identity| identity.default_environment = Some(name.to_string()))
    }

    /// Persist a new server URL. The session token belongs to the old server
    /// and is dropped.
    pub fn save_server_url(&mut self, url: &str) -> Result<()> {
        let url = url.trim().trim_end_matches('/').to_string();
        self.update(|identity| {
            if identity.server_url != url {
                identity.jwt_token.clear();
            }
            identity.server_url = url;
        })
    }

    /// Apply `change` to a copy, write it, then commit it in memory.
    fn update(&mut self, change: impl FnOnce(&mut MachineIdentity)) -> Result<()> {
        let mut next = self.identity.clone();
        change(&mut next);
        self.write_config(&next)?;
        self.identity = next;
        Ok(())
    }

    fn write_config(&self, identity: &MachineIdentity) -> Result<()> {
        let json = serde_json::to_vec_pretty(identity)?;
        fs::write_atomic(&self.config_path(), &json, constants::CONFIG_FILE_MODE)
    }
}

fn incomplete(root: &Path, missing: &str) -> crate::error::Error {
    StoreError::Incomplete {
        dir: root.display().to_string(),
        missing: missing.to_string(),
    }
    .into()
}
