//! nvolt - client-side encrypted secrets for machine fleets.
//!
//! Values are encrypted on the machine that writes them. The server stores
//! ciphertext and one wrapped copy of each scope's master key per enrolled
//! machine; it never sees plaintext or an unwrapped key.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! └── core/             # Core library components
//!     ├── cipher/       # RSA-OAEP key wrapping, AES-256-GCM values
//!     ├── store/        # private_key.pem + config.json
//!     ├── auth          # Challenge-response login
//!     ├── remote/       # JSON over HTTPS, Api trait
//!     ├── directory     # Org resolution
//!     ├── agent/        # Push, pull, key sync
//!     ├── domain/       # Identity, machines, scopes, secrets
//!     └── env           # .env files
//! ```

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::agent::Agent;
pub use crate::core::directory::{OrgChoice, OrgPrompt, OrgResolution};
pub use crate::core::domain::{
    EnrolledMachine, MachineIdentity, OrgMembership, ProjectEnvironment, Scope, ScopeReport,
    Secret, Secrets, SyncAllReport,
};
pub use crate::core::remote::{Api, HttpApi, Transport};
pub use crate::core::store::IdentityStore;
pub use crate::error::{Error, ErrorKind, Result};
