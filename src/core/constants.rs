//! Constants used throughout nvolt.
//!
//! Centralizes file names, wire header names and defaults.

use std::time::Duration;

/// Config root directory relative to HOME (`~/.nvolt`).
pub const CONFIG_DIR: &str = ".nvolt";

/// Private key file name inside the config root.
pub const PRIVATE_KEY_FILE: &str = "private_key.pem";

/// Machine identity file name inside the config root.
pub const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the config root.
pub const CONFIG_ENV: &str = "NVOLT_CONFIG";

/// Environment variable supplying the server URL on first run.
pub const SERVER_URL_ENV: &str = "SERVER_BASE_URL";

/// Server used when `SERVER_BASE_URL` is unset.
pub const DEFAULT_SERVER_URL: &str = "https://api.nvolt.io";

/// Environment used when neither the caller nor the identity names one.
pub const DEFAULT_ENVIRONMENT: &str = "default";

/// Header binding each request to the calling machine.
pub const MACHINE_ID_HEADER: &str = "X-Machine-ID";

/// API prefix for every endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// Default deadline for a single remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// RSA modulus size for machine keys.
pub const RSA_KEY_BITS: usize = 2048;

/// Length of the generated machine id suffix.
pub const MACHINE_ID_LEN: usize = 10;

/// Required mode for the private key file.
pub const PRIVATE_KEY_MODE: u32 = 0o600;

/// Mode for `config.json`. It holds the session token, so owner-only as well.
pub const CONFIG_FILE_MODE: u32 = 0o600;
