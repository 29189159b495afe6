//! Cryptographic primitives.
//!
//! Two layers, one per key type:
//!
//! - **keypair**: RSA machine keys. OAEP key wrapping, PSS signing, PEM I/O.
//! - **master**: AES-256-GCM master keys sealing individual values.
//!
//! All operations are synchronous and CPU-bound.

mod keypair;
mod master;

pub use keypair::{
    encrypt_to, extract_public_key, generate_keypair, generate_keypair_with_bits,
    parse_public_key, unwrap_master_key, verify, wrap_master_key, KeyPairPem, MachineKey,
};
pub use master::{MasterKey, MASTER_KEY_LEN, NONCE_LEN, TAG_LEN};
