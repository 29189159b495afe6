//! Core library components.
//!
//! Everything needed to keep secrets encrypted end to end: key handling,
//! the local identity, the server API and the engine that ties them
//! together. Nothing here prints or prompts.

pub mod agent;
pub mod auth;
pub mod cipher;
pub mod config;
pub mod constants;
pub mod directory;
pub mod domain;
pub mod env;
pub mod remote;
pub mod store;
pub mod types;
